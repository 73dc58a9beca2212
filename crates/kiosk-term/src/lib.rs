// SPDX-License-Identifier: MIT
//
// kiosk-term: the terminal the kiosk draws on.
//
// A cell canvas that also takes pixels (two per cell, stacked with the
// upper half block), a differential renderer that only rewrites cells
// that changed, raw-mode input parsed into key events, and an event loop
// that ties them together on a fixed tick.
//
// No TUI framework underneath: termios, ANSI escapes, and one write()
// per frame.

pub mod ansi;
pub mod canvas;
pub mod cell;
pub mod color;
pub mod diff;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
