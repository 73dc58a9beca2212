// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop.
//
// Stdin chunks arrive from the reader thread; the loop waits on that
// channel with the tick interval as timeout. Every wake-up:
//
//   1. parse whatever arrived (or, on a quiet wake-up, flush a pending
//      lone ESC) and hand the events to the app
//   2. pick up a resize flagged by SIGWINCH
//   3. tick the app
//   4. if anything asked for it, repaint and diff-render
//
// The tick is what drives work that has nothing to do with input, so it
// runs on every wake-up, keys or not. App hooks are fallible; the first
// error stops the loop and the terminal is restored before it propagates.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::canvas::Canvas;
use crate::diff::DiffRenderer;
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// What the loop drives.
pub trait App {
    /// Whatever the app's hooks can fail with; terminal I/O errors from
    /// the loop itself are folded into it.
    type Error: From<io::Error>;

    fn on_event(&mut self, _event: &Event) -> Result<Action, Self::Error> {
        Ok(Action::Continue)
    }

    /// The canvas has already been resized.
    fn on_resize(&mut self, _size: Size) {}

    /// Called on every wake-up. Return `true` to request a repaint.
    fn on_tick(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    /// Paint into a cleared canvas.
    fn paint(&mut self, canvas: &mut Canvas);
}

// ─── Config ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Channel timeout. Bounds both the tick period and how long a lone
    /// ESC waits before it counts as the Escape key.
    pub tick: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(50),
        }
    }
}

// ─── EventLoop ──────────────────────────────────────────────────────────────

pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: DiffRenderer,
    config: LoopConfig,
}

impl EventLoop {
    #[must_use]
    pub fn new(config: LoopConfig) -> Self {
        Self {
            terminal: Terminal::new(),
            parser: Parser::new(),
            renderer: DiffRenderer::new(),
            config,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Take over the terminal and run `app` until it quits, stdin closes,
    /// or a hook fails. The terminal is restored in every case.
    ///
    /// # Errors
    ///
    /// The first hook error, or a terminal I/O error.
    pub fn run<A: App>(&mut self, app: &mut A) -> Result<(), A::Error> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let result = match StdinReader::spawn() {
            Ok((mut reader, rx)) => {
                let result = self.run_inner(app, &rx);
                reader.stop();
                result
            }
            Err(e) => Err(e.into()),
        };

        let restored = self.terminal.leave();
        result?;
        restored.map_err(Into::into)
    }

    fn run_inner<A: App>(&mut self, app: &mut A, rx: &Receiver<Vec<u8>>) -> Result<(), A::Error> {
        let size = self.terminal.size();
        let mut canvas = Canvas::new(size.cols, size.rows);
        let mut dirty = true;

        loop {
            let events = match rx.recv_timeout(self.config.tick) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) if self.parser.has_pending() => self.parser.flush(),
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            };
            for event in &events {
                if app.on_event(event)? == Action::Quit {
                    return Ok(());
                }
            }
            dirty |= !events.is_empty();

            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                canvas.resize(size.cols, size.rows);
                self.renderer.force_redraw();
                app.on_resize(size);
                dirty = true;
            }

            dirty |= app.on_tick()?;

            if dirty {
                canvas.clear();
                app.paint(&mut canvas);
                self.renderer.render(&canvas);
                self.renderer.flush()?;
                dirty = false;
            }
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new(LoopConfig::default())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
