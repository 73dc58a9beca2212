// SPDX-License-Identifier: MIT
//
// kiosk-print: ESC/POS receipt printer backend for toot-kiosk.
//
// Drives a thermal receipt printer over any byte sink. In production that
// sink is the printer's device node (a Linux `usblp` character device such
// as /dev/usb/lp0); in tests it is a Vec<u8>.
//
// Three layers:
//
//   command → byte encodings of the handful of ESC/POS commands we use
//   raster  → RGBA bitmaps to dithered 1-bit raster images
//   escpos  → `EscPos<W>`, the `PrinterSurface` the notification strategy
//             prints through

pub mod command;
pub mod escpos;
pub mod raster;

pub use escpos::{DEFAULT_DEVICE, EscPos, PrintError};
pub use raster::Raster;
