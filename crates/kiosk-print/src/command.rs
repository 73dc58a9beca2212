// SPDX-License-Identifier: MIT
//
// ESC/POS command encoding.
//
// Pure functions that write commands to any `impl Write`. No state; the
// `EscPos` printer decides what to send and when. Only the subset of the
// command set the receipts need is here.

use std::io::{self, Write};

use kiosk_feed::render::printer::{Align, PrinterFont};

use crate::raster::Raster;

pub const ESC: u8 = 0x1b;
pub const GS: u8 = 0x1d;

// ─── Setup ───────────────────────────────────────────────────────────────────

/// `ESC @`: clear the buffer and reset every mode to power-on defaults.
#[inline]
pub fn initialize(w: &mut impl Write) -> io::Result<()> {
    w.write_all(&[ESC, b'@'])
}

// ─── Text style ──────────────────────────────────────────────────────────────

/// `ESC M n`: character font.
#[inline]
pub fn font(w: &mut impl Write, font: PrinterFont) -> io::Result<()> {
    let n = match font {
        PrinterFont::A => 0,
        PrinterFont::B => 1,
    };
    w.write_all(&[ESC, b'M', n])
}

/// `ESC a n`: justification.
#[inline]
pub fn align(w: &mut impl Write, align: Align) -> io::Result<()> {
    let n = match align {
        Align::Left => 0,
        Align::Center => 1,
        Align::Right => 2,
    };
    w.write_all(&[ESC, b'a', n])
}

/// `ESC E n`: emphasized (bold) mode.
#[inline]
pub fn bold(w: &mut impl Write, on: bool) -> io::Result<()> {
    w.write_all(&[ESC, b'E', u8::from(on)])
}

/// `GS ! n`: character size. Low nibble is the height multiplier minus one,
/// high nibble the width multiplier minus one; we only ever double height.
#[inline]
pub fn double_height(w: &mut impl Write, on: bool) -> io::Result<()> {
    w.write_all(&[GS, b'!', u8::from(on)])
}

// ─── Paper ───────────────────────────────────────────────────────────────────

/// Print the line buffer and feed one line.
#[inline]
pub fn line_feed(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\n")
}

/// `GS v 0 m xL xH yL yH d...`: print a raster bit image at normal density.
pub fn raster_image(w: &mut impl Write, raster: &Raster) -> io::Result<()> {
    let [xl, xh] = raster.width_bytes().to_le_bytes();
    let [yl, yh] = raster.height().to_le_bytes();
    w.write_all(&[GS, b'v', b'0', 0, xl, xh, yl, yh])?;
    w.write_all(raster.data())
}
