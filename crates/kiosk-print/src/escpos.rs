// SPDX-License-Identifier: MIT
//
// The ESC/POS printer surface.
//
// `EscPos<W>` tracks nothing but the sink. Every `set` re-sends all four
// style commands; receipts are short and the printer is slower than any
// byte count we could save. Each operation flushes, so a receipt reaches
// the paper as it is printed rather than when the process exits.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use kiosk_feed::Bitmap;
use kiosk_feed::render::printer::{PrintStyle, PrinterSurface};
use tracing::debug;

use crate::command;
use crate::raster::Raster;

/// Where the Linux `usblp` driver exposes the first receipt printer.
pub const DEFAULT_DEVICE: &str = "/dev/usb/lp0";

#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("opening printer {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("writing to printer")]
    Io(#[from] io::Error),

    #[error("image {width}x{height} is too large to print")]
    ImageTooLarge { width: u32, height: u32 },
}

// ─── EscPos ──────────────────────────────────────────────────────────────────

/// A receipt printer speaking ESC/POS over a byte sink.
pub struct EscPos<W: Write> {
    out: W,
}

impl EscPos<File> {
    /// Open a printer device node for writing and initialise it.
    pub fn open(path: &Path) -> Result<Self, PrintError> {
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|source| PrintError::Open {
                path: path.to_owned(),
                source,
            })?;
        debug!(path = %path.display(), "printer opened");
        Self::new(file)
    }
}

impl<W: Write> EscPos<W> {
    /// Wrap a sink and send `ESC @`.
    pub fn new(mut out: W) -> Result<Self, PrintError> {
        command::initialize(&mut out)?;
        out.flush()?;
        Ok(Self { out })
    }

    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PrinterSurface for EscPos<W> {
    type Error = PrintError;

    fn set(&mut self, style: PrintStyle) -> Result<(), PrintError> {
        command::font(&mut self.out, style.font)?;
        command::align(&mut self.out, style.align)?;
        command::bold(&mut self.out, style.bold)?;
        command::double_height(&mut self.out, style.double_height)?;
        Ok(())
    }

    /// The printer's code page is not ASCII-compatible above 0x7f, so
    /// anything outside printable ASCII (newlines aside) prints as `?`.
    fn print_text(&mut self, text: &str) -> Result<(), PrintError> {
        let bytes: Vec<u8> = text.chars().map(printable).collect();
        self.out.write_all(&bytes)?;
        self.out.flush()?;
        Ok(())
    }

    fn print_image(&mut self, image: &Bitmap) -> Result<(), PrintError> {
        let raster = Raster::dither(image).ok_or(PrintError::ImageTooLarge {
            width: image.width(),
            height: image.height(),
        })?;
        command::raster_image(&mut self.out, &raster)?;
        self.out.flush()?;
        Ok(())
    }

    fn line_feed(&mut self) -> Result<(), PrintError> {
        command::line_feed(&mut self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

fn printable(c: char) -> u8 {
    match u8::try_from(c) {
        Ok(b) if b == b'\n' || (b' '..=b'~').contains(&b) => b,
        _ => b'?',
    }
}
