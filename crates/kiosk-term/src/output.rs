// SPDX-License-Identifier: MIT
//
// Frame output: one buffer, one write.
//
// `OutputBuffer` collects a frame's bytes so the terminal sees a single
// write(). `CellWriter` remembers the cursor and the last emitted style so
// a run of same-coloured cells costs one SGR, and consecutive cells need no
// cursor moves.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell};
use crate::color::CellColor;

// ─── OutputBuffer ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(16 * 1024),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// UTF-8 encode `cp`; anything that is not a scalar value becomes `?`.
    pub fn write_codepoint(&mut self, cp: u32) {
        match char::from_u32(cp).filter(|&c| c != '\0') {
            Some(ch) => {
                let mut enc = [0u8; 4];
                self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
            }
            None => self.buf.push(b'?'),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write everything to stdout and empty the buffer.
    ///
    /// # Errors
    ///
    /// Propagates the stdout write failure.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        self.flush_to(&mut io::stdout().lock())
    }

    /// Write everything to `w` and empty the buffer.
    ///
    /// # Errors
    ///
    /// Propagates the failure from `w`.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    // Real flushing goes through flush_stdout / flush_to.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── CellWriter ─────────────────────────────────────────────────────────────

/// Emits cells, skipping cursor moves and SGR that would change nothing.
#[derive(Debug)]
pub struct CellWriter {
    at: Option<(u16, u16)>,
    fg: Option<CellColor>,
    bg: Option<CellColor>,
    attrs: Attr,
}

impl CellWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            at: None,
            fg: None,
            bg: None,
            attrs: Attr::empty(),
        }
    }

    /// Forget everything; the next cell re-emits position and style.
    pub fn reset_state(&mut self) {
        *self = Self::new();
    }

    pub fn render_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        let follows = self
            .at
            .is_some_and(|(lx, ly)| ly == y && u32::from(lx) + 1 == u32::from(x));

        if cell.is_continuation() && follows {
            // The wide character before us already covered this column.
            self.at = Some((x, y));
            return;
        }

        if !follows {
            ansi::cursor_to(out, x, y).ok();
        }
        self.apply_style(out, cell);
        if cell.is_continuation() {
            out.buf.push(b' ');
        } else {
            out.write_codepoint(cell.ch);
        }
        self.at = Some((x, y));
    }

    fn apply_style(&mut self, out: &mut OutputBuffer, cell: &Cell) {
        if cell.attrs != self.attrs {
            if !self.attrs.is_empty() {
                ansi::reset(out).ok();
                self.fg = None;
                self.bg = None;
            }
            ansi::attrs(out, cell.attrs).ok();
            self.attrs = cell.attrs;
        }
        if self.fg != Some(cell.fg) {
            ansi::fg(out, cell.fg).ok();
            self.fg = Some(cell.fg);
        }
        if self.bg != Some(cell.bg) {
            ansi::bg(out, cell.bg).ok();
            self.bg = Some(cell.bg);
        }
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
