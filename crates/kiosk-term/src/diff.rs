// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Keeps the last frame and, for each new one, emits escapes only for the
// cells that changed. Unchanged rows are skipped with one slice compare.
// The first frame, and any frame after a resize or `force_redraw`, clears
// the screen and draws everything. Each frame is wrapped in synchronized
// output so the terminal never shows half of it.

use std::io::{self, Write};

use crate::ansi;
use crate::canvas::Canvas;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub cells_rendered: usize,
    pub cells_skipped: usize,
    pub bytes_written: usize,
}

// ─── DiffRenderer ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    previous: Option<Canvas>,
}

impl DiffRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            previous: None,
        }
    }

    /// Diff `current` against the last frame into the output buffer.
    /// Nothing reaches the terminal until [`flush`](Self::flush).
    pub fn render(&mut self, current: &Canvas) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let mut stats = RenderStats::default();
        let (width, height) = (current.width(), current.height());
        if width == 0 || height == 0 {
            self.remember(current);
            return stats;
        }

        let previous = self
            .previous
            .as_ref()
            .filter(|p| p.width() == width && p.height() == height);

        ansi::begin_sync(&mut self.output).ok();
        if previous.is_none() {
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let (Some(row), prev_row) = (current.row(y), previous.and_then(|p| p.row(y))) else {
                continue;
            };
            if prev_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }
            for (x, cell) in (0..width).zip(row) {
                let unchanged = prev_row.and_then(|r| r.get(usize::from(x))) == Some(cell);
                if unchanged {
                    stats.cells_skipped += 1;
                } else {
                    self.writer.render_cell(&mut self.output, x, y, cell);
                    stats.cells_rendered += 1;
                }
            }
        }

        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();
        stats.bytes_written = self.output.len();

        self.remember(current);
        stats
    }

    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// # Errors
    ///
    /// Propagates the stdout write failure.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush_stdout()
    }

    /// # Errors
    ///
    /// Propagates the failure from `w`.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Make the next render draw every cell.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    fn remember(&mut self, current: &Canvas) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(current),
            None => self.previous = Some(current.clone()),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
