// SPDX-License-Identifier: MIT
//
// Canvas: the cell grid everything paints to.
//
// Row-major `Vec<Cell>`. Text goes in one codepoint per cell with wide
// characters followed by a continuation cell. Pixels go in two per cell:
// the upper half block with the top pixel as foreground and the bottom
// pixel as background, each composited over the cell's existing
// background.
//
// Anything painted outside the grid is dropped.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::cell::{Attr, Cell, UPPER_HALF};
use crate::color::CellColor;

/// RGB assumed for [`CellColor::Default`] when a translucent pixel has to
/// be blended over it.
const ASSUMED_BACKGROUND: (u8, u8, u8) = (0, 0, 0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u16,
    height: u16,
    bg: CellColor,
    cells: Vec<Cell>,
}

impl Canvas {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_bg(width, height, CellColor::Default)
    }

    /// A canvas whose cleared cells carry `bg`.
    #[must_use]
    pub fn with_bg(width: u16, height: u16, bg: CellColor) -> Self {
        let blank = Cell { bg, ..Cell::EMPTY };
        Self {
            width,
            height,
            bg,
            cells: vec![blank; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn background(&self) -> CellColor {
        self.bg
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// One full row, for row-level diffing.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        (y < self.height).then(|| {
            let start = usize::from(y) * usize::from(self.width);
            &self.cells[start..start + usize::from(self.width)]
        })
    }

    /// Reset every cell to a blank carrying the canvas background.
    pub fn clear(&mut self) {
        let blank = Cell {
            bg: self.bg,
            ..Cell::EMPTY
        };
        self.cells.fill(blank);
    }

    /// Change dimensions. Content is discarded.
    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Self::with_bg(width, height, self.bg);
    }

    /// Copy `other` in place. Both canvases must have the same size;
    /// otherwise this canvas becomes a clone of `other`.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
            self.bg = other.bg;
        } else {
            self.clone_from(other);
        }
    }

    // ─── Text ───────────────────────────────────────────────────────────────

    /// Paint `text` from `(x, y)` keeping each cell's existing background.
    ///
    /// Zero-width characters are skipped. A wide character that would hang
    /// off the right edge is replaced with a space. Returns the columns
    /// painted.
    pub fn paint_text(&mut self, x: u16, y: u16, text: &str, fg: CellColor, attrs: Attr) -> u16 {
        if y >= self.height {
            return 0;
        }
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            let w = ch.width().unwrap_or(0);
            if w == 0 {
                continue;
            }
            let Some(i) = self.index(col, y) else { break };
            let bg = self.cells[i].bg;
            if w == 2 && col + 1 >= self.width {
                self.cells[i] = Cell::styled(' ', fg, bg, attrs);
                col += 1;
                break;
            }
            self.cells[i] = Cell::styled(ch, fg, bg, attrs);
            col += 1;
            if w == 2 {
                if let Some(j) = self.index(col, y) {
                    let bg = self.cells[j].bg;
                    self.cells[j] = Cell::continuation(fg, bg, attrs);
                }
                col += 1;
            }
        }
        col - x
    }

    // ─── Pixels ─────────────────────────────────────────────────────────────

    /// Paint a straight-alpha RGBA image with its top-left pixel at cell
    /// `(x, y)`. Image row `r` lands in cell row `y + r / 2`; even rows are
    /// the upper half, odd rows the lower.
    ///
    /// `rgba` shorter than `width * height * 4` paints what it holds.
    pub fn paint_pixels(&mut self, x: u16, y: u16, width: u32, height: u32, rgba: &[u8]) {
        let pixel = |px: u32, py: u32| -> Option<[u8; 4]> {
            if py >= height {
                return None;
            }
            let at = usize::try_from((u64::from(py) * u64::from(width) + u64::from(px)) * 4).ok()?;
            rgba.get(at..at + 4)?.try_into().ok()
        };

        for row in 0..height.div_ceil(2) {
            let Some(cy) = offset(y, row) else { break };
            for px in 0..width {
                let Some(cx) = offset(x, px) else { break };
                let Some(i) = self.index(cx, cy) else { continue };
                let under = self.cells[i].bg;
                let top = pixel(px, row * 2).map_or(under, |p| under.under(p, ASSUMED_BACKGROUND));
                let bottom =
                    pixel(px, row * 2 + 1).map_or(under, |p| under.under(p, ASSUMED_BACKGROUND));
                self.cells[i] = Cell::pixels(top, bottom);
            }
        }
    }

    /// Whether the cell at `(x, y)` holds pixels rather than text.
    #[must_use]
    pub fn is_pixel(&self, x: u16, y: u16) -> bool {
        self.get(x, y).is_some_and(|c| c.character() == Some(UPPER_HALF))
    }
}

fn offset(base: u16, by: u32) -> Option<u16> {
    u16::try_from(u32::from(base) + by).ok()
}

/// Display width of one character in cells.
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Display width of a string in cells.
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.width()
}

// ─── Tests ──────────────────────────────────────────────────────────────────
