// SPDX-License-Identifier: MIT
//
// One character position on screen.
//
// A cell holds a codepoint, resolved foreground and background colours,
// and attributes. Wide characters take two cells: the first holds the
// codepoint, the second is a continuation (ch = 0) that only carries
// colour.

use crate::color::CellColor;

// ─── Attributes ─────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// SGR attributes the kiosk uses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1.
        const BOLD    = 1 << 0;
        /// SGR 2.
        const DIM     = 1 << 1;
        /// SGR 7.
        const INVERSE = 1 << 2;
    }
}

// ─── Cell ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Codepoint; `0` marks a continuation cell.
    pub ch: u32,
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

const CONTINUATION: u32 = 0;
const SPACE: u32 = b' ' as u32;

/// Glyph used to show two stacked pixels: foreground on top, background below.
pub const UPPER_HALF: char = '\u{2580}';

impl Cell {
    /// A space with default colours.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: ch as u32,
            ..Self::EMPTY
        }
    }

    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self {
            ch: ch as u32,
            fg,
            bg,
            attrs,
        }
    }

    /// Second column of a wide character.
    #[inline]
    #[must_use]
    pub const fn continuation(fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self {
            ch: CONTINUATION,
            fg,
            bg,
            attrs,
        }
    }

    /// Two stacked pixels.
    #[inline]
    #[must_use]
    pub const fn pixels(top: CellColor, bottom: CellColor) -> Self {
        Self::styled(UPPER_HALF, top, bottom, Attr::empty())
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// The displayed character, `None` for continuation cells.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.is_continuation() {
            None
        } else {
            char::from_u32(self.ch)
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
