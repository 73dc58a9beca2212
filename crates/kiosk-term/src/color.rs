// SPDX-License-Identifier: MIT
//
// Cell colours and the one blend the kiosk needs.
//
// Avatars arrive as straight-alpha RGBA. A cell cannot hold alpha, so each
// pixel is composited over whatever is underneath before it lands in a cell.
// `Default` means "the terminal's own colour"; when compositing over it we
// assume the fallback the caller gives us.

/// Colour stored in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// 24-bit colour.
    Rgb(u8, u8, u8),
    /// The terminal's configured colour.
    #[default]
    Default,
}

impl CellColor {
    pub const BLACK: Self = Self::Rgb(0, 0, 0);
    pub const WHITE: Self = Self::Rgb(255, 255, 255);

    /// RGB components, substituting `fallback` for [`CellColor::Default`].
    #[inline]
    #[must_use]
    pub const fn rgb_or(self, fallback: (u8, u8, u8)) -> (u8, u8, u8) {
        match self {
            Self::Rgb(r, g, b) => (r, g, b),
            Self::Default => fallback,
        }
    }

    /// Composite a straight-alpha RGBA pixel over this colour.
    ///
    /// Fully opaque pixels pass through untouched, fully transparent ones
    /// leave `self` as it was (including `Default`).
    #[must_use]
    pub fn under(self, rgba: [u8; 4], fallback: (u8, u8, u8)) -> Self {
        let [r, g, b, a] = rgba;
        match a {
            255 => Self::Rgb(r, g, b),
            0 => self,
            _ => {
                let (ur, ug, ub) = self.rgb_or(fallback);
                Self::Rgb(mix(r, ur, a), mix(g, ug, a), mix(b, ub, a))
            }
        }
    }
}

/// `src * a + dst * (1 - a)`, rounded, in 8-bit integer space.
#[inline]
fn mix(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    let v = (u32::from(src) * a + u32::from(dst) * (255 - a) + 127) / 255;
    // v <= 255 because it is a convex combination of two bytes.
    u8::try_from(v).unwrap_or(u8::MAX)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
