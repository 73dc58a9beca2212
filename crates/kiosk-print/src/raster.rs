// SPDX-License-Identifier: MIT
//
// Bitmap to printer raster conversion.
//
// Thermal heads only know "burn" or "don't". Images are composited over
// white paper, reduced to luminance and Floyd-Steinberg dithered.
//
// Output rows are packed MSB-first, 1 = black dot, each row padded to a
// whole byte.

use kiosk_feed::Bitmap;

/// A packed 1-bit image ready for `GS v 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width_bytes: u16,
    height: u16,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap already-packed rows. `data` must be `width_bytes * height` long.
    #[must_use]
    pub fn from_bits(width_bytes: u16, height: u16, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), usize::from(width_bytes) * usize::from(height));
        Self {
            width_bytes,
            height,
            data,
        }
    }

    /// Dither `bitmap` to one bit per dot. `None` if it is too large for the
    /// command's 16-bit size fields.
    #[must_use]
    pub fn dither(bitmap: &Bitmap) -> Option<Self> {
        let width = bitmap.width() as usize;
        let height = u16::try_from(bitmap.height()).ok()?;
        let width_bytes = u16::try_from(width.div_ceil(8)).ok()?;
        let rows = usize::from(height);

        let mut gray: Vec<i32> = bitmap
            .as_rgba()
            .chunks_exact(4)
            .map(|px| luminance_over_white(px[0], px[1], px[2], px[3]))
            .collect();
        let mut data = vec![0u8; usize::from(width_bytes) * rows];

        for y in 0..rows {
            for x in 0..width {
                let i = y * width + x;
                let old = gray[i];
                let black = old < 128;
                if black {
                    data[y * usize::from(width_bytes) + x / 8] |= 0x80 >> (x % 8);
                }
                let err = old - if black { 0 } else { 255 };

                let mut spread = |dx: isize, dy: usize, weight: i32| {
                    let Some(nx) = x.checked_add_signed(dx).filter(|&nx| nx < width) else {
                        return;
                    };
                    let ny = y + dy;
                    if ny < rows {
                        gray[ny * width + nx] += err * weight / 16;
                    }
                };
                spread(1, 0, 7);
                spread(-1, 1, 3);
                spread(0, 1, 5);
                spread(1, 1, 1);
            }
        }

        Some(Self {
            width_bytes,
            height,
            data,
        })
    }

    #[must_use]
    pub const fn width_bytes(&self) -> u16 {
        self.width_bytes
    }

    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Composite over white, then Rec. 601 luma, 0 (black) ..= 255 (white).
fn luminance_over_white(r: u8, g: u8, b: u8, a: u8) -> i32 {
    let a = i32::from(a);
    let over = |c: u8| (i32::from(c) * a + 255 * (255 - a)) / 255;
    (over(r) * 299 + over(g) * 587 + over(b) * 114) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raster(width: u32, height: u32, rgba: [u8; 4]) -> Raster {
        Raster::dither(&Bitmap::filled(width, height, rgba)).unwrap()
    }

    #[test]
    fn black_is_all_dots() {
        let r = raster(8, 2, [0, 0, 0, 255]);
        assert_eq!(r.width_bytes(), 1);
        assert_eq!(r.height(), 2);
        assert_eq!(r.data(), &[0xff, 0xff]);
    }

    #[test]
    fn white_is_no_dots() {
        assert_eq!(raster(8, 1, [255, 255, 255, 255]).data(), &[0x00]);
    }

    #[test]
    fn transparent_prints_as_paper() {
        assert_eq!(raster(8, 1, [0, 0, 0, 0]).data(), &[0x00]);
    }

    #[test]
    fn rows_pad_to_whole_bytes() {
        let r = raster(9, 1, [0, 0, 0, 255]);
        assert_eq!(r.width_bytes(), 2);
        assert_eq!(r.data(), &[0xff, 0x80]);
    }

    #[test]
    fn mid_grey_is_roughly_half_dots() {
        let r = raster(32, 32, [128, 128, 128, 255]);
        let dots: u32 = r.data().iter().map(|b| b.count_ones()).sum();
        let total = 32 * 32;
        assert!(dots > total * 2 / 5 && dots < total * 3 / 5, "{dots} of {total}");
    }

    #[test]
    fn oversized_images_are_rejected() {
        let tall = Bitmap::filled(1, 70_000, [0, 0, 0, 255]);
        assert!(Raster::dither(&tall).is_none());
    }

    #[test]
    fn luminance_extremes() {
        assert_eq!(luminance_over_white(0, 0, 0, 255), 0);
        assert_eq!(luminance_over_white(255, 255, 255, 255), 255);
        assert_eq!(luminance_over_white(0, 0, 0, 0), 255);
    }
}
