// SPDX-License-Identifier: MIT
//
// The terminal as the kiosk's display.
//
// Units are cells. Text is one row per line; the large font is the small
// font in bold. Bitmaps go in as half blocks, two pixel rows per cell row.
//
// Drawing happens on a work canvas. `present` copies it to the screen
// canvas the event loop paints from and marks the screen dirty, so the
// terminal never shows a half-drawn item.

use kiosk_feed::layout::{GlyphRenderer, GlyphSurface, Measure, WrappedBlock};
use kiosk_feed::render::{DisplaySurface, FontSize};
use kiosk_feed::{Bitmap, BoxError};
use kiosk_term::canvas::{Canvas, string_width};
use kiosk_term::cell::Attr;
use kiosk_term::color::CellColor;

// ─── Fonts ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermFont {
    attrs: Attr,
}

impl TermFont {
    pub const REGULAR: Self = Self {
        attrs: Attr::empty(),
    };
    pub const BOLD: Self = Self { attrs: Attr::BOLD };
}

impl Measure for TermFont {
    fn measure(&self, text: &str) -> u32 {
        u32::try_from(string_width(text)).unwrap_or(u32::MAX)
    }
}

/// One line of text waiting to be painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermLine {
    width: u32,
    attrs: Attr,
}

impl GlyphSurface for TermLine {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        1
    }
}

impl GlyphRenderer for TermFont {
    type Surface = TermLine;

    fn render(&self, text: &str) -> TermLine {
        TermLine {
            width: self.measure(text),
            attrs: self.attrs,
        }
    }

    fn line_height(&self) -> u32 {
        1
    }
}

// ─── TermDisplay ────────────────────────────────────────────────────────────

pub struct TermDisplay {
    work: Canvas,
    screen: Canvas,
    fg: CellColor,
    dirty: bool,
}

impl TermDisplay {
    #[must_use]
    pub fn new(cols: u16, rows: u16, bg: CellColor, fg: CellColor) -> Self {
        let work = Canvas::with_bg(cols, rows, bg);
        Self {
            screen: work.clone(),
            work,
            fg,
            dirty: true,
        }
    }

    /// What was last presented.
    #[must_use]
    pub const fn screen(&self) -> &Canvas {
        &self.screen
    }

    /// Whether anything was presented since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Put a previously presented screen back without redrawing it.
    pub fn restore(&mut self, screen: &Canvas) {
        self.work.clear();
        overlay(&mut self.work, screen);
        self.screen.copy_from(&self.work);
        self.dirty = true;
    }

    /// New dimensions; whatever was on screen is kept where it still fits.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.screen = refit(&self.screen, cols, rows);
        self.work.copy_from(&self.screen);
        self.dirty = true;
    }
}

impl DisplaySurface for TermDisplay {
    type Font = TermFont;

    fn font(&self, size: FontSize) -> &TermFont {
        match size {
            FontSize::Large => &TermFont::BOLD,
            FontSize::Small => &TermFont::REGULAR,
        }
    }

    fn size(&self) -> (u32, u32) {
        (u32::from(self.work.width()), u32::from(self.work.height()))
    }

    fn clear(&mut self) {
        self.work.clear();
    }

    fn blit_bitmap(&mut self, bitmap: &Bitmap, x: u32, y: u32) {
        let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
            return;
        };
        self.work
            .paint_pixels(x, y, bitmap.width(), bitmap.height(), bitmap.as_rgba());
    }

    fn blit_text(&mut self, block: &WrappedBlock<TermLine>, x: u32, y: u32) {
        let Ok(x) = u16::try_from(x) else { return };
        for line in block.lines() {
            let Ok(row) = u16::try_from(y.saturating_add(line.top)) else {
                break;
            };
            self.work
                .paint_text(x, row, &line.text, self.fg, line.surface.attrs);
        }
    }

    fn present(&mut self) -> Result<(), BoxError> {
        self.screen.copy_from(&self.work);
        self.dirty = true;
        Ok(())
    }
}

/// `screen` at a new size, cropped or padded with its background.
#[must_use]
pub fn refit(screen: &Canvas, cols: u16, rows: u16) -> Canvas {
    let mut out = Canvas::with_bg(cols, rows, screen.background());
    overlay(&mut out, screen);
    out
}

/// Copy the part of `src` that overlaps `dst`.
fn overlay(dst: &mut Canvas, src: &Canvas) {
    for y in 0..dst.height().min(src.height()) {
        for x in 0..dst.width().min(src.width()) {
            if let Some(&cell) = src.get(x, y) {
                dst.set(x, y, cell);
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_feed::layout::{self, HeightPolicy};
    use pretty_assertions::assert_eq;

    const BG: CellColor = CellColor::Rgb(32, 32, 32);

    fn display() -> TermDisplay {
        TermDisplay::new(20, 6, BG, CellColor::WHITE)
    }

    fn row(canvas: &Canvas, y: u16) -> String {
        canvas
            .row(y)
            .unwrap()
            .iter()
            .filter_map(|c| c.character())
            .collect()
    }

    // ── fonts ──

    #[test]
    fn fonts_measure_display_columns() {
        assert_eq!(TermFont::REGULAR.measure("abc"), 3);
        assert_eq!(TermFont::BOLD.measure("\u{4e16}\u{754c}"), 4);
        assert_eq!(TermFont::BOLD.render("hi").attrs, Attr::BOLD);
        assert_eq!(TermFont::REGULAR.line_height(), 1);
    }

    // ── drawing ──

    #[test]
    fn nothing_shows_until_present() {
        let mut d = display();
        d.take_dirty();
        let block = layout::layout("hello", d.font(FontSize::Small), None, HeightPolicy::Unbounded);
        d.blit_text(&block, 1, 2);
        assert_eq!(row(d.screen(), 2).trim(), "");
        assert!(!d.take_dirty());

        d.present().unwrap();
        assert_eq!(row(d.screen(), 2), " hello              ");
        assert!(d.take_dirty());
        assert!(!d.take_dirty());
    }

    #[test]
    fn wrapped_lines_go_on_consecutive_rows() {
        let mut d = display();
        let block = layout::layout(
            "one two three",
            d.font(FontSize::Large),
            Some(8),
            HeightPolicy::Unbounded,
        );
        d.blit_text(&block, 0, 0);
        d.present().unwrap();
        assert_eq!(row(d.screen(), 0).trim_end(), "one two");
        assert_eq!(row(d.screen(), 1).trim_end(), "three");
        assert_eq!(d.screen().get(0, 0).unwrap().attrs, Attr::BOLD);
        assert_eq!(d.screen().get(0, 0).unwrap().bg, BG);
    }

    #[test]
    fn bitmaps_use_half_blocks() {
        let mut d = display();
        d.blit_bitmap(&Bitmap::filled(4, 4, [255, 0, 0, 255]), 2, 1);
        d.present().unwrap();
        assert!(d.screen().is_pixel(2, 1));
        assert!(d.screen().is_pixel(5, 2));
        assert!(!d.screen().is_pixel(5, 3));
    }

    #[test]
    fn off_screen_blits_are_ignored() {
        let mut d = display();
        d.blit_bitmap(&Bitmap::filled(2, 2, [0, 0, 0, 255]), 70_000, 0);
        let block = layout::layout("x", d.font(FontSize::Small), None, HeightPolicy::Unbounded);
        d.blit_text(&block, 0, 70_000);
        d.present().unwrap();
        assert_eq!(d.screen(), &Canvas::with_bg(20, 6, BG));
    }

    #[test]
    fn clear_resets_to_background() {
        let mut d = display();
        d.blit_bitmap(&Bitmap::filled(2, 2, [0, 0, 0, 255]), 0, 0);
        d.clear();
        d.present().unwrap();
        assert_eq!(d.screen(), &Canvas::with_bg(20, 6, BG));
    }

    // ── snapshots ──

    #[test]
    fn restore_puts_a_screen_back() {
        let mut d = display();
        let block = layout::layout("toot", d.font(FontSize::Small), None, HeightPolicy::Unbounded);
        d.blit_text(&block, 0, 0);
        d.present().unwrap();
        let saved = d.screen().clone();

        d.clear();
        d.present().unwrap();
        d.take_dirty();
        d.restore(&saved);
        assert_eq!(d.screen(), &saved);
        assert!(d.take_dirty());
    }

    #[test]
    fn resize_keeps_what_fits() {
        let mut d = display();
        let block = layout::layout("abcdef", d.font(FontSize::Small), None, HeightPolicy::Unbounded);
        d.blit_text(&block, 0, 0);
        d.present().unwrap();
        d.resize(3, 2);
        assert_eq!(d.size(), (3, 2));
        assert_eq!(row(d.screen(), 0), "abc");
        d.resize(5, 2);
        assert_eq!(row(d.screen(), 0), "abc  ");
    }
}
