//! Timeline output.
//!
//! ```text
//!  origin
//!    ┌──────────┐        ┌─────┐
//!    │  large   │        │small│   small avatar: the original author,
//!    │  avatar  │        └─────┘   boosts only; large is the booster
//!    │          │  header (handle, or "handle boosted")
//!    └──────────┘
//!    body text, wrapped to text_width, clipped at the bottom edge
//! ```
//!
//! Units are the surface's own. `pixel_rows_per_unit` lets a surface whose
//! rows hold more than one pixel (a half-block terminal holds two) keep
//! avatar pixels and text rows lined up.

use tracing::info;

use crate::bitmap::{Bitmap, ImageSource};
use crate::error::Error;
use crate::layout::{self, GlyphRenderer, HeightPolicy, WrappedBlock};
use crate::model::FeedItem;
use crate::sanitize::{retain_bmp, sanitize};

/// Caption of the compose screen.
pub const COMPOSE_PROMPT: &str = "ENTER TOOT:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontSize {
    Large,
    Small,
}

/// A display the timeline strategy can draw on.
///
/// Drawing is retained until [`present`](Self::present); nothing is
/// expected to reach the device before then.
pub trait DisplaySurface {
    type Font: GlyphRenderer;

    fn font(&self, size: FontSize) -> &Self::Font;

    /// Width and height in surface units.
    fn size(&self) -> (u32, u32);

    /// Fill with the background colour.
    fn clear(&mut self);

    fn blit_bitmap(&mut self, bitmap: &Bitmap, x: u32, y: u32);

    fn blit_text(
        &mut self,
        block: &WrappedBlock<<Self::Font as GlyphRenderer>::Surface>,
        x: u32,
        y: u32,
    );

    fn present(&mut self) -> Result<(), crate::BoxError>;
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Where things go on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLayout {
    pub origin_x: u32,
    pub origin_y: u32,
    /// Wrap width of the body; the header gets this minus the large avatar.
    pub text_width: u32,
    /// Bound of the author (or booster) avatar, in image pixels.
    pub large_avatar: u32,
    /// Bound of the boosted author's avatar, in image pixels.
    pub small_avatar: u32,
    pub pixel_rows_per_unit: u32,
}

impl DisplayLayout {
    /// A 640x480 pixel panel.
    pub const PANEL: Self = Self {
        origin_x: 60,
        origin_y: 40,
        text_width: 620,
        large_avatar: 240,
        small_avatar: 60,
        pixel_rows_per_unit: 1,
    };

    const fn rows(&self, pixels: u32) -> u32 {
        if self.pixel_rows_per_unit <= 1 {
            pixels
        } else {
            pixels.div_ceil(self.pixel_rows_per_unit)
        }
    }

    /// Space the large avatar occupies, in surface units.
    #[must_use]
    pub const fn large_extent(&self) -> (u32, u32) {
        (self.large_avatar, self.rows(self.large_avatar))
    }

    #[must_use]
    pub const fn large_avatar_at(&self) -> (u32, u32) {
        (self.origin_x, self.origin_y)
    }

    /// Centred in the space right of the large avatar, in its top third.
    #[must_use]
    pub const fn small_avatar_at(&self) -> (u32, u32) {
        let (lw, lh) = self.large_extent();
        let free = self.text_width.saturating_sub(lw);
        (
            self.origin_x + lw + free.saturating_sub(self.small_avatar) / 2,
            self.origin_y + lh / 6,
        )
    }

    #[must_use]
    pub const fn header_at(&self) -> (u32, u32) {
        let (lw, lh) = self.large_extent();
        (self.origin_x + lw, self.origin_y + lh * 2 / 3)
    }

    #[must_use]
    pub const fn header_width(&self) -> u32 {
        self.text_width.saturating_sub(self.large_extent().0)
    }

    #[must_use]
    pub const fn body_at(&self) -> (u32, u32) {
        (self.origin_x, self.origin_y + self.large_extent().1)
    }
}

impl Default for DisplayLayout {
    fn default() -> Self {
        Self::PANEL
    }
}

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

/// What goes on screen for one timeline item, before any drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    pub large_avatar: &'a str,
    pub small_avatar: Option<&'a str>,
    pub header: String,
    pub body: String,
}

impl<'a> Frame<'a> {
    /// A boost shows the booster large with a "{booster} boosted" header
    /// and the original author small beside it. Anything else shows its
    /// author. The body is always the content item's.
    #[must_use]
    pub fn of(item: &'a FeedItem) -> Self {
        let body = sanitize(&item.content().body_markup);
        match item.reblog.as_deref() {
            Some(original) => Self {
                large_avatar: &item.author.avatar_url,
                small_avatar: Some(&original.author.avatar_url),
                header: retain_bmp(&format!("{} boosted", item.author.handle)),
                body,
            },
            None => Self {
                large_avatar: &item.author.avatar_url,
                small_avatar: None,
                header: retain_bmp(&item.author.handle),
                body,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Replace the screen with `item`.
///
/// Avatars are fetched before the screen is cleared, so a failed fetch
/// leaves the previous item up.
pub fn show_item<D, I>(
    surface: &mut D,
    images: &I,
    geometry: &DisplayLayout,
    item: &FeedItem,
) -> Result<(), Error>
where
    D: DisplaySurface + ?Sized,
    I: ImageSource + ?Sized,
{
    info!(
        account = %item.author.handle,
        created_at = %item.created_at,
        id = %item.id,
        boost = item.is_boost(),
        "showing timeline item"
    );
    let frame = Frame::of(item);

    let large = fetch(images, frame.large_avatar, geometry.large_avatar)?;
    let small = frame
        .small_avatar
        .map(|url| fetch(images, url, geometry.small_avatar))
        .transpose()?;

    surface.clear();

    let (x, y) = geometry.large_avatar_at();
    surface.blit_bitmap(&large, x, y);
    if let Some(small) = &small {
        let (x, y) = geometry.small_avatar_at();
        surface.blit_bitmap(small, x, y);
    }

    if !frame.header.is_empty() {
        let block = layout::layout(
            &frame.header,
            surface.font(FontSize::Large),
            Some(geometry.header_width()),
            HeightPolicy::Unbounded,
        );
        let (x, y) = geometry.header_at();
        surface.blit_text(&block, x, y);
    }

    let (x, y) = geometry.body_at();
    let (_, height) = surface.size();
    let block = layout::layout(
        &frame.body,
        surface.font(FontSize::Small),
        Some(geometry.text_width),
        HeightPolicy::Clip(height.saturating_sub(y)),
    );
    surface.blit_text(&block, x, y);

    surface.present().map_err(Error::Display)
}

/// Draw the compose screen: the prompt in the large font, the draft below
/// it in the small font.
pub fn show_composer<D>(surface: &mut D, geometry: &DisplayLayout, draft: &str) -> Result<(), Error>
where
    D: DisplaySurface + ?Sized,
{
    surface.clear();

    let large = surface.font(FontSize::Large);
    let pitch = large.line_height();
    let prompt = layout::layout(
        COMPOSE_PROMPT,
        large,
        Some(geometry.text_width),
        HeightPolicy::Unbounded,
    );
    surface.blit_text(&prompt, geometry.origin_x, geometry.origin_y);

    let small = surface.font(FontSize::Small);
    let y = geometry.origin_y + pitch + small.line_height();
    let text = layout::layout(
        &retain_bmp(draft),
        small,
        Some(geometry.text_width),
        HeightPolicy::Unbounded,
    );
    surface.blit_text(&text, geometry.origin_x, y);

    surface.present().map_err(Error::Display)
}

fn fetch<I: ImageSource + ?Sized>(images: &I, url: &str, bound: u32) -> Result<Bitmap, Error> {
    images
        .thumbnail(url, bound, bound)
        .map_err(|source| Error::image(url, source))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
