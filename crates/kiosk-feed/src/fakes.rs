//! In-memory stand-ins for every capability, shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;

use crate::bitmap::{Bitmap, ImageSource, fit_within};
use crate::error::{BoxError, Error};
use crate::layout::{GlyphRenderer, GlyphSurface, Measure, WrappedBlock};
use crate::model::{Account, FeedItem, ItemId, NotificationItem, NotificationKind};
use crate::render::display::{DisplaySurface, FontSize};
use crate::render::printer::{PrintStyle, PrinterSurface};
use crate::scheduler::Dispatch;
use crate::service::{FeedService, ServiceError};

// ── Builders ──

pub fn account(handle: &str) -> Account {
    Account {
        handle: handle.into(),
        display_name: handle.to_uppercase(),
        avatar_url: format!("https://img.test/{handle}.png"),
    }
}

pub fn post(id: &str, handle: &str, body: &str) -> FeedItem {
    FeedItem {
        id: id.into(),
        author: account(handle),
        created_at: "2024-05-01T12:00:00.000Z".into(),
        body_markup: body.into(),
        reblog: None,
    }
}

pub fn boost(id: &str, booster: &str, original: FeedItem) -> FeedItem {
    FeedItem {
        reblog: Some(Box::new(original)),
        ..post(id, booster, "")
    }
}

pub fn notification(id: &str, kind: NotificationKind, actor: &str) -> NotificationItem {
    NotificationItem {
        id: id.into(),
        kind,
        actor: account(actor),
        created_at: "2024-05-01T12:00:00.000Z".into(),
        status: None,
    }
}

// ── Font ──

/// Every character is `advance` wide; every line is `height` tall.
#[derive(Debug, Clone, Copy)]
pub struct FakeFont {
    advance: u32,
    height: u32,
}

impl FakeFont {
    pub const fn new(advance: u32, height: u32) -> Self {
        Self { advance, height }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeGlyphs {
    pub text: String,
    pub width: u32,
    pub height: u32,
}

impl GlyphSurface for FakeGlyphs {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

impl Measure for FakeFont {
    fn measure(&self, text: &str) -> u32 {
        u32::try_from(text.chars().count()).unwrap_or(u32::MAX) * self.advance
    }
}

impl GlyphRenderer for FakeFont {
    type Surface = FakeGlyphs;

    fn render(&self, text: &str) -> FakeGlyphs {
        FakeGlyphs {
            text: text.to_owned(),
            width: self.measure(text),
            height: self.height,
        }
    }

    fn line_height(&self) -> u32 {
        self.height
    }
}

// ── Service ──

/// Serves whatever head items it is loaded with and records every call.
#[derive(Default)]
pub struct FakeService {
    pub timeline: RefCell<Option<FeedItem>>,
    pub notifications: RefCell<Option<NotificationItem>>,
    pub fail: Cell<bool>,
    pub calls: RefCell<Vec<&'static str>>,
    pub posts: RefCell<Vec<String>>,
}

impl FakeService {
    fn outage(&self, endpoint: &str) -> Result<(), ServiceError> {
        if self.fail.get() {
            return Err(ServiceError::Status {
                endpoint: endpoint.into(),
                status: 503,
                body: "down".into(),
            });
        }
        Ok(())
    }
}

impl FeedService for FakeService {
    fn timeline_head(&self) -> Result<Option<FeedItem>, ServiceError> {
        self.calls.borrow_mut().push("timeline");
        self.outage("timeline")?;
        Ok(self.timeline.borrow().clone())
    }

    fn notifications_head(&self) -> Result<Option<NotificationItem>, ServiceError> {
        self.calls.borrow_mut().push("notifications");
        self.outage("notifications")?;
        Ok(self.notifications.borrow().clone())
    }

    fn submit_post(&self, text: &str) -> Result<(), ServiceError> {
        self.calls.borrow_mut().push("post");
        self.outage("statuses")?;
        self.posts.borrow_mut().push(text.to_owned());
        Ok(())
    }
}

// ── Dispatch ──

#[derive(Default)]
pub struct RecordingDispatch {
    pub shown: Vec<ItemId>,
    pub printed: Vec<ItemId>,
}

impl Dispatch for RecordingDispatch {
    fn show_item(&mut self, item: &FeedItem) -> Result<(), Error> {
        self.shown.push(item.id.clone());
        Ok(())
    }

    fn print_notification(&mut self, note: &NotificationItem) -> Result<(), Error> {
        self.printed.push(note.id.clone());
        Ok(())
    }
}

// ── Images ──

/// Hands out grey squares, scaled like a 400x400 source image would be.
/// Urls containing `broken` fail.
#[derive(Default)]
pub struct CannedImages {
    pub requests: RefCell<Vec<(String, u32, u32)>>,
}

impl ImageSource for CannedImages {
    fn thumbnail(&self, url: &str, max_width: u32, max_height: u32) -> Result<Bitmap, BoxError> {
        self.requests
            .borrow_mut()
            .push((url.to_owned(), max_width, max_height));
        if url.contains("broken") {
            return Err("404 Not Found".into());
        }
        let (w, h) = fit_within(400, 400, max_width, max_height);
        Ok(Bitmap::filled(w, h, [128, 128, 128, 255]))
    }
}

// ── Display ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Clear,
    Bitmap { width: u32, height: u32, x: u32, y: u32 },
    Text { lines: Vec<String>, x: u32, y: u32 },
    Present,
}

pub struct RecordingDisplay {
    pub large: FakeFont,
    pub small: FakeFont,
    pub size: (u32, u32),
    pub ops: Vec<DisplayOp>,
}

impl Default for RecordingDisplay {
    fn default() -> Self {
        Self {
            large: FakeFont::new(16, 32),
            small: FakeFont::new(12, 24),
            size: (640, 480),
            ops: Vec::new(),
        }
    }
}

impl RecordingDisplay {
    pub fn texts(&self) -> Vec<(Vec<String>, u32, u32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DisplayOp::Text { lines, x, y } => Some((lines.clone(), *x, *y)),
                _ => None,
            })
            .collect()
    }
}

impl DisplaySurface for RecordingDisplay {
    type Font = FakeFont;

    fn font(&self, size: FontSize) -> &FakeFont {
        match size {
            FontSize::Large => &self.large,
            FontSize::Small => &self.small,
        }
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear(&mut self) {
        self.ops.push(DisplayOp::Clear);
    }

    fn blit_bitmap(&mut self, bitmap: &Bitmap, x: u32, y: u32) {
        self.ops.push(DisplayOp::Bitmap {
            width: bitmap.width(),
            height: bitmap.height(),
            x,
            y,
        });
    }

    fn blit_text(&mut self, block: &WrappedBlock<FakeGlyphs>, x: u32, y: u32) {
        self.ops.push(DisplayOp::Text {
            lines: block.texts().map(str::to_owned).collect(),
            x,
            y,
        });
    }

    fn present(&mut self) -> Result<(), BoxError> {
        self.ops.push(DisplayOp::Present);
        Ok(())
    }
}

// ── Printer ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintOp {
    Style(PrintStyle),
    Text(String),
    Image { width: u32, height: u32 },
    Feed,
}

#[derive(Default)]
pub struct RecordingPrinter {
    pub ops: Vec<PrintOp>,
}

impl RecordingPrinter {
    /// Concatenated text output, line feeds included.
    pub fn paper(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PrintOp::Text(text) => Some(text.as_str()),
                PrintOp::Feed => Some("\n"),
                _ => None,
            })
            .collect()
    }
}

impl PrinterSurface for RecordingPrinter {
    type Error = Infallible;

    fn set(&mut self, style: PrintStyle) -> Result<(), Infallible> {
        self.ops.push(PrintOp::Style(style));
        Ok(())
    }

    fn print_text(&mut self, text: &str) -> Result<(), Infallible> {
        self.ops.push(PrintOp::Text(text.to_owned()));
        Ok(())
    }

    fn print_image(&mut self, image: &Bitmap) -> Result<(), Infallible> {
        self.ops.push(PrintOp::Image {
            width: image.width(),
            height: image.height(),
        });
        Ok(())
    }

    fn line_feed(&mut self) -> Result<(), Infallible> {
        self.ops.push(PrintOp::Feed);
        Ok(())
    }
}
