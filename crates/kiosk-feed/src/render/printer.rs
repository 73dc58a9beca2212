//! Notification receipts.
//!
//! ```text
//!        ┌────────┐
//!        │ avatar │
//!        └────────┘
//!       Display Name          font A, centred
//!        handle@host
//!       mentioned you         font A, centred, bold
//!  post body, wrapped...      font B, left, bold
//!
//!  ========================   font B, right, bold
//! ```

use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::bitmap::ImageSource;
use crate::error::Error;
use crate::layout::wrap;
use crate::model::{NotificationItem, NotificationKind};
use crate::sanitize::{retain_bmp, sanitize};

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrinterFont {
    /// The larger 12x24 face.
    A,
    /// The condensed 9x17 face.
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Text attributes; applies to everything printed until the next `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrintStyle {
    pub font: PrinterFont,
    pub align: Align,
    pub bold: bool,
    pub double_height: bool,
}

impl PrintStyle {
    /// Actor name and handle.
    pub const IDENTITY: Self = Self {
        font: PrinterFont::A,
        align: Align::Center,
        bold: false,
        double_height: false,
    };

    pub const CAPTION: Self = Self {
        bold: true,
        ..Self::IDENTITY
    };

    pub const BODY: Self = Self {
        font: PrinterFont::B,
        align: Align::Left,
        bold: true,
        double_height: false,
    };

    pub const RULE: Self = Self {
        align: Align::Right,
        ..Self::BODY
    };
}

/// A receipt printer.
pub trait PrinterSurface {
    type Error: std::error::Error + Send + Sync + 'static;

    fn set(&mut self, style: PrintStyle) -> Result<(), Self::Error>;

    fn print_text(&mut self, text: &str) -> Result<(), Self::Error>;

    fn print_image(&mut self, image: &crate::Bitmap) -> Result<(), Self::Error>;

    fn line_feed(&mut self) -> Result<(), Self::Error>;
}

/// Paper geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterLayout {
    /// Avatar bound in printer dots.
    pub avatar: u32,
    /// Characters per line in font A.
    pub columns_a: u32,
    /// Characters per line in font B.
    pub columns_b: u32,
    pub rule_width: u32,
}

impl PrinterLayout {
    /// 58 mm paper.
    pub const NARROW: Self = Self {
        avatar: 128,
        columns_a: 32,
        columns_b: 42,
        rule_width: 40,
    };

    const fn columns(&self, font: PrinterFont) -> u32 {
        match font {
            PrinterFont::A => self.columns_a,
            PrinterFont::B => self.columns_b,
        }
    }
}

impl Default for PrinterLayout {
    fn default() -> Self {
        Self::NARROW
    }
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// The kind-specific part of a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Card<'a> {
    Follow,
    /// Something happened to or with a post.
    Post {
        caption: &'static str,
        body: Option<String>,
    },
    /// A kind without a dedicated card; printed by name.
    Other(&'a str),
}

impl<'a> Card<'a> {
    #[must_use]
    pub fn of(note: &'a NotificationItem) -> Self {
        let post = |caption| Card::Post {
            caption,
            body: note.status.as_ref().map(|s| sanitize(&s.body_markup)),
        };
        match &note.kind {
            NotificationKind::Follow => Self::Follow,
            NotificationKind::Favourite => post("favourited"),
            NotificationKind::Reblog => post("boosted"),
            NotificationKind::Mention => post("mentioned you"),
            NotificationKind::Other(kind) => Self::Other(kind),
        }
    }

    #[must_use]
    pub const fn caption(&self) -> &str {
        match self {
            Self::Follow => "Followed you",
            Self::Post { caption, .. } => caption,
            Self::Other(kind) => kind,
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Print one notification: avatar, actor, caption, optional post body,
/// then a rule. A blank line precedes the rule only when the card ends on
/// its caption; a body or a bare kind name runs straight into it.
pub fn print_notification<P, I>(
    printer: &mut P,
    images: &I,
    paper: &PrinterLayout,
    note: &NotificationItem,
) -> Result<(), Error>
where
    P: PrinterSurface + ?Sized,
    I: ImageSource + ?Sized,
{
    info!(
        kind = %note.kind,
        account = %note.actor.handle,
        created_at = %note.created_at,
        id = %note.id,
        "printing notification"
    );
    let card = Card::of(note);
    let avatar = images
        .thumbnail(&note.actor.avatar_url, paper.avatar, paper.avatar)
        .map_err(|source| Error::image(&note.actor.avatar_url, source))?;

    let mut out = Receipt { printer, paper };
    out.printer.print_image(&avatar).map_err(printer_error)?;

    out.block(PrintStyle::IDENTITY, &note.actor.display_name, Ending::Terminated)?;
    out.block(PrintStyle::IDENTITY, &note.actor.handle, Ending::Terminated)?;
    match &card {
        Card::Post {
            body: Some(body), ..
        } => {
            out.block(PrintStyle::CAPTION, card.caption(), Ending::Terminated)?;
            out.block(PrintStyle::BODY, body, Ending::Open)?;
        }
        Card::Other(kind) => out.block(PrintStyle::CAPTION, kind, Ending::Open)?,
        _ => out.block(PrintStyle::CAPTION, card.caption(), Ending::Terminated)?,
    }

    // Ends an open last line; after a terminated one it leaves a gap.
    out.printer.line_feed().map_err(printer_error)?;
    out.block(
        PrintStyle::RULE,
        &"=".repeat(paper.rule_width as usize),
        Ending::Terminated,
    )?;
    out.printer.line_feed().map_err(printer_error)
}

struct Receipt<'a, P: ?Sized> {
    printer: &'a mut P,
    paper: &'a PrinterLayout,
}

impl<P: PrinterSurface + ?Sized> Receipt<'_, P> {
    /// Set `style`, then print `text` wrapped to the style's column count,
    /// one line at a time. Every line but the last is `\n`-terminated;
    /// `ending` decides the last.
    fn block(&mut self, style: PrintStyle, text: &str, ending: Ending) -> Result<(), Error> {
        self.printer.set(style).map_err(printer_error)?;
        let columns = self.paper.columns(style.font);
        let lines = wrap(&retain_bmp(text), &display_columns, Some(columns));
        let last = lines.len().saturating_sub(1);
        for (i, line) in lines.iter().enumerate() {
            let text = if i == last && ending == Ending::Open {
                line.clone()
            } else {
                format!("{line}\n")
            };
            self.printer.print_text(&text).map_err(printer_error)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    Terminated,
    /// Leave the last line for the next `line_feed` to end.
    Open,
}

fn display_columns(text: &str) -> u32 {
    u32::try_from(text.width()).unwrap_or(u32::MAX)
}

fn printer_error<E: std::error::Error + Send + Sync + 'static>(err: E) -> Error {
    Error::Printer(Box::new(err))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
