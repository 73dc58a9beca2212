//! The kiosk's two interaction modes.
//!
//! | Mode        | Screen shows          | Timeline polling | Keys                 |
//! |-------------|-----------------------|------------------|----------------------|
//! | `Viewing`   | newest timeline item  | runs             | Enter, Esc, Ctrl-C   |
//! | `Composing` | "ENTER TOOT:" + draft | suspended        | text, Backspace, ... |
//!
//! Notifications keep printing in both modes.

use std::fmt;

// ---------------------------------------------------------------------------
// KeyInput
// ---------------------------------------------------------------------------

/// The keys the mode machine cares about, decoupled from any terminal or
/// windowing input type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Enter,
    Backspace,
    Escape,
    /// Ctrl-C, or the window being closed.
    Interrupt,
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Current interaction mode. The draft lives inside `Composing`, so leaving
/// the mode always discards it and reopening always starts empty.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Viewing,
    Composing { draft: String },
}

/// What a key press asks the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    Ignored,
    /// Now composing with an empty draft.
    Opened,
    /// The draft changed; redraw the composer.
    Edited,
    /// Back to viewing without posting.
    Cancelled,
    /// Back to viewing; post this text.
    Submitted(String),
    /// Shut the kiosk down.
    Quit,
}

impl Mode {
    #[must_use]
    pub const fn is_composing(&self) -> bool {
        matches!(self, Self::Composing { .. })
    }

    /// The draft, while composing.
    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        match self {
            Self::Viewing => None,
            Self::Composing { draft } => Some(draft),
        }
    }

    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Viewing => "VIEWING",
            Self::Composing { .. } => "COMPOSING",
        }
    }

    /// Apply one key press.
    ///
    /// Enter on an empty draft leaves compose mode without posting.
    pub fn handle_key(&mut self, key: KeyInput) -> Transition {
        match (&mut *self, key) {
            (_, KeyInput::Interrupt) | (Self::Viewing, KeyInput::Escape) => Transition::Quit,
            (Self::Viewing, KeyInput::Enter) => {
                *self = Self::Composing {
                    draft: String::new(),
                };
                Transition::Opened
            }
            (Self::Viewing, _) => Transition::Ignored,
            (Self::Composing { draft }, KeyInput::Char(c)) if !c.is_control() => {
                draft.push(c);
                Transition::Edited
            }
            (Self::Composing { draft }, KeyInput::Backspace) => {
                if draft.pop().is_some() {
                    Transition::Edited
                } else {
                    Transition::Ignored
                }
            }
            (Self::Composing { .. }, KeyInput::Escape) => {
                *self = Self::Viewing;
                Transition::Cancelled
            }
            (Self::Composing { draft }, KeyInput::Enter) => {
                let text = std::mem::take(draft);
                *self = Self::Viewing;
                if text.trim().is_empty() {
                    Transition::Cancelled
                } else {
                    Transition::Submitted(text)
                }
            }
            (Self::Composing { .. }, KeyInput::Char(_)) => Transition::Ignored,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
