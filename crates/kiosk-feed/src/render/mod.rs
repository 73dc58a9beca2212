//! Output strategies: one per channel, each over its own surface trait.
//!
//! - **[`display`]**: timeline items and the compose screen
//! - **[`printer`]**: notification receipts

pub mod display;
pub mod printer;

pub use display::{DisplayLayout, DisplaySurface, FontSize, show_composer, show_item};
pub use printer::{PrintStyle, PrinterLayout, PrinterSurface, print_notification};
