//! # kiosk-feed: Feed core for toot-kiosk
//!
//! Everything between "the service answered" and "a surface got drawn on":
//!
//! - **[`model`]**: `FeedItem`, `NotificationItem`, `NotificationKind`
//! - **[`sanitize`]**: HTML post bodies to plain printable text
//! - **[`layout`]**: greedy word wrap against a width oracle, line stacking
//! - **[`cursor`]**: per-channel last-seen id and poll timestamp
//! - **[`scheduler`]**: the two-channel poll step driven by the host loop
//! - **[`mode`]**: `Viewing` / `Composing` with the compose key handler
//! - **[`render`]**: display and printer output strategies
//! - **[`service`]**: the `FeedService` seam, with [`mastodon`] behind it
//!
//! Devices never appear here directly. Display and printer hardware sit
//! behind the surface traits in [`render`], images behind [`ImageSource`].

pub mod bitmap;
pub mod cursor;
pub mod error;
pub mod layout;
pub mod mastodon;
pub mod mode;
pub mod model;
pub mod render;
pub mod sanitize;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod fakes;

pub use bitmap::{Bitmap, ImageSource};
pub use error::{BoxError, Error};
pub use model::{Account, FeedItem, ItemId, NotificationItem, NotificationKind};
pub use service::{FeedService, ServiceError};
