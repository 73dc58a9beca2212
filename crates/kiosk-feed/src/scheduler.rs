//! The poll step.
//!
//! The host owns the loop and calls [`Poller::tick`] on every iteration,
//! typically from its idle tick. Each channel is fetched at most once per
//! interval; the two channels keep independent timers and may both fire
//! in the same tick. Fetches are synchronous, so a channel never has two
//! requests in flight.
//!
//! ```text
//!            interval elapsed?
//!   IDLE ───────────yes──────────▶ POLLING ── head novel? ──▶ dispatch
//!    ▲                               │
//!    └──────── last_poll = now ◀─────┘
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::cursor::{Channel, ChannelCursor};
use crate::error::Error;
use crate::mode::Mode;
use crate::model::{FeedItem, ItemId, NotificationItem};
use crate::service::{FeedService, ServiceError};

/// Where novel head items go: the display for the timeline, the printer
/// for notifications.
pub trait Dispatch {
    fn show_item(&mut self, item: &FeedItem) -> Result<(), Error>;

    fn print_notification(&mut self, note: &NotificationItem) -> Result<(), Error>;
}

/// What one tick did. Handy for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub shown: Option<ItemId>,
    pub printed: Option<ItemId>,
}

/// Both channel cursors plus the shared poll interval.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    timeline: ChannelCursor,
    notifications: ChannelCursor,
}

impl Poller {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

    /// Start both timers at `now`. The first fetch happens once `interval`
    /// has passed.
    #[must_use]
    pub const fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            timeline: ChannelCursor::new(now),
            notifications: ChannelCursor::new(now),
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub const fn timeline(&self) -> &ChannelCursor {
        &self.timeline
    }

    #[must_use]
    pub const fn notifications(&self) -> &ChannelCursor {
        &self.notifications
    }

    /// Fetch the timeline head if due and return it when novel.
    pub fn poll_timeline<S: FeedService + ?Sized>(
        &mut self,
        service: &S,
        now: Instant,
    ) -> Result<Option<FeedItem>, ServiceError> {
        poll_channel(
            &mut self.timeline,
            Channel::Timeline,
            self.interval,
            now,
            || service.timeline_head(),
            |item| &item.id,
        )
    }

    /// Fetch the notification head if due and return it when novel.
    pub fn poll_notifications<S: FeedService + ?Sized>(
        &mut self,
        service: &S,
        now: Instant,
    ) -> Result<Option<NotificationItem>, ServiceError> {
        poll_channel(
            &mut self.notifications,
            Channel::Notifications,
            self.interval,
            now,
            || service.notifications_head(),
            |note| &note.id,
        )
    }

    /// One loop iteration's worth of polling.
    ///
    /// The timeline branch is skipped entirely while composing so the
    /// composer is never painted over; notifications run regardless.
    /// Errors are not retried.
    pub fn tick<S, D>(
        &mut self,
        now: Instant,
        mode: &Mode,
        service: &S,
        dispatch: &mut D,
    ) -> Result<TickReport, Error>
    where
        S: FeedService + ?Sized,
        D: Dispatch + ?Sized,
    {
        let mut report = TickReport::default();

        if !mode.is_composing() {
            if let Some(item) = self.poll_timeline(service, now)? {
                dispatch.show_item(&item)?;
                report.shown = Some(item.id);
            }
        }

        if let Some(note) = self.poll_notifications(service, now)? {
            dispatch.print_notification(&note)?;
            report.printed = Some(note.id);
        }

        Ok(report)
    }
}

fn poll_channel<T>(
    cursor: &mut ChannelCursor,
    channel: Channel,
    interval: Duration,
    now: Instant,
    fetch: impl FnOnce() -> Result<Option<T>, ServiceError>,
    id_of: impl Fn(&T) -> &ItemId,
) -> Result<Option<T>, ServiceError> {
    if !cursor.is_due(now, interval) {
        return Ok(None);
    }
    cursor.mark_polled(now);

    let Some(head) = fetch()? else {
        debug!(%channel, "channel is empty");
        return Ok(None);
    };

    if cursor.should_emit(id_of(&head)) {
        info!(%channel, id = %id_of(&head), "new head item");
        Ok(Some(head))
    } else {
        debug!(%channel, "nothing new");
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
