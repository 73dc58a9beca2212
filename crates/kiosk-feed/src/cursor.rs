//! Per-channel poll state: the last item id handed to an output and when
//! the channel was last fetched.

use std::fmt;
use std::time::{Duration, Instant};

use crate::model::ItemId;

/// The two independently polled feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Timeline,
    Notifications,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timeline => "timeline",
            Self::Notifications => "notifications",
        })
    }
}

/// Dedup and timing state for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCursor {
    last_seen: Option<ItemId>,
    last_poll: Instant,
}

impl ChannelCursor {
    /// A fresh cursor. Nothing has been seen, and the first poll is due
    /// one interval after `now`.
    #[must_use]
    pub const fn new(now: Instant) -> Self {
        Self {
            last_seen: None,
            last_poll: now,
        }
    }

    #[must_use]
    pub const fn last_seen(&self) -> Option<&ItemId> {
        self.last_seen.as_ref()
    }

    #[must_use]
    pub const fn last_poll(&self) -> Instant {
        self.last_poll
    }

    /// Strictly more than `interval` has passed since the last poll.
    #[must_use]
    pub fn is_due(&self, now: Instant, interval: Duration) -> bool {
        now.saturating_duration_since(self.last_poll) > interval
    }

    pub const fn mark_polled(&mut self, now: Instant) {
        self.last_poll = now;
    }

    /// Novelty check on the head item of a fetch.
    ///
    /// Returns `true` and records `candidate` iff it differs from the stored
    /// id (an empty cursor accepts anything). Equality is the only
    /// comparison; ids are never ordered.
    pub fn should_emit(&mut self, candidate: &ItemId) -> bool {
        if self.last_seen.as_ref() == Some(candidate) {
            return false;
        }
        self.last_seen = Some(candidate.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_cursor_accepts_and_records() {
        let mut cursor = ChannelCursor::new(Instant::now());
        assert!(cursor.should_emit(&"7".into()));
        assert_eq!(cursor.last_seen(), Some(&ItemId::from("7")));
    }

    #[test]
    fn repeat_of_stored_id_is_rejected() {
        let mut cursor = ChannelCursor::new(Instant::now());
        cursor.should_emit(&"42".into());
        assert!(!cursor.should_emit(&"42".into()));
        assert_eq!(cursor.last_seen(), Some(&ItemId::from("42")));
    }

    #[test]
    fn any_different_id_is_novel() {
        let mut cursor = ChannelCursor::new(Instant::now());
        cursor.should_emit(&"42".into());
        assert!(cursor.should_emit(&"41".into()));
        assert!(cursor.should_emit(&"42".into()));
    }

    #[test]
    fn due_only_after_the_interval_strictly_passes() {
        let t0 = Instant::now();
        let cursor = ChannelCursor::new(t0);
        let interval = Duration::from_secs(10);
        assert!(!cursor.is_due(t0, interval));
        assert!(!cursor.is_due(t0 + interval, interval));
        assert!(cursor.is_due(t0 + interval + Duration::from_millis(1), interval));
    }

    #[test]
    fn mark_polled_restarts_the_interval() {
        let t0 = Instant::now();
        let mut cursor = ChannelCursor::new(t0);
        let later = t0 + Duration::from_secs(11);
        cursor.mark_polled(later);
        assert_eq!(cursor.last_poll(), later);
        assert!(!cursor.is_due(later, Duration::from_secs(10)));
    }

    #[test]
    fn channel_names() {
        assert_eq!(Channel::Timeline.to_string(), "timeline");
        assert_eq!(Channel::Notifications.to_string(), "notifications");
    }
}
