//! Feed data model.
//!
//! These are immutable snapshots of what the service returned for one poll.
//! Nothing here knows about HTTP or JSON; [`crate::mastodon`] converts its
//! wire types into these.

use std::fmt;

// ---------------------------------------------------------------------------
// ItemId
// ---------------------------------------------------------------------------

/// Opaque item identifier. Only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// The person behind a post or a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// `user` for local accounts, `user@host` for remote ones.
    pub handle: String,
    /// Free-form display name. May be empty.
    pub display_name: String,
    pub avatar_url: String,
}

// ---------------------------------------------------------------------------
// FeedItem
// ---------------------------------------------------------------------------

/// One timeline entry.
///
/// A boost is a `FeedItem` whose `reblog` holds the boosted original. The
/// outer item's `author` is the account that boosted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub id: ItemId,
    pub author: Account,
    pub created_at: String,
    /// Raw HTML body. Empty for boosts, whose content lives on `reblog`.
    pub body_markup: String,
    pub reblog: Option<Box<FeedItem>>,
}

impl FeedItem {
    #[must_use]
    pub const fn is_boost(&self) -> bool {
        self.reblog.is_some()
    }

    /// The item whose content should be shown: the boosted original for a
    /// boost, otherwise `self`.
    #[must_use]
    pub fn content(&self) -> &Self {
        self.reblog.as_deref().unwrap_or(self)
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// What a notification is about.
///
/// Kinds the kiosk has no card for are kept verbatim in `Other` so they
/// still get logged and printed with their raw name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Follow,
    Favourite,
    Reblog,
    Mention,
    Other(String),
}

impl NotificationKind {
    /// Parse the service's type string.
    #[must_use]
    pub fn parse(kind: &str) -> Self {
        match kind {
            "follow" => Self::Follow,
            "favourite" => Self::Favourite,
            "reblog" => Self::Reblog,
            "mention" => Self::Mention,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Follow => "follow",
            Self::Favourite => "favourite",
            Self::Reblog => "reblog",
            Self::Mention => "mention",
            Self::Other(kind) => kind,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One notification entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    pub id: ItemId,
    pub kind: NotificationKind,
    pub actor: Account,
    pub created_at: String,
    /// The post this notification refers to. Present for favourites,
    /// boosts and mentions; absent for follows.
    pub status: Option<FeedItem>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn account(handle: &str, name: &str) -> Account {
        Account {
            handle: handle.into(),
            display_name: name.into(),
            avatar_url: format!("https://img/{handle}.png"),
        }
    }

    fn item(id: &str, author: Account, body: &str) -> FeedItem {
        FeedItem {
            id: id.into(),
            author,
            created_at: "2024-01-01T00:00:00Z".into(),
            body_markup: body.into(),
            reblog: None,
        }
    }

    #[test]
    fn kind_parse_known() {
        assert_eq!(NotificationKind::parse("follow"), NotificationKind::Follow);
        assert_eq!(
            NotificationKind::parse("favourite"),
            NotificationKind::Favourite
        );
        assert_eq!(NotificationKind::parse("reblog"), NotificationKind::Reblog);
        assert_eq!(NotificationKind::parse("mention"), NotificationKind::Mention);
    }

    #[test]
    fn kind_parse_unknown_keeps_name() {
        let kind = NotificationKind::parse("poll");
        assert_eq!(kind, NotificationKind::Other("poll".into()));
        assert_eq!(kind.to_string(), "poll");
    }

    #[test]
    fn content_of_plain_item_is_itself() {
        let post = item("1", account("alice", "Alice"), "<p>hi</p>");
        assert!(!post.is_boost());
        assert_eq!(post.content().id, ItemId::from("1"));
    }

    #[test]
    fn content_of_boost_is_original() {
        let original = item("7", account("alice", "Alice"), "<p>hi</p>");
        let mut boost = item("8", account("bob", "Bob"), "");
        boost.reblog = Some(Box::new(original));
        assert!(boost.is_boost());
        assert_eq!(boost.content().author.handle, "alice");
        assert_eq!(boost.content().body_markup, "<p>hi</p>");
    }
}
