//! The remote feed as the poll loop sees it.

use std::path::PathBuf;

use crate::model::{FeedItem, NotificationItem};

/// Read the newest item of each channel and publish posts.
///
/// Only the head of each channel is ever requested. An empty channel is
/// `Ok(None)`, not an error.
pub trait FeedService {
    fn timeline_head(&self) -> Result<Option<FeedItem>, ServiceError>;

    fn notifications_head(&self) -> Result<Option<NotificationItem>, ServiceError>;

    fn submit_post(&self, text: &str) -> Result<(), ServiceError>;
}

impl<S: FeedService + ?Sized> FeedService for &S {
    fn timeline_head(&self) -> Result<Option<FeedItem>, ServiceError> {
        (**self).timeline_head()
    }

    fn notifications_head(&self) -> Result<Option<NotificationItem>, ServiceError> {
        (**self).notifications_head()
    }

    fn submit_post(&self, text: &str) -> Result<(), ServiceError> {
        (**self).submit_post(text)
    }
}

/// Failures talking to the service or reading its credentials.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("request to {endpoint} failed")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("credential file {}: {reason}", path.display())]
    Credentials { path: PathBuf, reason: String },

    #[error("credential file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
