//! Errors raised while turning a fetched item into output.

use crate::service::ServiceError;

/// Boxed error used at the device and image seams, where the concrete
/// error type belongs to the backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Anything that can go wrong during one poll step.
///
/// None of these are retried. A failure propagates out of the tick and
/// the host decides whether the process survives it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("loading image {url}: {source}")]
    Image {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("printer: {0}")]
    Printer(#[source] BoxError),

    #[error("display: {0}")]
    Display(#[source] BoxError),
}

impl Error {
    pub(crate) fn image(url: &str, source: BoxError) -> Self {
        Self::Image {
            url: url.to_owned(),
            source,
        }
    }
}
