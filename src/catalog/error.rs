use thiserror::Error;

/// A show or episode fetch failed. Status errors, transport errors and
/// undecodable bodies all land here; the UI treats them the same way.
///
/// `Clone` lets every waiter of a shared in-flight fetch receive the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("catalog unavailable: {reason}")]
pub struct CatalogUnavailable {
    pub reason: String,
}

impl CatalogUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub(crate) fn status(status: reqwest::StatusCode) -> Self {
        Self::new(format!("catalog responded with HTTP {status}"))
    }
}

impl From<reqwest::Error> for CatalogUnavailable {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new("request timed out")
        } else if err.is_decode() {
            Self::new(format!("unexpected response body: {err}"))
        } else {
            Self::new(err.to_string())
        }
    }
}
