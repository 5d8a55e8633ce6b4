//! Error types for dictionary loading.
//!
//! Failing to match an address is never an error: unmatched components are
//! reported as absent fields and a lower resolution level. Only the
//! infrastructure around the dictionary can fail.

use std::sync::Arc;
use thiserror::Error;

/// Failure of a [`DictionarySource`](crate::dictionary::DictionarySource).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read dictionary: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode dictionary JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dictionary request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("dictionary request returned HTTP {0}")]
    Status(u16),

    #[error("invalid dictionary URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Error, Debug)]
pub enum Error {
    /// The external load failed. The cache stays empty, so a later call retries.
    ///
    /// Shared because every caller waiting on the same load receives it.
    #[error("dictionary unavailable: {0}")]
    DictionaryUnavailable(#[source] Arc<LoadError>),

    /// The loaded data is structurally broken (duplicate codes, empty names).
    #[error("invalid dictionary: {0}")]
    InvalidDictionary(String),

    /// A batch worker panicked or was cancelled.
    #[error("resolution worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl From<LoadError> for Error {
    fn from(e: LoadError) -> Self {
        Error::DictionaryUnavailable(Arc::new(e))
    }
}

impl Error {
    /// The source failure, if this error came from a dictionary load.
    pub fn load_error(&self) -> Option<&LoadError> {
        match self {
            Error::DictionaryUnavailable(e) => Some(&**e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_converts_to_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: Error = LoadError::from(io).into();
        assert!(matches!(err.load_error(), Some(LoadError::Io(_))));
        assert_eq!(
            err.to_string(),
            "dictionary unavailable: failed to read dictionary: missing.json"
        );
    }

    #[test]
    fn test_status_message() {
        let err = Error::from(LoadError::Status(503));
        assert_eq!(
            err.to_string(),
            "dictionary unavailable: dictionary request returned HTTP 503"
        );
        assert!(matches!(err.load_error(), Some(LoadError::Status(503))));
        assert!(Error::InvalidDictionary("empty".into()).load_error().is_none());
    }
}
