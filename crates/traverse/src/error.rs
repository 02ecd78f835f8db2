//! Error types for traverse.

use std::io;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum TraverseError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("failed to read response body: {0}")]
    BodyRead(#[source] BoxError),

    #[error("response body was already consumed")]
    BodyConsumed,

    #[error("response body was cancelled")]
    BodyCancelled,

    #[error("redirect loop detected at {url} after {hops} hops")]
    RedirectLoop { url: String, hops: usize },

    #[error("invalid JSON content: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sink I/O error: {0}")]
    Sink(#[from] io::Error),

    #[error("failed to build client: {0}")]
    Client(#[source] BoxError),
}

impl TraverseError {
    pub fn transport(err: impl Into<BoxError>) -> Self { Self::Transport(err.into()) }

    pub fn body(err: impl Into<BoxError>) -> Self { Self::BodyRead(err.into()) }

    /// `true` for failures that happened before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::InvalidRequest(_) | Self::Client(_))
    }
}

pub type Result<T> = std::result::Result<T, TraverseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_loop_message_names_url_and_hops() {
        let err = TraverseError::RedirectLoop {
            url: "https://example.com/a".to_string(),
            hops: 3,
        };
        assert_eq!(
            err.to_string(),
            "redirect loop detected at https://example.com/a after 3 hops"
        );
    }

    #[test]
    fn transport_errors_keep_their_source() {
        let err = TraverseError::transport(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert!(err.is_transport());
        assert!(std::error::Error::source(&err).is_some());
        assert!(!TraverseError::BodyConsumed.is_transport());
    }
}
