//! Sync error types.
//!
//! Expected failures are returned as values, never panics:
//! - [`ValidationError`]: a draft failed a local precondition; no request was sent.
//! - [`NetworkError`]: the remote call failed or answered with something unusable.

use thiserror::Error;

/// Message used when the server gives no `detail` and the transport has nothing better.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// A draft failed local validation before reaching the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Field the message refers to, if any
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

/// Broad cause of a [`NetworkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// Could not reach the server
    Connect,
    /// The request timed out
    Timeout,
    /// The server answered with a non-2xx status
    Status(u16),
    /// The response body did not have the expected shape
    Malformed,
    /// A local attachment could not be read for upload
    Attachment,
}

/// A remote call failed.
///
/// `message` is what the user sees: the server's `detail` when it sent one,
/// otherwise a transport-level description.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct NetworkError {
    pub kind: NetworkErrorKind,
    pub message: String,
}

impl NetworkError {
    pub fn new(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(NetworkErrorKind::Connect, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(NetworkErrorKind::Malformed, message)
    }

    /// Builds a status error, preferring the server-supplied detail.
    pub fn status(code: u16, detail: Option<String>) -> Self {
        let message = match detail {
            Some(detail) if !detail.trim().is_empty() => detail,
            _ => format!("Request failed with status {}", code),
        };
        Self::new(NetworkErrorKind::Status(code), message)
    }

    /// Returns true if the server rejected the request (as opposed to being unreachable).
    pub fn is_status(&self) -> bool {
        matches!(self.kind, NetworkErrorKind::Status(_))
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NetworkError::new(NetworkErrorKind::Timeout, "The request timed out")
        } else if e.is_decode() {
            NetworkError::malformed(format!("Unexpected response from server: {}", e))
        } else if let Some(status) = e.status() {
            NetworkError::status(status.as_u16(), None)
        } else if e.is_connect() {
            NetworkError::connect(format!("Could not reach server: {}", e))
        } else {
            NetworkError::connect(GENERIC_FAILURE)
        }
    }
}

/// Failure returned by every [`ResourceSync`](super::ResourceSync) operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

impl SyncError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Validation(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, SyncError::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_prefers_detail() {
        let err = NetworkError::status(400, Some("PO number already exists".to_string()));
        assert_eq!(err.to_string(), "PO number already exists");
        assert_eq!(err.kind, NetworkErrorKind::Status(400));
        assert!(err.is_status());
    }

    #[test]
    fn test_status_without_detail_is_synthesized() {
        let err = NetworkError::status(503, None);
        assert_eq!(err.to_string(), "Request failed with status 503");

        let blank = NetworkError::status(500, Some("  ".to_string()));
        assert_eq!(blank.to_string(), "Request failed with status 500");
    }

    #[test]
    fn test_sync_error_is_transparent() {
        let err: SyncError = ValidationError::for_field("vendor", "Please select a vendor").into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Please select a vendor");

        let err: SyncError = NetworkError::connect("offline").into();
        assert!(err.is_network());
        assert_eq!(err.to_string(), "offline");
    }
}
