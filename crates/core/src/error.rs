//! Error types for the Vellum client
//!
//! This module defines all error types used throughout the client.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! None of these errors is transient by nature: transient network failures
//! belong to the transport collaborator and arrive here wrapped in
//! [`Error::Transport`]. Nothing in the client retries.

use thiserror::Error;

/// Server error number reported for a missing document.
///
/// Existence checks treat this number as a negative answer rather than a
/// failure; direct reads surface it as [`Error::NotFound`].
pub const ERROR_NUM_DOCUMENT_NOT_FOUND: i64 = 1202;

/// Result type alias for Vellum operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Vellum client
#[derive(Debug, Error)]
pub enum Error {
    /// A mutation that depends on the identity map was invoked on an
    /// instance with no recorded container.
    #[error("document is not tracked")]
    NotTracked,

    /// The server's stored revision did not match the precondition sent
    /// under the `Error` revision policy. Resolution requires a caller-level
    /// decision (for example reload-and-retry); never retried here.
    #[error("revision conflict: expected {expected}")]
    RevisionConflict {
        /// The revision the client sent as a precondition
        expected: String,
    },

    /// Server reported error number 1202: the document does not exist.
    #[error("document not found: {id}")]
    NotFound {
        /// The handle the server could not resolve
        id: String,
    },

    /// `next()` invoked on a cursor after disposal.
    #[error("cursor is closed")]
    CursorClosed,

    /// Identity-map invariant violation: the supplied identifiers disagree
    /// with the identity already recorded for this instance.
    #[error("tracking conflict: instance already tracked as {existing}, got {supplied}")]
    TrackingConflict {
        /// Document id already recorded for the instance
        existing: String,
        /// Document id supplied by the caller
        supplied: String,
    },

    /// Failure reported by the transport collaborator (connection,
    /// timeout, malformed response envelope).
    #[error("transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Any other error reported by the server
    #[error("server error {code}: {message}")]
    Server {
        /// Server-assigned error number
        code: i64,
        /// Server-provided message
        message: String,
    },

    /// Invalid operation or state on the client side
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Whether this error is the distinguished "document not found" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Build the error that corresponds to a server status report.
    ///
    /// Error number 1202 maps to [`Error::NotFound`]; everything else is a
    /// generic [`Error::Server`].
    pub fn from_server(code: i64, message: impl Into<String>, id: impl Into<String>) -> Self {
        if code == ERROR_NUM_DOCUMENT_NOT_FOUND {
            Error::NotFound { id: id.into() }
        } else {
            Error::Server {
                code,
                message: message.into(),
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_tracked() {
        let err = Error::NotTracked;
        assert!(err.to_string().contains("not tracked"));
    }

    #[test]
    fn test_error_display_revision_conflict() {
        let err = Error::RevisionConflict {
            expected: "R1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("revision conflict"));
        assert!(msg.contains("R1"));
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound {
            id: "people/42".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("people/42"));
    }

    #[test]
    fn test_error_display_cursor_closed() {
        let err = Error::CursorClosed;
        assert!(err.to_string().contains("cursor is closed"));
    }

    #[test]
    fn test_error_display_tracking_conflict() {
        let err = Error::TrackingConflict {
            existing: "people/1".to_string(),
            supplied: "people/2".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("people/1"));
        assert!(msg.contains("people/2"));
    }

    #[test]
    fn test_error_display_server() {
        let err = Error::Server {
            code: 600,
            message: "invalid JSON".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("600"));
        assert!(msg.contains("invalid JSON"));
    }

    #[test]
    fn test_from_server_maps_1202_to_not_found() {
        let err = Error::from_server(1202, "document not found", "people/9");
        assert!(err.is_not_found());
        match err {
            Error::NotFound { id } => assert_eq!(id, "people/9"),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_from_server_other_codes_stay_server_errors() {
        let err = Error::from_server(1200, "conflict", "people/9");
        assert!(!err.is_not_found());
        assert!(matches!(err, Error::Server { code: 1200, .. }));
    }

    #[test]
    fn test_error_from_serde_json() {
        let result: std::result::Result<i64, serde_json::Error> =
            serde_json::from_str("not json");
        let err: Error = result.unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
