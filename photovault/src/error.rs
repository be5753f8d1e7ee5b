//! Error types for the photovault client.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants
//! follow the failure surfaces of the backup workflow: the backend rejecting
//! a request, the backend answering with a body that does not match its
//! contract, the network failing outright, a local file vanishing between
//! pick and upload, and preconditions (no login yet) caught before any
//! request is issued.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for client operation results
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Backend answered with a non-success status; the body text is kept
    /// verbatim so it can be shown to the user as-is
    #[error("{message}")]
    Backend {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Response body did not match the documented contract
    /// (e.g. a login reply missing the `user_id` field)
    #[error("malformed response from backend: {source}")]
    MalformedResponse {
        #[source]
        source: serde_json::Error,
    },

    /// Connectivity, timeout, or protocol failure before a usable response
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A resolved file could not be read for upload
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A downloaded file could not be written out
    #[error("failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Operation requires a logged-in session
    #[error("Please log in first")]
    NotLoggedIn,

    /// Configuration rejected at load time
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_displays_body_verbatim() {
        let err = Error::Backend {
            status: reqwest::StatusCode::BAD_REQUEST,
            message: "username already exists".to_string(),
        };
        assert_eq!(err.to_string(), "username already exists");
    }

    #[test]
    fn malformed_response_carries_decode_detail() {
        let source = serde_json::from_str::<crate::api::LoginResponse>("{}").unwrap_err();
        let err = Error::MalformedResponse { source };
        assert!(err.to_string().contains("user_id"));
    }
}
