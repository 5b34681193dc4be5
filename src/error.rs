//! Client error types with user-facing message mapping.
//!
//! [`ClientError`] is the central error type of the crate. Every failure of a
//! request (transport, non-success status, missing record, undecodable body)
//! ends up as one of its variants, and [`ClientError::user_message`] turns any
//! of them into the string a listing or detail view shows in its error panel.

use serde::Deserialize;

/// Error body shapes returned by the remote service.
///
/// The service answers either `{ "message": "..." }` or
/// `{ "error": { "message": "..." } }`; both are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorResponse {
    /// Flat `{ "message": ... }` body.
    Flat {
        /// Human-readable error message.
        message: String,
    },
    /// Nested `{ "error": { "message": ... } }` body.
    Nested {
        /// Inner error payload.
        error: ErrorBody,
    },
}

/// Inner error body of a nested [`ErrorResponse`].
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Returns the message carried by either body shape.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Flat { message } => message,
            Self::Nested { error } => &error.message,
        }
    }
}

/// Client-side error enum.
///
/// # Categories
///
/// | Variant      | Origin                                   |
/// |--------------|------------------------------------------|
/// | `Transport`  | connection refused, DNS, timeout          |
/// | `Status`     | non-success HTTP status (400, 401, 403 …) |
/// | `NotFound`   | 404 or empty single-item payload          |
/// | `Decode`     | body did not match any accepted shape     |
/// | `Validation` | report form missing required fields       |
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, or a fallback.
        message: String,
    },

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// One or more required report fields are missing or invalid.
    #[error("missing required fields: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Caller supplied an argument the client cannot use.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns the HTTP status attached to this error, if any.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Returns `true` when the error means "the record is not there".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Status { status: 404, .. })
    }

    /// Converts the error into the string shown to the user.
    ///
    /// Service-provided messages are passed through; transport failures get
    /// a connection hint.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => {
                "Could not reach the server. Please check your connection and try again."
                    .to_string()
            }
            Self::Status { message, .. } => message.clone(),
            Self::NotFound(_) => "Item not found".to_string(),
            Self::Decode(_) => "Received an unexpected response from the server.".to_string(),
            Self::Validation(fields) => {
                format!("Please fill in the required fields: {}", fields.join(", "))
            }
            Self::InvalidInput(msg) | Self::Config(msg) => msg.clone(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
