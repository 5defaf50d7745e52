//! Error types.
//!
//! The taxonomy is flat: a [`FetchError`] for anything that goes
//! wrong talking to the finance API, and a [`ValidationError`] for form input
//! rejected before any request is made. Neither is fatal to rendering.

use thiserror::Error;

/// Failure while calling the finance API.
///
/// `Clone` so a single in-flight request can hand the same failure to every
/// caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection refused, DNS failure, TLS error, etc.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided `error` text, or the raw body.
        message: String,
    },

    /// The payload did not match the expected schema.
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl FetchError {
    /// Text safe to show in the UI.
    ///
    /// Server error payloads are surfaced verbatim; transport problems get a
    /// generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Api { .. } | Self::Decode(_) => "Something went wrong. Please try again.".into(),
            Self::Timeout => "The request took too long. Please try again.".into(),
            Self::Network(_) => "Could not reach the server. Check your connection.".into(),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Inline form validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Form field the message belongs to.
    pub field: &'static str,
    /// Message shown next to the field.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_are_surfaced_verbatim() {
        let err = FetchError::Api {
            status: 400,
            message: "Budget for Dining already exists".into(),
        };
        assert_eq!(err.user_message(), "Budget for Dining already exists");
    }

    #[test]
    fn transport_errors_get_generic_text() {
        assert!(FetchError::Timeout.user_message().contains("too long"));
        let blank = FetchError::Api {
            status: 500,
            message: "  ".into(),
        };
        assert!(blank.user_message().starts_with("Something went wrong"));
    }
}
