//! Error types for the DDNS system
//!
//! Every failure inside a reconciliation cycle is one of these kinds. The
//! engine logs them and moves on to the next cycle; only configuration
//! errors are fatal, and those are raised before the engine starts.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP, DNS resolution or socket failure, including interface lookups
    #[error("Network error: {0}")]
    Network(String),

    /// No local address of the requested family on an interface
    #[error("Not found: {0}")]
    NotFound(String),

    /// The provider answered with an explicit error message
    #[error("API error: {message}")]
    Api {
        /// Message reported by the provider
        message: String,
    },

    /// Malformed JSON or an unexpected response shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider API error
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_provider_message() {
        let err = Error::api("The specified domain name does not exist.");
        assert_eq!(
            err.to_string(),
            "API error: The specified domain name does not exist."
        );
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Parse(_)));
    }
}
