//! Error types for the Pokedex client
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Fetch Error Enum ==
/// Failure reported by the upstream fetcher.
///
/// The caching facade passes these through untouched and never stores a
/// response that produced one.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or no response arrived
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The response body could not be read in full
    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

// == Command Error Enum ==
/// Unified error type for REPL commands.
#[derive(Error, Debug)]
pub enum CommandError {
    /// A required argument was not supplied; carries the usage line
    #[error("Missing argument -> {0}")]
    MissingArgument(&'static str),

    /// Upstream fetch failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Upstream returned a body that is not the expected JSON
    #[error("Unexpected response format: {0}")]
    Decode(#[from] serde_json::Error),

    /// Writing command output failed
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for command handlers.
pub type Result<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_argument_message_includes_usage() {
        let err = CommandError::MissingArgument("explore <location name>");
        assert_eq!(err.to_string(), "Missing argument -> explore <location name>");
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            url: "https://pokeapi.co/api/v2/pokemon/missingno/".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Request to https://pokeapi.co/api/v2/pokemon/missingno/ returned status 404"
        );
    }

    #[test]
    fn test_fetch_error_is_transparent_in_command_error() {
        let err: CommandError = FetchError::Status {
            url: "u".to_string(),
            status: 500,
        }
        .into();
        assert_eq!(err.to_string(), "Request to u returned status 500");
    }

    #[test]
    fn test_decode_error_conversion() {
        let json_err = serde_json::from_slice::<serde_json::Value>(b"not json").unwrap_err();
        let err: CommandError = json_err.into();
        assert!(matches!(err, CommandError::Decode(_)));
    }
}
