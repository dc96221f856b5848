//! Error types for debug command handling and configuration loading.
//!
//! Operator input failures (a malformed prefix, a neighbor token that does not
//! resolve) are reported back to the operator as warnings; their `Display`
//! output is the warning text itself.

use std::io;
use thiserror::Error;

/// Result type alias for debug operations.
pub type DebugResult<T> = Result<T, DebugError>;

/// Errors that can occur while handling debug commands or loading config.
#[derive(Debug, Error)]
pub enum DebugError {
    /// A prefix argument could not be parsed.
    #[error("% Malformed Prefix")]
    MalformedPrefix {
        /// The rejected input.
        input: String,
    },

    /// A neighbor token did not resolve to a configured neighbor.
    #[error("{token} is not a configured peer")]
    PeerNotFound {
        /// The address or interface name the operator typed.
        token: String,
    },

    /// A command line did not match the debug command grammar.
    #[error("% Unknown command: {input}")]
    UnknownCommand {
        /// The rejected command line.
        input: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Reading the configuration file failed.
    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::DaemonConfig`].
    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl DebugError {
    /// Creates a malformed prefix error.
    pub fn malformed_prefix(input: impl Into<String>) -> Self {
        Self::MalformedPrefix {
            input: input.into(),
        }
    }

    /// Creates a peer not found error.
    pub fn peer_not_found(token: impl Into<String>) -> Self {
        Self::PeerNotFound {
            token: token.into(),
        }
    }

    /// Creates an unknown command error.
    pub fn unknown_command(input: impl Into<String>) -> Self {
        Self::UnknownCommand {
            input: input.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error comes from operator input and should be
    /// reported as a command warning rather than a daemon failure.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DebugError::MalformedPrefix { .. }
                | DebugError::PeerNotFound { .. }
                | DebugError::UnknownCommand { .. }
        )
    }
}
