//! Error types for zdesk.
//!
//! This module defines `ZdeskError`, the unified error type used throughout
//! the crate for consistent error handling and propagation.
//!
//! # Security
//!
//! All error messages are sanitized to ensure API keys are never leaked
//! in logs or terminal output. Use `sanitize_message()` when constructing
//! error messages from external sources.

use std::time::Duration;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ZdeskError>;

/// Unified error type for all zdesk operations.
///
/// The remote failure variants (`Http`, `HttpStatus`, `Authentication`,
/// `RateLimited`, `ServiceUnavailable`) are never retried: one failed round
/// trip aborts the command.
#[derive(Error, Debug)]
pub enum ZdeskError {
    /// No stored identity and interactive capture was not allowed.
    #[error("not logged in - run `zdesk login` first")]
    NotAuthenticated,

    /// Configuration error - invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// Identity fields failed validation or a stored secret could not be unpacked.
    #[error("invalid credentials: {0}")]
    InvalidCredential(String),

    /// The platform secret store rejected an operation.
    #[error("credential store error: {0}")]
    CredentialStore(#[from] keyring::Error),

    /// Reading from the terminal failed.
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// HTTP request failed during transmission.
    #[error("remote request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP response returned a non-success status code.
    #[error("remote request failed: HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The response body, potentially containing error details.
        body: String,
    },

    /// Authentication failed - email or API key rejected.
    #[error("authentication failed - run `zdesk login` to store a valid API key")]
    Authentication,

    /// Rate limited by the server (HTTP 429).
    #[error("rate limited by server{}", retry_hint(.retry_after))]
    RateLimited {
        /// Suggested retry delay, if provided by server.
        retry_after: Option<Duration>,
    },

    /// Server temporarily unavailable (HTTP 502/503/504).
    #[error("service temporarily unavailable ({status})")]
    ServiceUnavailable {
        /// The specific status code.
        status: reqwest::StatusCode,
    },

    /// A page body was not the expected JSON.
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// A bulk delete failed after earlier chunks had already been removed.
    #[error("deleted {deleted} tickets before failure: {source}")]
    PartialDelete {
        /// Tickets removed by the chunks that succeeded.
        deleted: usize,
        /// The failure that stopped the remaining chunks.
        #[source]
        source: Box<ZdeskError>,
    },
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(delay) => format!(" - retry after {}s", delay.as_secs()),
        None => " - please wait before retrying".to_string(),
    }
}

impl ZdeskError {
    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        ZdeskError::Config(message.into())
    }

    /// Creates a credential validation error.
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        ZdeskError::InvalidCredential(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ZdeskError::Validation(message.into())
    }

    /// Returns true for failures of a remote round trip, either transport
    /// errors or non-success responses.
    #[must_use]
    pub fn is_remote_failure(&self) -> bool {
        match self {
            ZdeskError::Http(_)
            | ZdeskError::HttpStatus { .. }
            | ZdeskError::Authentication
            | ZdeskError::RateLimited { .. }
            | ZdeskError::ServiceUnavailable { .. } => true,
            ZdeskError::PartialDelete { source, .. } => source.is_remote_failure(),
            _ => false,
        }
    }

    /// Returns true if this is a rate limit error.
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ZdeskError::RateLimited { .. })
            || matches!(self, ZdeskError::HttpStatus { status, .. } if status.as_u16() == 429)
    }

    /// Sanitizes an error message to remove any occurrence of the API key.
    ///
    /// API keys must never appear in logs or error output.
    ///
    /// # Returns
    ///
    /// The message with any occurrence of the API key replaced with `[REDACTED]`
    #[must_use]
    pub fn sanitize_message(message: &str, api_key: &str) -> String {
        if api_key.is_empty() {
            return message.to_string();
        }
        message.replace(api_key, "[REDACTED]")
    }

    /// Creates a sanitized version of this error's display message.
    #[must_use]
    pub fn sanitized_display(&self, api_key: &str) -> String {
        Self::sanitize_message(&self.to_string(), api_key)
    }
}
