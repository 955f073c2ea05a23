//! Error types for the proxycheck client.
//!
//! Only failures the client itself can observe are represented here. A
//! non-success HTTP status is not an error: the body is still decoded and
//! handed back, so the service's own `{"status": "error", ...}` payloads
//! arrive as ordinary results (see [`crate::ApiStatus`]).

use thiserror::Error;

/// Error type for proxycheck client operations.
#[derive(Debug, Error)]
pub enum ProxyCheckError {
    /// No API key was supplied, or the supplied key was empty.
    #[error("missing API key (set PROXYCHECK_API_KEY or pass one explicitly)")]
    MissingApiKey,

    /// A configured endpoint base could not be used to build request URLs.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A configuration value was present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transport failure: DNS, connection refused, timeout, TLS.
    /// Automatically converts from `reqwest::Error`.
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// The response body was not valid JSON.
    /// Automatically converts from `serde_json::Error`.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProxyCheckError>;
