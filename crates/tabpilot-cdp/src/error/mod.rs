//! Error types for the CDP session layer.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by the CDP connection and discovery layer.
#[derive(Debug, Error)]
pub enum CdpError {
    /// The WebSocket connection could not be established.
    #[error("WebSocket connection failed: {0}")]
    ConnectionFailed(String),

    /// The endpoint URL could not be parsed or has an unsupported scheme.
    #[error("invalid CDP endpoint URL: {0}")]
    InvalidEndpointUrl(String),

    /// An HTTP request to the discovery endpoint failed.
    #[error("HTTP request failed: {0}")]
    HttpRequestFailed(String),

    /// The discovery endpoint responded, but not with a usable answer.
    #[error("endpoint discovery failed for {url}: {reason}")]
    EndpointDiscoveryFailed {
        /// The endpoint that was queried.
        url: String,
        /// Why discovery failed.
        reason: String,
    },

    /// The session is closed: the transport dropped or `close` was called.
    ///
    /// All operations pending at that moment complete with this error.
    #[error("CDP session closed")]
    ConnectionClosed,

    /// A message could not be handed to the write task.
    #[error("failed to send CDP message: {0}")]
    SendFailed(String),

    /// The browser answered a command with a protocol error.
    #[error("CDP protocol error {code}: {message}")]
    Protocol {
        /// Error code from the browser.
        code: i64,
        /// Human-readable error message from the browser.
        message: String,
    },

    /// A bounded wait exceeded its deadline.
    #[error("response timeout after {0:?}")]
    Timeout(Duration),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller misused the connection API.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[cfg(test)]
mod tests;
