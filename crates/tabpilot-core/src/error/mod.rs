//! Error types for the automation layer.

use std::time::Duration;

use tabpilot_cdp::CdpError;
use thiserror::Error;

/// Errors from the key-event compiler.
#[derive(Debug, Clone, Error)]
pub enum InputError {
    /// The key, or key and modifier combination, cannot be compiled.
    #[error("invalid key input: {0}")]
    InvalidKey(String),

    /// The requested emission mode is not provided by the compiler.
    #[error("unsupported key emission: {0}")]
    Unsupported(String),
}

/// Errors from expectation and interception scopes.
///
/// Clonable so a single failure can complete a slot observed by many
/// waiters.
#[derive(Debug, Clone, Error)]
pub enum ExpectError {
    /// The wait exceeded its deadline. Scope hooks stay armed.
    #[error("expectation timed out after {0:?}")]
    Timeout(Duration),

    /// The connection went away while waiting.
    #[error("CDP session closed")]
    SessionClosed,

    /// A command issued on behalf of the scope failed.
    #[error("command failed: {0}")]
    Command(String),
}

impl From<CdpError> for ExpectError {
    fn from(err: CdpError) -> Self {
        match err {
            CdpError::ConnectionClosed => Self::SessionClosed,
            CdpError::Timeout(duration) => Self::Timeout(duration),
            other => Self::Command(other.to_string()),
        }
    }
}

/// Top-level error for tab operations.
#[derive(Debug, Error)]
pub enum TabError {
    /// A protocol-level failure.
    #[error(transparent)]
    Cdp(#[from] CdpError),

    /// A key compilation failure.
    #[error(transparent)]
    Input(#[from] InputError),

    /// An expectation failure.
    #[error(transparent)]
    Expect(#[from] ExpectError),

    /// The evaluated expression threw in the page.
    #[error("evaluation threw: {0}")]
    Evaluation(String),

    /// The browser refused the navigation.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// No attachable page target was found at the endpoint.
    #[error("no page target available at {0}")]
    NoPageTarget(String),

    /// A bounded wait exceeded its deadline.
    #[error("wait timed out after {0:?}")]
    WaitTimeout(Duration),
}

#[cfg(test)]
mod tests;
