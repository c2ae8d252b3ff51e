//! CDP wire message types.
//!
//! The protocol speaks UTF-8 JSON text frames over a WebSocket. Outgoing
//! frames are commands carrying a caller-assigned id; incoming frames are
//! either replies (correlated by id) or unsolicited events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An outgoing CDP command.
#[derive(Debug, Clone, Serialize)]
pub struct CdpRequest {
    /// Sequential message id used to match the reply.
    pub id: u64,
    /// CDP method name (e.g., "Page.navigate").
    pub method: String,
    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A reply to a previously sent command.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpResponse {
    /// Message id matching the request.
    pub id: u64,
    /// Result on success.
    pub result: Option<Value>,
    /// Error on failure.
    pub error: Option<CdpResponseError>,
}

/// Error details in a command reply.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpResponseError {
    /// Error code.
    pub code: i64,
    /// Error message.
    pub message: String,
    /// Additional error data.
    pub data: Option<String>,
}

/// An unsolicited event pushed by the browser.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpEvent {
    /// Event method name (e.g., "Network.requestWillBeSent").
    pub method: String,
    /// Event parameters.
    pub params: Option<Value>,
}

impl CdpEvent {
    /// The domain of this event: the method-name prefix before the dot.
    pub fn domain(&self) -> &str {
        self.method
            .split_once('.')
            .map_or(self.method.as_str(), |(domain, _)| domain)
    }
}

/// An incoming CDP message, either a command reply or an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CdpMessage {
    /// A reply to a previous command.
    Response(CdpResponse),
    /// An event pushed by the browser.
    Event(CdpEvent),
}

impl CdpMessage {
    /// Check whether this message is the reply for the given command id.
    pub fn is_response_for(&self, id: u64) -> bool {
        matches!(self, Self::Response(resp) if resp.id == id)
    }

    /// Try to extract this message as a reply.
    pub fn into_response(self) -> Option<CdpResponse> {
        match self {
            Self::Response(resp) => Some(resp),
            Self::Event(_) => None,
        }
    }

    /// Try to extract this message as an event.
    pub fn into_event(self) -> Option<CdpEvent> {
        match self {
            Self::Event(evt) => Some(evt),
            Self::Response(_) => None,
        }
    }
}

#[cfg(test)]
mod tests;
