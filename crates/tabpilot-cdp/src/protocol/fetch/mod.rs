//! Fetch domain types.
//!
//! The Fetch domain pauses matching network requests and lets the client
//! decide their fate: continue, fail, or fulfill with a synthetic
//! response.

use serde::{Deserialize, Serialize};

use super::network::{ErrorReason, Request, ResourceType};

/// Event method names of the Fetch domain.
pub const EVENTS: &[&str] = &["Fetch.requestPaused", "Fetch.authRequired"];

/// Unique request identifier for the Fetch domain.
///
/// Distinct from Network request ids; correlate via `network_id`.
pub type RequestId = String;

/// Response HTTP header entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderEntry {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

impl HeaderEntry {
    /// Create a header entry.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Stage at which to begin intercepting requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RequestStage {
    /// Intercept before the request is sent.
    #[default]
    Request,
    /// Intercept after response headers are received.
    Response,
}

/// Request pattern for interception.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequestPattern {
    /// Wildcards ('*' -> zero or more, '?' -> exactly one) are allowed.
    /// Escape character is backslash. Omitting is equivalent to "*".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,

    /// If set, only requests for matching resource types will be intercepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,

    /// Stage at which to begin intercepting requests. Default is Request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_stage: Option<RequestStage>,
}

impl RequestPattern {
    /// Create a pattern matching the given URL glob.
    pub fn url(pattern: impl Into<String>) -> Self {
        Self {
            url_pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Set the resource type filter.
    #[must_use]
    pub fn with_resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    /// Set the request stage.
    #[must_use]
    pub fn with_stage(mut self, stage: RequestStage) -> Self {
        self.request_stage = Some(stage);
        self
    }
}

/// Parameters for Fetch.enable.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EnableParams {
    /// If set, only requests matching any of these patterns are paused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<RequestPattern>>,

    /// If true, authRequired events will be issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle_auth_requests: Option<bool>,
}

/// Parameters for Fetch.continueRequest.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContinueRequestParams {
    /// An id the client received in the requestPaused event.
    pub request_id: RequestId,

    /// If set, the request url is rewritten, unobservable by the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// If set, the request method is overridden.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// If set, overrides the post data in the request (base64 over JSON).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_data: Option<String>,

    /// If set, overrides the request headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<HeaderEntry>>,

    /// If set, overrides response interception behavior for this request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intercept_response: Option<bool>,
}

/// Parameters for Fetch.failRequest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailRequestParams {
    /// An id the client received in the requestPaused event.
    pub request_id: RequestId,

    /// Causes the request to fail with the given reason.
    pub error_reason: ErrorReason,
}

/// Parameters for Fetch.fulfillRequest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillRequestParams {
    /// An id the client received in the requestPaused event.
    pub request_id: RequestId,

    /// An HTTP response code.
    pub response_code: i32,

    /// Response headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<Vec<HeaderEntry>>,

    /// Alternative way of specifying response headers as a \0-separated
    /// series of name: value pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_response_headers: Option<String>,

    /// A response body (base64 over JSON).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// A textual representation of responseCode. If absent, a standard
    /// phrase matching the code is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_phrase: Option<String>,
}

/// Parameters for Fetch.continueResponse.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContinueResponseParams {
    /// An id the client received in the requestPaused event.
    pub request_id: RequestId,

    /// An HTTP response code. If absent, the original code is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<i32>,

    /// A textual representation of responseCode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_phrase: Option<String>,

    /// Response headers. If absent, the original headers are used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<Vec<HeaderEntry>>,

    /// Alternative way of specifying response headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_response_headers: Option<String>,
}

/// Parameters for Fetch.getResponseBody.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponseBodyParams {
    /// Identifier for the intercepted request to get body for.
    pub request_id: RequestId,
}

/// Result for Fetch.getResponseBody.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponseBodyResult {
    /// Response body.
    pub body: String,

    /// True, if content was sent as base64.
    pub base64_encoded: bool,
}

/// Event: Fetch.requestPaused
///
/// Issued when the domain is enabled and the request URL matches the
/// registered pattern. The request stays paused until the client answers
/// with continueRequest, failRequest or fulfillRequest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPausedEvent {
    /// Each paused request has a unique id.
    pub request_id: RequestId,

    /// The details of the request.
    pub request: Request,

    /// The id of the frame that initiated the request.
    pub frame_id: String,

    /// How the requested resource will be used.
    pub resource_type: ResourceType,

    /// Response error if intercepted at response stage.
    pub response_error_reason: Option<ErrorReason>,

    /// Response code if intercepted at response stage.
    pub response_status_code: Option<i32>,

    /// Response status text if intercepted at response stage.
    pub response_status_text: Option<String>,

    /// Response headers if intercepted at the response stage.
    pub response_headers: Option<Vec<HeaderEntry>>,

    /// Matching Network.requestWillBeSent request id, when one exists.
    pub network_id: Option<String>,
}

impl RequestPausedEvent {
    /// Check whether this pause happened at the response stage.
    pub fn is_response_stage(&self) -> bool {
        self.response_error_reason.is_some() || self.response_status_code.is_some()
    }

    /// Check whether this pause happened at the request stage.
    pub fn is_request_stage(&self) -> bool {
        !self.is_response_stage()
    }
}
