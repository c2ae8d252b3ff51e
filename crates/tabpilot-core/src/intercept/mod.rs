//! Fetch interception scopes.
//!
//! A [`FetchInterception`] pauses matching requests browser-side and
//! routes exactly one paused request per arming to the caller, who
//! decides its fate: continue it, fail it, fulfill it with a synthetic
//! response, or (at the response stage) rewrite the response. After one
//! of those verbs, [`reset`](FetchInterception::reset) re-arms the scope
//! for the next pause; [`end`](FetchInterception::end) turns
//! interception off.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use base64::Engine;
use tabpilot_cdp::protocol::fetch::{
    ContinueRequestParams, ContinueResponseParams, EnableParams, FailRequestParams,
    FulfillRequestParams, GetResponseBodyParams, GetResponseBodyResult, HeaderEntry,
    RequestPattern, RequestPausedEvent, RequestStage,
};
use tabpilot_cdp::protocol::network::{ErrorReason, Request, ResourceType};
use tabpilot_cdp::{CdpConnection, CdpError, HandlerId};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::error::ExpectError;
use crate::expect::Slot;

const REQUEST_PAUSED: &str = "Fetch.requestPaused";

/// Decode a paused event's params.
fn decode_paused(event: tabpilot_cdp::CdpEvent) -> Result<RequestPausedEvent, ExpectError> {
    let params = event.params.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(params)
        .map_err(|e| ExpectError::Command(format!("failed to decode {REQUEST_PAUSED}: {e}")))
}

/// Optional rewrites for [`FetchInterception::continue_request`].
#[derive(Debug, Clone, Default)]
pub struct ContinueRequestOverrides {
    /// Replacement URL, unobservable by the page.
    pub url: Option<String>,
    /// Replacement HTTP method.
    pub method: Option<String>,
    /// Replacement post data (base64 over the wire).
    pub post_data: Option<String>,
    /// Replacement request headers.
    pub headers: Option<Vec<HeaderEntry>>,
    /// Whether to intercept the response of this request as well.
    pub intercept_response: Option<bool>,
}

/// Optional fields for [`FetchInterception::fulfill_request`].
#[derive(Debug, Clone, Default)]
pub struct FulfillRequestOverrides {
    /// Response headers.
    pub response_headers: Option<Vec<HeaderEntry>>,
    /// Response headers as a \0-separated blob.
    pub binary_response_headers: Option<String>,
    /// Response body (base64 over the wire).
    pub body: Option<String>,
    /// Response phrase; a standard one is derived when absent.
    pub response_phrase: Option<String>,
}

/// Optional rewrites for [`FetchInterception::continue_response`].
#[derive(Debug, Clone, Default)]
pub struct ContinueResponseOverrides {
    /// Replacement status code.
    pub response_code: Option<i32>,
    /// Replacement response phrase.
    pub response_phrase: Option<String>,
    /// Replacement response headers.
    pub response_headers: Option<Vec<HeaderEntry>>,
    /// Replacement headers as a \0-separated blob.
    pub binary_response_headers: Option<String>,
}

/// A scoped request-pausing state machine over the Fetch domain.
#[derive(Debug)]
pub struct FetchInterception {
    conn: Arc<CdpConnection>,
    pattern: RequestPattern,
    slot: Mutex<Arc<Slot<RequestPausedEvent>>>,
    handler_id: Mutex<Option<HandlerId>>,
}

impl FetchInterception {
    /// Open the scope: enable Fetch with the single pattern and arm the
    /// paused-request hook.
    ///
    /// # Errors
    ///
    /// Returns an error if `Fetch.enable` fails.
    #[instrument(level = "debug", skip(conn, url_pattern), fields(stage = ?request_stage, resource = ?resource_type))]
    pub async fn attach(
        conn: Arc<CdpConnection>,
        url_pattern: impl Into<String>,
        request_stage: RequestStage,
        resource_type: ResourceType,
    ) -> Result<Self, CdpError> {
        let pattern = RequestPattern::url(url_pattern)
            .with_resource_type(resource_type)
            .with_stage(request_stage);
        let this = Self {
            conn,
            pattern,
            slot: Mutex::new(Arc::new(Slot::new())),
            handler_id: Mutex::new(None),
        };
        this.setup().await?;
        Ok(this)
    }

    /// Enable Fetch and arm the hook for the current slot.
    async fn setup(&self) -> Result<(), CdpError> {
        let params = EnableParams {
            patterns: Some(vec![self.pattern.clone()]),
            handle_auth_requests: None,
        };
        let _: serde_json::Value = self.conn.send_command("Fetch.enable", Some(params)).await?;
        // Keep a later enable_domain("Fetch") from clobbering the pattern.
        self.conn.mark_domain_enabled("Fetch").await;

        let slot = self.slot.lock().await.clone();
        let hook_conn = self.conn.clone();
        let own_id: Arc<OnceLock<HandlerId>> = Arc::new(OnceLock::new());
        let hook_id = own_id.clone();
        let id = self
            .conn
            .add_handler(REQUEST_PAUSED, move |event| {
                slot.complete(decode_paused(event));
                let conn = hook_conn.clone();
                let own_id = hook_id.clone();
                async move {
                    if let Some(id) = own_id.get().copied() {
                        let _ = conn.remove_handlers(Some(REQUEST_PAUSED), Some(id)).await;
                    }
                }
            })
            .await;
        let _ = own_id.set(id);
        *self.handler_id.lock().await = Some(id);
        debug!("Fetch interception armed");
        Ok(())
    }

    /// Detach the hook and disable Fetch.
    async fn teardown(&self) -> Result<(), CdpError> {
        if let Some(id) = self.handler_id.lock().await.take() {
            let _ = self
                .conn
                .remove_handlers(Some(REQUEST_PAUSED), Some(id))
                .await;
        }
        let _: serde_json::Value = self
            .conn
            .send_command::<serde_json::Value, _>("Fetch.disable", None)
            .await?;
        self.conn.clear_domain_enabled("Fetch").await;
        Ok(())
    }

    /// Re-arm the scope for the next paused request.
    ///
    /// # Errors
    ///
    /// Returns an error if disabling or re-enabling Fetch fails.
    pub async fn reset(&self) -> Result<(), CdpError> {
        debug!("Resetting fetch interception");
        self.teardown().await?;
        *self.slot.lock().await = Arc::new(Slot::new());
        self.setup().await
    }

    /// Leave the scope: detach and send `Fetch.disable`.
    ///
    /// # Errors
    ///
    /// Returns an error if `Fetch.disable` fails.
    pub async fn end(self) -> Result<(), CdpError> {
        self.teardown().await
    }

    /// The paused request event of this arming.
    pub async fn paused(&self) -> Result<RequestPausedEvent, ExpectError> {
        let slot = self.slot.lock().await.clone();
        slot.wait(&self.conn, None).await
    }

    /// As [`paused`](Self::paused), bounded by a deadline.
    pub async fn paused_with_timeout(
        &self,
        deadline: Duration,
    ) -> Result<RequestPausedEvent, ExpectError> {
        let slot = self.slot.lock().await.clone();
        slot.wait(&self.conn, Some(deadline)).await
    }

    /// The paused request.
    pub async fn request(&self) -> Result<Request, ExpectError> {
        Ok(self.paused().await?.request)
    }

    /// Let the paused request through, optionally rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn continue_request(
        &self,
        overrides: ContinueRequestOverrides,
    ) -> Result<(), ExpectError> {
        let request_id = self.paused().await?.request_id;
        let params = ContinueRequestParams {
            request_id,
            url: overrides.url,
            method: overrides.method,
            post_data: overrides.post_data,
            headers: overrides.headers,
            intercept_response: overrides.intercept_response,
        };
        let _: serde_json::Value = self
            .conn
            .send_command("Fetch.continueRequest", Some(params))
            .await?;
        Ok(())
    }

    /// Fail the paused request with the given reason.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn fail_request(&self, error_reason: ErrorReason) -> Result<(), ExpectError> {
        let request_id = self.paused().await?.request_id;
        let params = FailRequestParams {
            request_id,
            error_reason,
        };
        let _: serde_json::Value = self
            .conn
            .send_command("Fetch.failRequest", Some(params))
            .await?;
        Ok(())
    }

    /// Answer the paused request with a synthetic response.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn fulfill_request(
        &self,
        response_code: i32,
        overrides: FulfillRequestOverrides,
    ) -> Result<(), ExpectError> {
        let request_id = self.paused().await?.request_id;
        let params = FulfillRequestParams {
            request_id,
            response_code,
            response_headers: overrides.response_headers,
            binary_response_headers: overrides.binary_response_headers,
            body: overrides.body,
            response_phrase: overrides.response_phrase,
        };
        let _: serde_json::Value = self
            .conn
            .send_command("Fetch.fulfillRequest", Some(params))
            .await?;
        Ok(())
    }

    /// Let a response-stage pause through, optionally rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn continue_response(
        &self,
        overrides: ContinueResponseOverrides,
    ) -> Result<(), ExpectError> {
        let request_id = self.paused().await?.request_id;
        let params = ContinueResponseParams {
            request_id,
            response_code: overrides.response_code,
            response_phrase: overrides.response_phrase,
            response_headers: overrides.response_headers,
            binary_response_headers: overrides.binary_response_headers,
        };
        let _: serde_json::Value = self
            .conn
            .send_command("Fetch.continueResponse", Some(params))
            .await?;
        Ok(())
    }

    /// The paused response's body with its base64-encoded flag.
    ///
    /// Only meaningful at the response stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn response_body(&self) -> Result<(String, bool), ExpectError> {
        let request_id = self.paused().await?.request_id;
        let result: GetResponseBodyResult = self
            .conn
            .send_command("Fetch.getResponseBody", Some(GetResponseBodyParams { request_id }))
            .await?;
        Ok((result.body, result.base64_encoded))
    }

    /// The paused response's body as raw bytes, decoding the base64
    /// form when the browser used it.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the body is not valid
    /// base64 despite the flag.
    pub async fn response_body_bytes(&self) -> Result<Vec<u8>, ExpectError> {
        let (body, base64_encoded) = self.response_body().await?;
        if base64_encoded {
            base64::engine::general_purpose::STANDARD
                .decode(body)
                .map_err(|e| ExpectError::Command(format!("invalid base64 response body: {e}")))
        } else {
            Ok(body.into_bytes())
        }
    }
}

#[cfg(test)]
mod tests;
