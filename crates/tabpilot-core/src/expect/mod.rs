//! Network expectation scopes.
//!
//! An expectation is a scoped collector: it hooks the connection's
//! network events, correlates the request → response → loading-finished
//! sequence of the first request whose URL matches a predicate, and
//! exposes the captured pieces through single-fire slots. Hooks detach
//! themselves as they fire; [`end`](RequestExpectation::end) detaches
//! whatever is left; [`reset`](RequestExpectation::reset) re-arms the
//! scope in place.

mod slot;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use tabpilot_cdp::protocol::browser::{
    DownloadBehavior, DownloadWillBeginEvent, SetDownloadBehaviorParams,
};
use tabpilot_cdp::protocol::network::{
    GetResponseBodyParams, GetResponseBodyResult, LoadingFinishedEvent, Request,
    RequestWillBeSentEvent, Response, ResponseReceivedEvent,
};
use tabpilot_cdp::{CdpConnection, CdpError, CdpEvent, HandlerId};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::error::ExpectError;
pub(crate) use slot::Slot;

const REQUEST_WILL_BE_SENT: &str = "Network.requestWillBeSent";
const RESPONSE_RECEIVED: &str = "Network.responseReceived";
const LOADING_FINISHED: &str = "Network.loadingFinished";
const DOWNLOAD_WILL_BEGIN: &str = "Browser.downloadWillBegin";

/// URL predicate of an expectation scope.
///
/// Both forms match the whole URL: an exact pattern must equal it, a
/// regex must consume it end to end. There are no partial matches.
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Byte-for-byte equality with the URL.
    Exact(String),
    /// A regex that must span the complete URL.
    Regex(Regex),
}

impl UrlPattern {
    /// Whether `url` is matched in full.
    pub fn is_full_match(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => pattern == url,
            Self::Regex(regex) => regex.is_match(url),
        }
    }
}

impl From<&str> for UrlPattern {
    fn from(pattern: &str) -> Self {
        Self::Exact(pattern.to_string())
    }
}

impl From<String> for UrlPattern {
    fn from(pattern: String) -> Self {
        Self::Exact(pattern)
    }
}

impl From<Regex> for UrlPattern {
    fn from(regex: Regex) -> Self {
        // Anchor so a match must span the whole URL.
        let anchored = Regex::new(&format!("^(?:{})$", regex.as_str())).unwrap_or(regex);
        Self::Regex(anchored)
    }
}

/// Decode an event's params into its typed form.
fn decode_event<T: serde::de::DeserializeOwned>(event: CdpEvent) -> Result<T, ExpectError> {
    let params = event.params.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(params)
        .map_err(|e| ExpectError::Command(format!("failed to decode {}: {e}", event.method)))
}

/// Correlation state of one arming of an expectation scope.
#[derive(Debug)]
struct ArmedState {
    pattern: UrlPattern,
    request_id: OnceLock<String>,
    request_slot: Slot<RequestWillBeSentEvent>,
    response_slot: Slot<ResponseReceivedEvent>,
    finished_slot: Slot<LoadingFinishedEvent>,
}

impl ArmedState {
    fn new(pattern: UrlPattern) -> Self {
        Self {
            pattern,
            request_id: OnceLock::new(),
            request_slot: Slot::new(),
            response_slot: Slot::new(),
            finished_slot: Slot::new(),
        }
    }
}

/// The shared request/response/loading-finished state machine.
#[derive(Debug)]
struct BaseExpectation {
    conn: Arc<CdpConnection>,
    pattern: UrlPattern,
    state: Mutex<Arc<ArmedState>>,
    handler_ids: Mutex<Vec<(&'static str, HandlerId)>>,
}

impl BaseExpectation {
    /// Enable the Network domain and arm the three hooks.
    async fn attach(conn: Arc<CdpConnection>, pattern: UrlPattern) -> Result<Self, CdpError> {
        conn.enable_domain("Network").await?;
        let this = Self {
            conn,
            pattern: pattern.clone(),
            state: Mutex::new(Arc::new(ArmedState::new(pattern))),
            handler_ids: Mutex::new(Vec::new()),
        };
        this.arm().await;
        Ok(this)
    }

    /// Register the three hooks for the current arming.
    ///
    /// Each hook does its correlation work in the synchronous dispatch
    /// phase, so slot completion is ordered with event delivery, and
    /// detaches itself once it has fired. A hook that fails to decode
    /// its event fails its slot and detaches; the connection is left
    /// intact.
    async fn arm(&self) {
        let state = self.state.lock().await.clone();
        let mut armed = Vec::with_capacity(3);

        let id = {
            let state = state.clone();
            self.add_self_detaching_hook(REQUEST_WILL_BE_SENT, move |event| {
                match decode_event::<RequestWillBeSentEvent>(event) {
                    Ok(event) => {
                        if state.request_id.get().is_some()
                            || !state.pattern.is_full_match(&event.request.url)
                        {
                            return false;
                        }
                        let _ = state.request_id.set(event.request_id.clone());
                        state.request_slot.complete(Ok(event));
                        true
                    }
                    Err(err) => {
                        state.request_slot.complete(Err(err));
                        true
                    }
                }
            })
            .await
        };
        armed.push((REQUEST_WILL_BE_SENT, id));

        let id = {
            let state = state.clone();
            self.add_self_detaching_hook(RESPONSE_RECEIVED, move |event| {
                match decode_event::<ResponseReceivedEvent>(event) {
                    Ok(event) => {
                        if state.request_id.get() != Some(&event.request_id) {
                            return false;
                        }
                        state.response_slot.complete(Ok(event));
                        true
                    }
                    Err(err) => {
                        state.response_slot.complete(Err(err));
                        true
                    }
                }
            })
            .await
        };
        armed.push((RESPONSE_RECEIVED, id));

        let id = {
            let state = state.clone();
            self.add_self_detaching_hook(LOADING_FINISHED, move |event| {
                match decode_event::<LoadingFinishedEvent>(event) {
                    Ok(event) => {
                        if state.request_id.get() != Some(&event.request_id) {
                            return false;
                        }
                        state.finished_slot.complete(Ok(event));
                        true
                    }
                    Err(err) => {
                        state.finished_slot.complete(Err(err));
                        true
                    }
                }
            })
            .await
        };
        armed.push((LOADING_FINISHED, id));

        self.handler_ids.lock().await.extend(armed);
    }

    /// Register `hook` for `event`; when it returns true it is removed
    /// from the connection.
    async fn add_self_detaching_hook<F>(&self, event: &'static str, hook: F) -> HandlerId
    where
        F: Fn(CdpEvent) -> bool + Send + Sync + 'static,
    {
        let conn = self.conn.clone();
        let own_id: Arc<OnceLock<HandlerId>> = Arc::new(OnceLock::new());
        let hook_id = own_id.clone();
        let id = self
            .conn
            .add_handler(event, move |incoming| {
                let fired = hook(incoming);
                let conn = conn.clone();
                let own_id = hook_id.clone();
                async move {
                    if fired {
                        if let Some(id) = own_id.get().copied() {
                            let _ = conn.remove_handlers(Some(event), Some(id)).await;
                        }
                    }
                }
            })
            .await;
        let _ = own_id.set(id);
        id
    }

    /// Detach every hook of the current arming. Idempotent.
    async fn detach(&self) {
        let armed: Vec<_> = {
            let mut ids = self.handler_ids.lock().await;
            ids.drain(..).collect()
        };
        for (event, id) in armed {
            let _ = self.conn.remove_handlers(Some(event), Some(id)).await;
        }
    }

    /// Clear the correlation state and re-arm the hooks.
    async fn reset(&self) {
        debug!("Resetting expectation scope");
        self.detach().await;
        *self.state.lock().await = Arc::new(ArmedState::new(self.pattern.clone()));
        self.arm().await;
    }

    async fn request_event(
        &self,
        deadline: Option<Duration>,
    ) -> Result<RequestWillBeSentEvent, ExpectError> {
        let state = self.state.lock().await.clone();
        state.request_slot.wait(&self.conn, deadline).await
    }

    async fn response_event(
        &self,
        deadline: Option<Duration>,
    ) -> Result<ResponseReceivedEvent, ExpectError> {
        let state = self.state.lock().await.clone();
        state.response_slot.wait(&self.conn, deadline).await
    }

    async fn finished_event(
        &self,
        deadline: Option<Duration>,
    ) -> Result<LoadingFinishedEvent, ExpectError> {
        let state = self.state.lock().await.clone();
        state.finished_slot.wait(&self.conn, deadline).await
    }

    /// Wait out the load, then fetch the response body.
    async fn response_body(&self, deadline: Option<Duration>) -> Result<(String, bool), ExpectError> {
        let response = self.response_event(deadline).await?;
        self.finished_event(deadline).await?;
        let result: GetResponseBodyResult = self
            .conn
            .send_command(
                "Network.getResponseBody",
                Some(GetResponseBodyParams {
                    request_id: response.request_id,
                }),
            )
            .await?;
        Ok((result.body, result.base64_encoded))
    }
}

/// Waits for the first network request matching a URL predicate.
#[derive(Debug)]
pub struct RequestExpectation {
    inner: BaseExpectation,
}

impl RequestExpectation {
    /// Open the scope: enable the Network domain and arm the hooks.
    ///
    /// # Errors
    ///
    /// Returns an error if enabling the domain fails.
    #[instrument(level = "debug", skip(conn, pattern))]
    pub async fn attach(
        conn: Arc<CdpConnection>,
        pattern: impl Into<UrlPattern>,
    ) -> Result<Self, CdpError> {
        Ok(Self {
            inner: BaseExpectation::attach(conn, pattern.into()).await?,
        })
    }

    /// The matched request event.
    pub async fn value(&self) -> Result<RequestWillBeSentEvent, ExpectError> {
        self.inner.request_event(None).await
    }

    /// As [`value`](Self::value), bounded by a deadline.
    pub async fn value_with_timeout(
        &self,
        deadline: Duration,
    ) -> Result<RequestWillBeSentEvent, ExpectError> {
        self.inner.request_event(Some(deadline)).await
    }

    /// The matched request.
    pub async fn request(&self) -> Result<Request, ExpectError> {
        Ok(self.inner.request_event(None).await?.request)
    }

    /// The response to the matched request.
    pub async fn response(&self) -> Result<Response, ExpectError> {
        Ok(self.inner.response_event(None).await?.response)
    }

    /// The response body of the matched request, with its
    /// base64-encoded flag.
    pub async fn response_body(&self) -> Result<(String, bool), ExpectError> {
        self.inner.response_body(None).await
    }

    /// Clear the correlation state and re-arm, staying in the scope.
    pub async fn reset(&self) {
        self.inner.reset().await;
    }

    /// Leave the scope, detaching any hooks still armed.
    pub async fn end(self) {
        self.inner.detach().await;
    }
}

/// Waits for the response of the first network request matching a URL
/// predicate.
#[derive(Debug)]
pub struct ResponseExpectation {
    inner: BaseExpectation,
}

impl ResponseExpectation {
    /// Open the scope: enable the Network domain and arm the hooks.
    ///
    /// # Errors
    ///
    /// Returns an error if enabling the domain fails.
    #[instrument(level = "debug", skip(conn, pattern))]
    pub async fn attach(
        conn: Arc<CdpConnection>,
        pattern: impl Into<UrlPattern>,
    ) -> Result<Self, CdpError> {
        Ok(Self {
            inner: BaseExpectation::attach(conn, pattern.into()).await?,
        })
    }

    /// The matched response event.
    pub async fn value(&self) -> Result<ResponseReceivedEvent, ExpectError> {
        self.inner.response_event(None).await
    }

    /// As [`value`](Self::value), bounded by a deadline.
    pub async fn value_with_timeout(
        &self,
        deadline: Duration,
    ) -> Result<ResponseReceivedEvent, ExpectError> {
        self.inner.response_event(Some(deadline)).await
    }

    /// The matched request.
    pub async fn request(&self) -> Result<Request, ExpectError> {
        Ok(self.inner.request_event(None).await?.request)
    }

    /// The response to the matched request.
    pub async fn response(&self) -> Result<Response, ExpectError> {
        Ok(self.inner.response_event(None).await?.response)
    }

    /// The response body of the matched request, with its
    /// base64-encoded flag.
    pub async fn response_body(&self) -> Result<(String, bool), ExpectError> {
        self.inner.response_body(None).await
    }

    /// Clear the correlation state and re-arm, staying in the scope.
    pub async fn reset(&self) {
        self.inner.reset().await;
    }

    /// Leave the scope, detaching any hooks still armed.
    pub async fn end(self) {
        self.inner.detach().await;
    }
}

/// Catches the next download instead of letting it hit the disk.
///
/// Entering the scope forces the `deny` download behavior (with download
/// events on) and hooks `Browser.downloadWillBegin`; leaving it restores
/// whatever behavior the connection had before.
#[derive(Debug)]
pub struct DownloadExpectation {
    conn: Arc<CdpConnection>,
    slot: Arc<Slot<DownloadWillBeginEvent>>,
    handler_id: HandlerId,
    prior: (DownloadBehavior, Option<String>),
}

impl DownloadExpectation {
    /// Open the scope: deny downloads and arm the hook.
    ///
    /// # Errors
    ///
    /// Returns an error if the download behavior cannot be applied.
    #[instrument(level = "debug", skip(conn))]
    pub async fn attach(conn: Arc<CdpConnection>) -> Result<Self, CdpError> {
        let prior = conn
            .download_behavior()
            .await
            .unwrap_or((DownloadBehavior::Default, None));

        let params = SetDownloadBehaviorParams::new(DownloadBehavior::Deny, None).with_events();
        let _: serde_json::Value = conn
            .send_command("Browser.setDownloadBehavior", Some(params))
            .await?;

        let slot = Arc::new(Slot::new());
        let handler_id = {
            let slot = slot.clone();
            let detach_conn = conn.clone();
            let own_id: Arc<OnceLock<HandlerId>> = Arc::new(OnceLock::new());
            let hook_id = own_id.clone();
            let id = conn
                .add_handler(DOWNLOAD_WILL_BEGIN, move |event| {
                    slot.complete(decode_event::<DownloadWillBeginEvent>(event));
                    let conn = detach_conn.clone();
                    let own_id = hook_id.clone();
                    async move {
                        if let Some(id) = own_id.get().copied() {
                            let _ = conn
                                .remove_handlers(Some(DOWNLOAD_WILL_BEGIN), Some(id))
                                .await;
                        }
                    }
                })
                .await;
            let _ = own_id.set(id);
            id
        };

        Ok(Self {
            conn,
            slot,
            handler_id,
            prior,
        })
    }

    /// The caught download event.
    pub async fn value(&self) -> Result<DownloadWillBeginEvent, ExpectError> {
        self.slot.wait(&self.conn, None).await
    }

    /// As [`value`](Self::value), bounded by a deadline.
    pub async fn value_with_timeout(
        &self,
        deadline: Duration,
    ) -> Result<DownloadWillBeginEvent, ExpectError> {
        self.slot.wait(&self.conn, Some(deadline)).await
    }

    /// Leave the scope: restore the prior download behavior and detach.
    ///
    /// # Errors
    ///
    /// Returns an error if the prior behavior cannot be restored; the
    /// hook is detached regardless.
    pub async fn end(self) -> Result<(), CdpError> {
        let restore = self
            .conn
            .set_download_behavior(self.prior.0, self.prior.1.clone())
            .await;
        let _ = self
            .conn
            .remove_handlers(Some(DOWNLOAD_WILL_BEGIN), Some(self.handler_id))
            .await;
        restore
    }
}

#[cfg(test)]
mod tests;
