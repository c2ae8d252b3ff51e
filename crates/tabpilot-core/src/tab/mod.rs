//! Tab facade.
//!
//! A [`Tab`] is one attached page target: it owns the CDP connection and
//! binds navigation, evaluation, synthetic typing, and the expectation
//! and interception scopes to it.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tabpilot_cdp::protocol::browser::DownloadBehavior;
use tabpilot_cdp::protocol::fetch::RequestStage;
use tabpilot_cdp::protocol::input::InsertTextParams;
use tabpilot_cdp::protocol::network::ResourceType;
use tabpilot_cdp::protocol::page::{NavigateParams, NavigateResult, ReloadParams};
use tabpilot_cdp::protocol::runtime::{EvaluateParams, EvaluateResult};
use tabpilot_cdp::{
    discover_page_targets, CdpConnection, ConnectOptions, HandlerId, TargetInfo,
};
use tracing::{debug, info, instrument};

use crate::error::TabError;
use crate::expect::{
    DownloadExpectation, RequestExpectation, ResponseExpectation, UrlPattern,
};
use crate::input::{InputItem, KeyEvents, KeyPressKind};
use crate::intercept::FetchInterception;

/// Default polling interval for [`Tab::wait_for`].
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One attached page target.
#[derive(Debug)]
pub struct Tab {
    conn: Arc<CdpConnection>,
    target: Option<TargetInfo>,
}

impl Tab {
    /// Attach to the first open page of a debugging-enabled browser.
    ///
    /// `endpoint_url` is the browser's HTTP interface (e.g.
    /// `http://localhost:9222`); the page's own WebSocket URL is
    /// discovered through `/json/list`.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, no attachable page target
    /// exists, or the WebSocket connection fails.
    #[instrument(level = "info", skip(options))]
    pub async fn attach(endpoint_url: &str, options: &ConnectOptions) -> Result<Self, TabError> {
        let targets = discover_page_targets(endpoint_url, options).await?;
        let target = targets
            .into_iter()
            .find(|t| t.is_page() && t.web_socket_debugger_url.is_some())
            .ok_or_else(|| TabError::NoPageTarget(endpoint_url.to_string()))?;
        let Some(ws_url) = target.web_socket_debugger_url.clone() else {
            return Err(TabError::NoPageTarget(endpoint_url.to_string()));
        };

        info!(target_id = %target.id, url = %target.url, "Attaching to page target");
        let conn = CdpConnection::connect_with_options(&ws_url, options).await?;
        Ok(Self {
            conn: Arc::new(conn),
            target: Some(target),
        })
    }

    /// Attach directly to a page's WebSocket URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the WebSocket connection fails.
    pub async fn connect(ws_url: &str) -> Result<Self, TabError> {
        let conn = CdpConnection::connect(ws_url).await?;
        Ok(Self {
            conn: Arc::new(conn),
            target: None,
        })
    }

    /// The underlying connection, for raw commands and handlers.
    pub fn connection(&self) -> &Arc<CdpConnection> {
        &self.conn
    }

    /// The discovery-time target info, when attached through discovery.
    pub fn target_info(&self) -> Option<&TargetInfo> {
        self.target.as_ref()
    }

    /// Navigate the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the browser blocks the
    /// navigation.
    #[instrument(level = "debug", skip(self))]
    pub async fn navigate(&self, url: &str) -> Result<NavigateResult, TabError> {
        let result: NavigateResult = self
            .conn
            .send_command("Page.navigate", Some(NavigateParams::url(url)))
            .await?;
        if let Some(error) = &result.error_text {
            return Err(TabError::Navigation(error.clone()));
        }
        Ok(result)
    }

    /// Reload the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn reload(&self) -> Result<(), TabError> {
        let _: Value = self
            .conn
            .send_command("Page.reload", Some(ReloadParams::default()))
            .await?;
        Ok(())
    }

    /// Evaluate a JavaScript expression in the page, returning its
    /// JSON value when it has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the expression throws.
    #[instrument(level = "debug", skip(self, expression))]
    pub async fn evaluate(&self, expression: &str) -> Result<Option<Value>, TabError> {
        let result: EvaluateResult = self
            .conn
            .send_command("Runtime.evaluate", Some(EvaluateParams::expression(expression)))
            .await?;
        if let Some(details) = result.exception_details {
            let text = details
                .exception
                .and_then(|e| e.description)
                .unwrap_or(details.text);
            return Err(TabError::Evaluation(text));
        }
        Ok(result.result.value)
    }

    /// The page's current URL.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    pub async fn url(&self) -> Result<String, TabError> {
        let value = self.evaluate("location.href").await?;
        Ok(value.and_then(|v| v.as_str().map(ToString::to_string)).unwrap_or_default())
    }

    /// The page's serialized HTML.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    pub async fn content(&self) -> Result<String, TabError> {
        let value = self.evaluate("document.documentElement.outerHTML").await?;
        Ok(value.and_then(|v| v.as_str().map(ToString::to_string)).unwrap_or_default())
    }

    /// Type text into the focused element, key event by key event.
    ///
    /// # Errors
    ///
    /// Returns an error if compilation or a dispatch command fails.
    #[instrument(level = "debug", skip(self, text), fields(text_len = text.len()))]
    pub async fn type_text(&self, text: &str) -> Result<(), TabError> {
        let payloads = KeyEvents::from_text(text, KeyPressKind::DownAndUp)?;
        self.dispatch_key_events(payloads).await
    }

    /// Send a mixed sequence of text, named keys, and modifier chords.
    ///
    /// # Errors
    ///
    /// Returns an error if compilation or a dispatch command fails.
    #[instrument(level = "debug", skip(self, items))]
    pub async fn press<I>(&self, items: I) -> Result<(), TabError>
    where
        I: IntoIterator<Item = InputItem>,
    {
        let payloads = KeyEvents::from_mixed_input(items, KeyPressKind::DownAndUp)?;
        self.dispatch_key_events(payloads).await
    }

    /// Insert text directly, without synthesizing key events.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn insert_text(&self, text: &str) -> Result<(), TabError> {
        let _: Value = self
            .conn
            .send_command(
                "Input.insertText",
                Some(InsertTextParams {
                    text: text.to_string(),
                }),
            )
            .await?;
        Ok(())
    }

    async fn dispatch_key_events(
        &self,
        payloads: Vec<tabpilot_cdp::protocol::input::DispatchKeyEventParams>,
    ) -> Result<(), TabError> {
        debug!(count = payloads.len(), "Dispatching key events");
        for payload in payloads {
            let _: Value = self
                .conn
                .send_command("Input.dispatchKeyEvent", Some(payload))
                .await?;
        }
        Ok(())
    }

    /// Suspend for a duration.
    pub async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Poll an async condition until it holds.
    ///
    /// # Errors
    ///
    /// Returns an error when `timeout` passes without the condition
    /// holding.
    pub async fn wait_for<F, Fut>(&self, condition: F, timeout: Duration) -> Result<(), TabError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        self.wait_for_with_interval(condition, timeout, DEFAULT_POLL_INTERVAL)
            .await
    }

    /// As [`wait_for`](Self::wait_for), with an explicit poll interval.
    ///
    /// # Errors
    ///
    /// Returns an error when `timeout` passes without the condition
    /// holding.
    pub async fn wait_for_with_interval<F, Fut>(
        &self,
        mut condition: F,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<(), TabError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        tokio::time::timeout(timeout, async {
            loop {
                if condition().await {
                    return;
                }
                tokio::time::sleep(poll_interval).await;
            }
        })
        .await
        .map_err(|_| TabError::WaitTimeout(timeout))
    }

    /// Apply a download behavior for this connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn set_download_behavior(
        &self,
        behavior: DownloadBehavior,
        download_path: Option<String>,
    ) -> Result<(), TabError> {
        self.conn
            .set_download_behavior(behavior, download_path)
            .await?;
        Ok(())
    }

    /// Open a request expectation scope on this tab.
    ///
    /// # Errors
    ///
    /// Returns an error if the Network domain cannot be enabled.
    pub async fn expect_request(
        &self,
        pattern: impl Into<UrlPattern>,
    ) -> Result<RequestExpectation, TabError> {
        Ok(RequestExpectation::attach(self.conn.clone(), pattern).await?)
    }

    /// Open a response expectation scope on this tab.
    ///
    /// # Errors
    ///
    /// Returns an error if the Network domain cannot be enabled.
    pub async fn expect_response(
        &self,
        pattern: impl Into<UrlPattern>,
    ) -> Result<ResponseExpectation, TabError> {
        Ok(ResponseExpectation::attach(self.conn.clone(), pattern).await?)
    }

    /// Open a download expectation scope on this tab.
    ///
    /// # Errors
    ///
    /// Returns an error if the download behavior cannot be applied.
    pub async fn expect_download(&self) -> Result<DownloadExpectation, TabError> {
        Ok(DownloadExpectation::attach(self.conn.clone()).await?)
    }

    /// Open a fetch interception scope on this tab.
    ///
    /// # Errors
    ///
    /// Returns an error if `Fetch.enable` fails.
    pub async fn intercept(
        &self,
        url_pattern: impl Into<String>,
        request_stage: RequestStage,
        resource_type: ResourceType,
    ) -> Result<FetchInterception, TabError> {
        Ok(FetchInterception::attach(self.conn.clone(), url_pattern, request_stage, resource_type)
            .await?)
    }

    /// Register an event handler; see
    /// [`CdpConnection::add_handler`].
    pub async fn add_handler<F, Fut>(&self, event: &str, handler: F) -> HandlerId
    where
        F: Fn(tabpilot_cdp::CdpEvent) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.conn.add_handler(event, handler).await
    }

    /// Remove event handlers; see
    /// [`CdpConnection::remove_handlers`].
    ///
    /// # Errors
    ///
    /// Returns an error for the handler-without-event form.
    pub async fn remove_handlers(
        &self,
        event: Option<&str>,
        handler: Option<HandlerId>,
    ) -> Result<(), TabError> {
        Ok(self.conn.remove_handlers(event, handler).await?)
    }

    /// Enable a CDP domain once; see
    /// [`CdpConnection::enable_domain`].
    ///
    /// # Errors
    ///
    /// Returns an error if the enable command fails.
    pub async fn enable_domain(&self, domain: &str) -> Result<(), TabError> {
        Ok(self.conn.enable_domain(domain).await?)
    }

    /// Close the tab's session. Everything pending completes with a
    /// session-closed error.
    pub async fn close(&self) {
        self.conn.close().await;
    }
}
