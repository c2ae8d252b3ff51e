//! CDP WebSocket connection management.
//!
//! A [`CdpConnection`] owns one WebSocket to a browser target and
//! multiplexes it three ways: commands travel out with sequential ids,
//! replies complete the matching in-flight command, and unsolicited
//! events fan out to an insertion-ordered handler registry keyed by event
//! method name.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::error::CdpError;
use crate::protocol;
use crate::protocol::browser::{DownloadBehavior, SetDownloadBehaviorParams};
use crate::transport::{CdpEvent, CdpMessage, CdpRequest, CdpResponse};

pub mod discovery;

pub use discovery::{
    discover_page_targets, discover_websocket_url, BrowserVersion, ConnectOptions, TargetInfo,
};

/// Default timeout for CDP commands.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Buffer size for the outgoing command channel.
const COMMAND_CHANNEL_SIZE: usize = 64;

/// A subscribed event callback.
///
/// The closure body runs inline during dispatch, in registration order;
/// the future it returns is spawned and not awaited, so a handler that
/// suspends cannot stall delivery of subsequent events. State that must
/// be observed in event order belongs in the closure body.
pub type EventHandler =
    Arc<dyn Fn(CdpEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Token identifying one `add_handler` registration.
///
/// A registration made with a domain marker yields a single token
/// covering every event of that domain; removing by that token removes
/// exactly the entries the registration created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// State shared between the connection value and its I/O tasks.
struct Shared {
    /// In-flight commands waiting for a reply, keyed by command id.
    pending: Mutex<HashMap<u64, oneshot::Sender<CdpResponse>>>,
    /// Event handlers, insertion-ordered per event method name.
    handlers: Mutex<HashMap<String, Vec<(HandlerId, EventHandler)>>>,
    /// Flipped to true exactly once, on teardown.
    closed_tx: watch::Sender<bool>,
}

impl Shared {
    /// Tear the session down: fail every in-flight command and drop all
    /// handlers. Idempotent; both the explicit close path and the
    /// transport-drop path land here.
    async fn shutdown(&self) {
        if self.closed_tx.send_replace(true) {
            return;
        }
        let mut pending = self.pending.lock().await;
        let abandoned = pending.len();
        // Dropping the senders completes the waiting receivers with an
        // error, which send_command maps to ConnectionClosed.
        pending.clear();
        drop(pending);
        self.handlers.lock().await.clear();
        info!(abandoned_commands = abandoned, "CDP session closed");
    }
}

/// A CDP connection to a single browser target.
pub struct CdpConnection {
    /// Sender for outgoing commands.
    tx: mpsc::Sender<CdpRequest>,
    /// State shared with the I/O tasks.
    shared: Arc<Shared>,
    /// Atomic counter for command ids; the first id handed out is 1.
    next_id: AtomicU64,
    /// Domains for which `<Domain>.enable` has already been sent.
    enabled_domains: Mutex<HashSet<String>>,
    /// Counter backing `HandlerId` allocation.
    next_handler_id: AtomicU64,
    /// Last download behavior applied through this connection.
    download_behavior: Mutex<Option<(DownloadBehavior, Option<String>)>>,
    /// Handle to the background read task.
    read_handle: tokio::task::JoinHandle<()>,
    /// Handle to the background write task.
    write_handle: tokio::task::JoinHandle<()>,
}

impl fmt::Debug for CdpConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpConnection")
            .field("closed", &*self.shared.closed_tx.borrow())
            .finish()
    }
}

impl CdpConnection {
    /// Connect to a CDP WebSocket endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the WebSocket connection fails.
    pub async fn connect(ws_url: &str) -> Result<Self, CdpError> {
        Self::connect_with_options(ws_url, &ConnectOptions::default()).await
    }

    /// Connect to a CDP WebSocket endpoint with explicit options.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be turned into a client
    /// request, a custom header is malformed, or the connection attempt
    /// fails or times out.
    #[instrument(level = "info", skip_all, fields(ws_url = %ws_url))]
    pub async fn connect_with_options(
        ws_url: &str,
        options: &ConnectOptions,
    ) -> Result<Self, CdpError> {
        let mut request = ws_url
            .into_client_request()
            .map_err(|e| CdpError::InvalidEndpointUrl(format!("{ws_url}: {e}")))?;
        for (name, value) in &options.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| CdpError::InvalidArgument(format!("bad header name {name}: {e}")))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| CdpError::InvalidArgument(format!("bad header value: {e}")))?;
            request.headers_mut().insert(name, value);
        }

        let connect_timeout = options.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let (ws_stream, response) = timeout(
            connect_timeout,
            tokio_tungstenite::connect_async(request),
        )
        .await
        .map_err(|_| CdpError::Timeout(connect_timeout))?
        .map_err(|e| CdpError::ConnectionFailed(e.to_string()))?;
        info!(status = %response.status(), "WebSocket connection established");

        let (write, read) = ws_stream.split();
        let (tx, rx) = mpsc::channel::<CdpRequest>(COMMAND_CHANNEL_SIZE);
        let (closed_tx, _) = watch::channel(false);
        let shared = Arc::new(Shared {
            pending: Mutex::new(HashMap::new()),
            handlers: Mutex::new(HashMap::new()),
            closed_tx,
        });

        let write_handle = tokio::spawn(Self::write_loop(rx, write));
        let read_shared = shared.clone();
        let read_handle = tokio::spawn(Self::read_loop(read, read_shared));
        debug!("Spawned CDP read and write loops");

        Ok(Self {
            tx,
            shared,
            next_id: AtomicU64::new(1),
            enabled_domains: Mutex::new(HashSet::new()),
            next_handler_id: AtomicU64::new(1),
            download_behavior: Mutex::new(None),
            read_handle,
            write_handle,
        })
    }

    /// Background task that writes commands to the WebSocket.
    async fn write_loop<S>(mut rx: mpsc::Receiver<CdpRequest>, mut sink: S)
    where
        S: futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
    {
        while let Some(request) = rx.recv().await {
            let json = match serde_json::to_string(&request) {
                Ok(j) => j,
                Err(e) => {
                    error!(error = %e, method = %request.method, "Failed to serialize CDP command");
                    continue;
                }
            };
            trace!(id = request.id, method = %request.method, "Sending CDP command");
            if sink.send(Message::Text(json.into())).await.is_err() {
                warn!("WebSocket sink closed, ending write loop");
                break;
            }
        }
        debug!("CDP write loop ended");
    }

    /// Background task that reads frames from the WebSocket and
    /// dispatches them.
    async fn read_loop<S>(mut stream: S, shared: Arc<Shared>)
    where
        S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
            + Unpin,
    {
        while let Some(msg) = stream.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(frame)) => {
                    info!(?frame, "WebSocket closed by remote");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "WebSocket error, ending read loop");
                    break;
                }
                Ok(_) => continue,
            };

            let message: CdpMessage = match serde_json::from_str(&text) {
                Ok(m) => m,
                Err(e) => {
                    error!(error = %e, "Failed to parse CDP frame");
                    continue;
                }
            };

            match message {
                CdpMessage::Response(resp) => Self::complete_command(&shared, resp).await,
                CdpMessage::Event(event) => Self::dispatch_event(&shared, event).await,
            }
        }
        shared.shutdown().await;
    }

    /// Complete the in-flight command matching a reply frame.
    async fn complete_command(shared: &Shared, resp: CdpResponse) {
        let id = resp.id;
        let sender = shared.pending.lock().await.remove(&id);
        match sender {
            Some(sender) => {
                trace!(id, has_error = resp.error.is_some(), "Completing command");
                let _ = sender.send(resp);
            }
            None => warn!(id, "Dropping reply for unknown command id"),
        }
    }

    /// Fan an event out to its handler bucket.
    ///
    /// Handlers are invoked in registration order. The closure body runs
    /// inline; the returned future is spawned so a suspending handler
    /// cannot block dispatch of the next frame. A panicking handler is
    /// logged and skipped.
    async fn dispatch_event(shared: &Shared, event: CdpEvent) {
        let bucket: Vec<EventHandler> = shared
            .handlers
            .lock()
            .await
            .get(&event.method)
            .map(|entries| entries.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();
        trace!(method = %event.method, handlers = bucket.len(), "Dispatching event");

        for handler in bucket {
            match std::panic::catch_unwind(AssertUnwindSafe(|| handler(event.clone()))) {
                Ok(fut) => {
                    tokio::spawn(fut);
                }
                Err(_) => {
                    warn!(method = %event.method, "Event handler panicked during dispatch");
                }
            }
        }
    }

    /// Send a CDP command and wait for its reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is closed, the reply times out, or
    /// the browser answers with a protocol error.
    pub async fn send_command<P, R>(&self, method: &str, params: Option<P>) -> Result<R, CdpError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.send_command_with_timeout(method, params, DEFAULT_TIMEOUT)
            .await
    }

    /// Send a CDP command with a custom reply timeout.
    ///
    /// # Errors
    ///
    /// As [`send_command`](Self::send_command).
    #[instrument(level = "debug", skip(self, params), fields(method = %method))]
    pub async fn send_command_with_timeout<P, R>(
        &self,
        method: &str,
        params: Option<P>,
        timeout_duration: Duration,
    ) -> Result<R, CdpError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let params_value = params.map(serde_json::to_value).transpose()?;
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params: params_value,
        };

        let (resp_tx, resp_rx) = oneshot::channel();
        {
            let mut pending = self.shared.pending.lock().await;
            pending.insert(id, resp_tx);
            trace!(id, in_flight = pending.len(), "Registered in-flight command");
        }

        if self.tx.send(request).await.is_err() {
            self.shared.pending.lock().await.remove(&id);
            return Err(CdpError::ConnectionClosed);
        }

        let response = match timeout(timeout_duration, resp_rx).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(_)) => return Err(CdpError::ConnectionClosed),
            Err(_) => {
                self.shared.pending.lock().await.remove(&id);
                warn!(id, method = %method, "CDP command timed out");
                return Err(CdpError::Timeout(timeout_duration));
            }
        };

        if let Some(error) = response.error {
            warn!(id, method = %method, code = error.code, error_msg = %error.message, "CDP protocol error");
            return Err(CdpError::Protocol {
                code: error.code,
                message: error.message,
            });
        }

        let result = response.result.unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(CdpError::from)
    }

    /// Register a handler for an event type or a whole domain.
    ///
    /// `event` is either a full event method name
    /// (`"Network.requestWillBeSent"`) or a bare domain marker
    /// (`"Network"`). A domain marker expands, at registration time, to
    /// every event the [`protocol`] module enumerates for that domain.
    /// Duplicate registrations of the same callable are permitted and
    /// fire independently.
    pub async fn add_handler<F, Fut>(&self, event: &str, handler: F) -> HandlerId
    where
        F: Fn(CdpEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: EventHandler = Arc::new(move |event| Box::pin(handler(event)));
        let id = HandlerId(self.next_handler_id.fetch_add(1, Ordering::Relaxed));

        let mut handlers = self.shared.handlers.lock().await;
        for method in Self::expand_event_name(event) {
            handlers
                .entry(method.clone())
                .or_default()
                .push((id, handler.clone()));
            debug!(event = %method, handler_id = id.0, "Registered event handler");
        }
        id
    }

    /// Expand an event name or domain marker into bucket keys.
    fn expand_event_name(event: &str) -> Vec<String> {
        if event.contains('.') {
            return vec![event.to_string()];
        }
        match protocol::domain_events(event) {
            Some(events) => events.iter().map(ToString::to_string).collect(),
            None => {
                warn!(domain = %event, "Unknown domain marker, no handlers registered");
                Vec::new()
            }
        }
    }

    /// Remove handlers from the registry.
    ///
    /// Three forms are accepted: no arguments clears the whole registry;
    /// an event type (or domain marker) alone clears its buckets; an
    /// event type plus a [`HandlerId`] removes the matching entries from
    /// those buckets. Passing a handler without an event type is a usage
    /// error and leaves the registry untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CdpError::InvalidArgument`] for the handler-without-event
    /// form.
    pub async fn remove_handlers(
        &self,
        event: Option<&str>,
        handler: Option<HandlerId>,
    ) -> Result<(), CdpError> {
        match (event, handler) {
            (None, Some(_)) => Err(CdpError::InvalidArgument(
                "removing a specific handler requires its event type".to_string(),
            )),
            (None, None) => {
                self.shared.handlers.lock().await.clear();
                debug!("Cleared all event handlers");
                Ok(())
            }
            (Some(event), None) => {
                let mut handlers = self.shared.handlers.lock().await;
                for method in Self::expand_event_name(event) {
                    handlers.remove(&method);
                }
                debug!(event = %event, "Cleared event handler bucket");
                Ok(())
            }
            (Some(event), Some(id)) => {
                let mut handlers = self.shared.handlers.lock().await;
                for method in Self::expand_event_name(event) {
                    if let Some(bucket) = handlers.get_mut(&method) {
                        bucket.retain(|(entry_id, _)| *entry_id != id);
                        if bucket.is_empty() {
                            handlers.remove(&method);
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Total number of handler entries currently registered.
    pub async fn handler_count(&self) -> usize {
        self.shared
            .handlers
            .lock()
            .await
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Send `<Domain>.enable` unless it was already sent on this
    /// connection. The memo is a hint: it suppresses redundant enables,
    /// it does not track browser-side state.
    ///
    /// # Errors
    ///
    /// Returns an error if the enable command fails.
    pub async fn enable_domain(&self, domain: &str) -> Result<(), CdpError> {
        if self.enabled_domains.lock().await.contains(domain) {
            return Ok(());
        }
        debug!(domain = %domain, "Enabling domain");
        let _: Value = self
            .send_command::<Value, Value>(&format!("{domain}.enable"), None)
            .await?;
        self.enabled_domains.lock().await.insert(domain.to_string());
        Ok(())
    }

    /// Record a domain as enabled without sending anything.
    ///
    /// Used when a caller has issued an enable with bespoke parameters
    /// (e.g. `Fetch.enable` with a request pattern) and later
    /// [`enable_domain`](Self::enable_domain) calls must not clobber it.
    pub async fn mark_domain_enabled(&self, domain: &str) {
        self.enabled_domains.lock().await.insert(domain.to_string());
    }

    /// Forget the enabled mark of a domain, after sending `<Domain>.disable`.
    pub async fn clear_domain_enabled(&self, domain: &str) {
        self.enabled_domains.lock().await.remove(domain);
    }

    /// Apply a download behavior and remember it as the connection's
    /// current `(behavior, path)` tuple.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails; the recorded tuple is left
    /// unchanged in that case.
    pub async fn set_download_behavior(
        &self,
        behavior: DownloadBehavior,
        download_path: Option<String>,
    ) -> Result<(), CdpError> {
        let params = SetDownloadBehaviorParams::new(behavior, download_path.clone());
        let _: Value = self
            .send_command("Browser.setDownloadBehavior", Some(params))
            .await?;
        *self.download_behavior.lock().await = Some((behavior, download_path));
        Ok(())
    }

    /// The last download behavior applied through this connection, if any.
    pub async fn download_behavior(&self) -> Option<(DownloadBehavior, Option<String>)> {
        self.download_behavior.lock().await.clone()
    }

    /// A receiver that flips to `true` when the session closes.
    pub fn closed(&self) -> watch::Receiver<bool> {
        self.shared.closed_tx.subscribe()
    }

    /// Whether the session has been torn down.
    pub fn is_closed(&self) -> bool {
        *self.shared.closed_tx.borrow()
    }

    /// Close the session.
    ///
    /// Every in-flight command and every wait parked on this connection
    /// completes with a session-closed error. Idempotent.
    pub async fn close(&self) {
        self.shared.shutdown().await;
        self.read_handle.abort();
        self.write_handle.abort();
    }
}

impl Drop for CdpConnection {
    fn drop(&mut self) {
        self.read_handle.abort();
        self.write_handle.abort();
    }
}

#[cfg(test)]
mod tests;
