//! CDP endpoint discovery via HTTP.
//!
//! A debugging-enabled browser exposes an HTTP endpoint next to the
//! WebSocket one. `/json/version` carries the browser-level WebSocket
//! URL; `/json/list` enumerates the open targets, each with its own
//! WebSocket URL a tab-level connection attaches to.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::CdpError;

/// Default timeout for HTTP endpoint discovery.
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Response from the `/json/version` endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserVersion {
    /// Browser name and version.
    pub browser: Option<String>,
    /// Protocol version.
    pub protocol_version: Option<String>,
    /// User agent string.
    pub user_agent: Option<String>,
    /// The WebSocket URL for the browser-level CDP connection.
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: Option<String>,
}

/// One entry from the `/json/list` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    /// Target identifier.
    pub id: String,
    /// Target type, e.g. "page", "iframe", "service_worker".
    #[serde(rename = "type")]
    pub target_type: String,
    /// Document title.
    pub title: String,
    /// Current URL.
    pub url: String,
    /// The WebSocket URL to attach to this target.
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: Option<String>,
}

impl TargetInfo {
    /// Whether this target is a regular page.
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }
}

/// Options for endpoint discovery and WebSocket connection.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Timeout for the connection attempt.
    pub timeout: Option<Duration>,
    /// Custom headers for the HTTP requests and the WebSocket upgrade.
    pub headers: HashMap<String, String>,
}

impl ConnectOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a custom header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Validate an endpoint URL and build an HTTP client for it.
fn discovery_client(
    endpoint_url: &str,
    options: &ConnectOptions,
) -> Result<(Url, reqwest::Client, Duration), CdpError> {
    let base_url = Url::parse(endpoint_url)
        .map_err(|e| CdpError::InvalidEndpointUrl(format!("{endpoint_url}: {e}")))?;

    if base_url.scheme() != "http" && base_url.scheme() != "https" {
        return Err(CdpError::InvalidEndpointUrl(format!(
            "expected http or https scheme, got: {}",
            base_url.scheme()
        )));
    }

    let timeout = options.timeout.unwrap_or(DEFAULT_DISCOVERY_TIMEOUT);
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CdpError::HttpRequestFailed(e.to_string()))?;
    Ok((base_url, client, timeout))
}

/// Perform one discovery GET and decode the JSON body.
async fn discovery_get<T: serde::de::DeserializeOwned>(
    endpoint_url: &str,
    path: &str,
    options: &ConnectOptions,
) -> Result<T, CdpError> {
    let (base_url, client, timeout) = discovery_client(endpoint_url, options)?;
    let url = base_url
        .join(path)
        .map_err(|e| CdpError::InvalidEndpointUrl(format!("failed to build {path} URL: {e}")))?;

    let mut request = client.get(url.as_str());
    for (name, value) in &options.headers {
        request = request.header(name, value);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            CdpError::Timeout(timeout)
        } else if e.is_connect() {
            CdpError::ConnectionFailed(format!("failed to connect to {endpoint_url}: {e}"))
        } else {
            CdpError::HttpRequestFailed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(CdpError::EndpointDiscoveryFailed {
            url: endpoint_url.to_string(),
            reason: format!("HTTP status {}", response.status()),
        });
    }

    response
        .json()
        .await
        .map_err(|e| CdpError::EndpointDiscoveryFailed {
            url: endpoint_url.to_string(),
            reason: format!("failed to parse response: {e}"),
        })
}

/// Discover the browser-level WebSocket URL from an HTTP endpoint.
///
/// Given a URL like `http://localhost:9222`, fetches `/json/version` and
/// returns its `webSocketDebuggerUrl`. A `ws://` or `wss://` URL is
/// returned unchanged.
///
/// # Errors
///
/// Returns an error if the URL is invalid, the HTTP request fails, or
/// the response carries no WebSocket URL.
#[instrument(level = "info", skip(options))]
pub async fn discover_websocket_url(
    endpoint_url: &str,
    options: &ConnectOptions,
) -> Result<String, CdpError> {
    if endpoint_url.starts_with("ws://") || endpoint_url.starts_with("wss://") {
        debug!("URL is already a WebSocket URL, returning as-is");
        return Ok(endpoint_url.to_string());
    }

    let version: BrowserVersion = discovery_get(endpoint_url, "/json/version", options).await?;
    let ws_url =
        version
            .web_socket_debugger_url
            .ok_or_else(|| CdpError::EndpointDiscoveryFailed {
                url: endpoint_url.to_string(),
                reason: "response missing webSocketDebuggerUrl field".to_string(),
            })?;

    info!(ws_url = %ws_url, browser = ?version.browser, "Discovered WebSocket URL");
    Ok(ws_url)
}

/// Enumerate the open targets of a browser via `/json/list`.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the HTTP request fails.
#[instrument(level = "info", skip(options))]
pub async fn discover_page_targets(
    endpoint_url: &str,
    options: &ConnectOptions,
) -> Result<Vec<TargetInfo>, CdpError> {
    let targets: Vec<TargetInfo> = discovery_get(endpoint_url, "/json/list", options).await?;
    info!(count = targets.len(), "Discovered targets");
    Ok(targets)
}

#[cfg(test)]
mod tests;
