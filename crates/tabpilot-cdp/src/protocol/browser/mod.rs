//! Browser domain types.
//!
//! Version information and download behavior control.

use serde::{Deserialize, Serialize};

/// Event method names of the Browser domain.
pub const EVENTS: &[&str] = &["Browser.downloadWillBegin", "Browser.downloadProgress"];

/// Whether to allow all or deny all download requests, or use default
/// browser behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DownloadBehavior {
    /// Use the default browser behavior.
    #[default]
    Default,
    /// Allow downloads into the configured path.
    Allow,
    /// Allow downloads, naming files by their download guid.
    AllowAndName,
    /// Deny all downloads.
    Deny,
}

/// Parameters for Browser.setDownloadBehavior.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDownloadBehaviorParams {
    /// Behavior to apply.
    pub behavior: DownloadBehavior,
    /// Download directory; required for `Allow` and `AllowAndName`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_path: Option<String>,
    /// Whether to emit download events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_enabled: Option<bool>,
}

impl SetDownloadBehaviorParams {
    /// Apply `behavior` with an optional download directory.
    pub fn new(behavior: DownloadBehavior, download_path: Option<String>) -> Self {
        Self {
            behavior,
            download_path,
            events_enabled: None,
        }
    }

    /// Request download events alongside the behavior change.
    #[must_use]
    pub fn with_events(mut self) -> Self {
        self.events_enabled = Some(true);
        self
    }
}

/// Result for Browser.getVersion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVersionResult {
    /// Protocol version.
    pub protocol_version: String,
    /// Product name and version.
    pub product: String,
    /// Product revision.
    pub revision: String,
    /// User-Agent string.
    pub user_agent: String,
    /// V8 version.
    pub js_version: String,
}

/// Event: Browser.downloadWillBegin
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadWillBeginEvent {
    /// Id of the frame that caused the download to begin.
    pub frame_id: String,
    /// Global unique identifier of the download.
    pub guid: String,
    /// URL of the resource being downloaded.
    pub url: String,
    /// Suggested file name of the resource.
    pub suggested_filename: String,
}

/// Download state reported by downloadProgress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadState {
    /// Download is in progress.
    InProgress,
    /// Download finished.
    Completed,
    /// Download was canceled.
    Canceled,
}

/// Event: Browser.downloadProgress
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadProgressEvent {
    /// Global unique identifier of the download.
    pub guid: String,
    /// Total expected bytes.
    pub total_bytes: f64,
    /// Total bytes received.
    pub received_bytes: f64,
    /// Download status.
    pub state: DownloadState,
}
