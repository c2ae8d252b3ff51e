//! # tabpilot-cdp — Chrome DevTools Protocol session layer
//!
//! Low-level CDP plumbing for the tabpilot driver: one WebSocket per
//! browser target, correlated command/reply traffic, and ordered event
//! fan-out.
//!
//! This crate handles:
//! - WebSocket connection management to Chrome/Chromium browsers
//! - CDP message serialization and deserialization
//! - Command/reply correlation with async/await
//! - Event handler registration, per event type or per domain
//! - Endpoint discovery over the browser's HTTP interface
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabpilot_cdp::{discover_page_targets, CdpConnection, ConnectOptions};
//! use tabpilot_cdp::protocol::page::NavigateParams;
//!
//! # async fn example() -> Result<(), tabpilot_cdp::CdpError> {
//! // Find an open page on a debugging-enabled browser
//! let options = ConnectOptions::default();
//! let targets = discover_page_targets("http://localhost:9222", &options).await?;
//! let ws_url = targets
//!     .iter()
//!     .find(|t| t.is_page())
//!     .and_then(|t| t.web_socket_debugger_url.clone())
//!     .expect("no page target");
//!
//! // Attach and drive it
//! let conn = CdpConnection::connect(&ws_url).await?;
//! let result: tabpilot_cdp::protocol::page::NavigateResult = conn
//!     .send_command("Page.navigate", Some(NavigateParams::url("https://example.com")))
//!     .await?;
//! println!("navigated frame {}", result.frame_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Subscribing to Events
//!
//! Handlers are registered per event method name, or per domain with a
//! bare domain marker; they fire in registration order:
//!
//! ```no_run
//! use tabpilot_cdp::CdpConnection;
//!
//! # async fn example(conn: &CdpConnection) -> Result<(), tabpilot_cdp::CdpError> {
//! conn.enable_domain("Network").await?;
//! let id = conn
//!     .add_handler("Network.requestWillBeSent", |event| async move {
//!         println!("request: {:?}", event.params);
//!     })
//!     .await;
//!
//! // ... later
//! conn.remove_handlers(Some("Network.requestWillBeSent"), Some(id))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`connection`] - WebSocket connection management and discovery
//! - [`transport`] - Wire message types
//! - [`protocol`] - Typed CDP domain bindings
//! - [`error`] - Error types

pub mod connection;
pub mod error;
pub mod protocol;
pub mod transport;

pub use connection::{
    discover_page_targets, discover_websocket_url, BrowserVersion, CdpConnection, ConnectOptions,
    EventHandler, HandlerId, TargetInfo,
};
pub use error::CdpError;
pub use transport::{CdpEvent, CdpMessage, CdpRequest, CdpResponse};
