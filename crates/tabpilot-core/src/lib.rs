//! # tabpilot-core — high-level browser automation
//!
//! Drives a running Chromium-family browser over the Chrome DevTools
//! Protocol: navigation, JavaScript evaluation, synthetic keyboard
//! input, network expectations, and fetch interception, all bound to a
//! [`Tab`] attached over one WebSocket.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabpilot_core::{ConnectOptions, Tab};
//!
//! # async fn example() -> Result<(), tabpilot_core::TabError> {
//! // Attach to a browser started with --remote-debugging-port=9222
//! let options = ConnectOptions::default();
//! let tab = Tab::attach("http://localhost:9222", &options).await?;
//!
//! tab.navigate("https://example.com").await?;
//! let title = tab.evaluate("document.title").await?;
//! println!("title: {title:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Waiting for Network Traffic
//!
//! Expectation scopes correlate a request, its response, and its
//! loading-finished signal against a URL predicate:
//!
//! ```no_run
//! # async fn example(tab: &tabpilot_core::Tab) -> Result<(), tabpilot_core::TabError> {
//! let expectation = tab.expect_response("https://example.com/api/data").await?;
//! tab.navigate("https://example.com").await?;
//! let (body, base64) = expectation.response_body().await?;
//! expectation.end().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Intercepting Requests
//!
//! ```no_run
//! use tabpilot_cdp::protocol::fetch::RequestStage;
//! use tabpilot_cdp::protocol::network::ResourceType;
//! use tabpilot_core::ContinueRequestOverrides;
//!
//! # async fn example(tab: &tabpilot_core::Tab) -> Result<(), tabpilot_core::TabError> {
//! let interception = tab
//!     .intercept("*/x.json", RequestStage::Response, ResourceType::XHR)
//!     .await?;
//! tab.navigate("https://example.com").await?;
//! let (body, _) = interception.response_body().await?;
//! interception.continue_request(ContinueRequestOverrides::default()).await?;
//! interception.end().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Typing
//!
//! The key-event compiler turns text, named keys, and modifier chords
//! into the ordered key event sequence the protocol expects; emoji and
//! other non-ASCII graphemes travel as single `char` events:
//!
//! ```no_run
//! use tabpilot_cdp::protocol::input::modifiers;
//! use tabpilot_core::{InputItem, SpecialKey};
//!
//! # async fn example(tab: &tabpilot_core::Tab) -> Result<(), tabpilot_core::TabError> {
//! tab.type_text("Hello 👋").await?;
//! tab.press(vec![
//!     InputItem::from(SpecialKey::Enter),
//!     InputItem::from(('a', modifiers::CTRL)),
//! ])
//! .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`tab`] - The tab facade
//! - [`input`] - The key-event compiler
//! - [`expect`] - Request/response/download expectation scopes
//! - [`intercept`] - Fetch interception scopes
//! - [`error`] - Error types

pub mod error;
pub mod expect;
pub mod input;
pub mod intercept;
pub mod tab;

pub use error::{ExpectError, InputError, TabError};
pub use expect::{
    DownloadExpectation, RequestExpectation, ResponseExpectation, UrlPattern,
};
pub use input::{InputItem, KeyEvents, KeyInput, KeyPressKind, SpecialKey};
pub use intercept::{
    ContinueRequestOverrides, ContinueResponseOverrides, FetchInterception,
    FulfillRequestOverrides,
};
pub use tab::Tab;

pub use tabpilot_cdp::{CdpConnection, CdpError, ConnectOptions};
