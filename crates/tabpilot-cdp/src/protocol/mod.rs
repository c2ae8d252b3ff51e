//! Typed CDP domain bindings.
//!
//! Hand-written serde types for the protocol subset the driver consumes.
//! Field names follow CDP's camelCase on the wire and snake_case in Rust.
//!
//! Each domain module exposes an `EVENTS` table listing the event method
//! names of that domain. The tables back domain-marker handler
//! registration: subscribing to a bare domain name expands to every entry
//! in its table.

pub mod browser;
pub mod fetch;
pub mod input;
pub mod network;
pub mod page;
pub mod runtime;

/// Look up the event method names of a domain.
///
/// Returns `None` for domains this crate has no bindings for and for
/// domains without events.
pub fn domain_events(domain: &str) -> Option<&'static [&'static str]> {
    match domain {
        "Browser" => Some(browser::EVENTS),
        "Fetch" => Some(fetch::EVENTS),
        "Network" => Some(network::EVENTS),
        "Page" => Some(page::EVENTS),
        "Runtime" => Some(runtime::EVENTS),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
