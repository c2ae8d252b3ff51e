use regex::Regex;

use super::*;
use crate::error::ExpectError;

#[test]
fn test_exact_pattern_requires_full_equality() {
    let pattern = UrlPattern::from("http://host/guide.html");
    assert!(pattern.is_full_match("http://host/guide.html"));
    assert!(!pattern.is_full_match("http://host/guide.html?q=1"));
    assert!(!pattern.is_full_match("http://host/guide"));
    assert!(!pattern.is_full_match("https://host/guide.html"));
}

#[test]
fn test_regex_pattern_is_anchored() {
    let pattern = UrlPattern::from(Regex::new(r"http://host/.*\.json").unwrap());
    assert!(pattern.is_full_match("http://host/data.json"));
    assert!(pattern.is_full_match("http://host/a/b/c.json"));
    // A partial hit inside a longer URL is not a match.
    assert!(!pattern.is_full_match("http://host/data.json?cache=no"));
    assert!(!pattern.is_full_match("xhttp://host/data.json"));
}

#[test]
fn test_regex_alternation_is_matched_in_full() {
    let pattern = UrlPattern::from(Regex::new("http://h/a|http://h/ab").unwrap());
    assert!(pattern.is_full_match("http://h/a"));
    assert!(pattern.is_full_match("http://h/ab"));
    assert!(!pattern.is_full_match("http://h/abc"));
}

#[test]
fn test_slot_first_write_wins() {
    let slot: Slot<u32> = Slot::new();
    assert!(slot.peek().is_none());
    assert!(slot.complete(Ok(1)));
    assert!(!slot.complete(Ok(2)));
    assert_eq!(slot.peek().unwrap().unwrap(), 1);
}

#[test]
fn test_slot_reset_rearms() {
    let slot: Slot<u32> = Slot::new();
    assert!(slot.complete(Ok(1)));
    slot.reset();
    assert!(slot.peek().is_none());
    assert!(slot.complete(Ok(2)));
    assert_eq!(slot.peek().unwrap().unwrap(), 2);
}

#[test]
fn test_slot_holds_errors_too() {
    let slot: Slot<u32> = Slot::new();
    assert!(slot.complete(Err(ExpectError::SessionClosed)));
    assert!(matches!(
        slot.peek().unwrap().unwrap_err(),
        ExpectError::SessionClosed
    ));
}

#[test]
fn test_decode_event_failure_is_command_error() {
    let event = tabpilot_cdp::CdpEvent {
        method: "Network.requestWillBeSent".to_string(),
        params: Some(serde_json::json!({"bogus": true})),
    };
    let err = decode_event::<tabpilot_cdp::protocol::network::RequestWillBeSentEvent>(event)
        .unwrap_err();
    assert!(matches!(err, ExpectError::Command(_)));
}
