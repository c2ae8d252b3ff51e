use super::*;
use crate::protocol::browser::{DownloadBehavior, SetDownloadBehaviorParams};
use crate::protocol::fetch::{RequestPattern, RequestStage};
use crate::protocol::input::{DispatchKeyEventParams, KeyEventType};
use crate::protocol::network::{RequestWillBeSentEvent, ResourceType};
use crate::protocol::page::NavigateParams;

#[test]
fn test_domain_events_known_domains() {
    assert_eq!(domain_events("Network").unwrap().len(), 5);
    assert_eq!(domain_events("Fetch").unwrap().len(), 2);
    assert!(domain_events("Page").unwrap().contains(&"Page.loadEventFired"));
    assert!(domain_events("Browser")
        .unwrap()
        .contains(&"Browser.downloadWillBegin"));
}

#[test]
fn test_domain_events_unknown_domain() {
    assert!(domain_events("Input").is_none());
    assert!(domain_events("NoSuchDomain").is_none());
}

#[test]
fn test_event_tables_are_prefixed_by_domain() {
    for (domain, events) in [
        ("Browser", browser::EVENTS),
        ("Fetch", fetch::EVENTS),
        ("Network", network::EVENTS),
        ("Page", page::EVENTS),
        ("Runtime", runtime::EVENTS),
    ] {
        for event in events {
            assert!(
                event.starts_with(&format!("{domain}.")),
                "{event} not in domain {domain}"
            );
        }
    }
}

#[test]
fn test_navigate_params_serialization() {
    let params = NavigateParams::url("https://example.com");
    let json = serde_json::to_string(&params).unwrap();
    assert_eq!(json, r#"{"url":"https://example.com"}"#);
}

#[test]
fn test_request_pattern_serialization() {
    let pattern = RequestPattern::url("*/data.json")
        .with_resource_type(ResourceType::XHR)
        .with_stage(RequestStage::Response);
    let json = serde_json::to_value(&pattern).unwrap();
    assert_eq!(json["urlPattern"], "*/data.json");
    assert_eq!(json["resourceType"], "XHR");
    assert_eq!(json["requestStage"], "Response");
}

#[test]
fn test_download_behavior_serialization() {
    let params = SetDownloadBehaviorParams::new(
        DownloadBehavior::AllowAndName,
        Some("/tmp/downloads".to_string()),
    );
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json["behavior"], "allowAndName");
    assert_eq!(json["downloadPath"], "/tmp/downloads");
    assert!(json.get("eventsEnabled").is_none());

    let params = SetDownloadBehaviorParams::new(DownloadBehavior::Deny, None).with_events();
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json["behavior"], "deny");
    assert_eq!(json["eventsEnabled"], true);
}

#[test]
fn test_key_event_serialization() {
    let mut params = DispatchKeyEventParams::of_type(KeyEventType::KeyDown);
    params.modifiers = Some(8);
    params.key = Some("a".to_string());
    params.code = Some("KeyA".to_string());
    params.windows_virtual_key_code = Some(65);
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json["type"], "keyDown");
    assert_eq!(json["modifiers"], 8);
    assert_eq!(json["windowsVirtualKeyCode"], 65);
    assert!(json.get("text").is_none());
}

#[test]
fn test_char_event_serialization() {
    let mut params = DispatchKeyEventParams::of_type(KeyEventType::Char);
    params.text = Some("👍".to_string());
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json["type"], "char");
    assert_eq!(json["text"], "👍");
}

#[test]
fn test_request_will_be_sent_deserialization() {
    let json = serde_json::json!({
        "requestId": "R1",
        "loaderId": "L1",
        "documentUrl": "http://host/",
        "request": {
            "url": "http://host/page.html",
            "method": "GET",
            "headers": {"Accept": "text/html"}
        },
        "timestamp": 1.0,
        "wallTime": 1.7e9,
        "initiator": {"type": "other"},
        "frameId": "F1",
        "type": "Document"
    });
    let event: RequestWillBeSentEvent = serde_json::from_value(json).unwrap();
    assert_eq!(event.request_id, "R1");
    assert_eq!(event.request.url, "http://host/page.html");
    assert_eq!(event.resource_type.as_deref(), Some("Document"));
}
