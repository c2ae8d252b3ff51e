use super::*;

#[test]
fn test_overrides_default_to_empty() {
    let overrides = ContinueRequestOverrides::default();
    assert!(overrides.url.is_none());
    assert!(overrides.method.is_none());
    assert!(overrides.headers.is_none());

    let overrides = FulfillRequestOverrides::default();
    assert!(overrides.body.is_none());
    assert!(overrides.response_phrase.is_none());

    let overrides = ContinueResponseOverrides::default();
    assert!(overrides.response_code.is_none());
}

#[test]
fn test_decode_paused_event() {
    let event = tabpilot_cdp::CdpEvent {
        method: "Fetch.requestPaused".to_string(),
        params: Some(serde_json::json!({
            "requestId": "interception-1",
            "request": {
                "url": "http://host/x.json",
                "method": "GET",
                "headers": {}
            },
            "frameId": "F1",
            "resourceType": "XHR",
            "responseStatusCode": 200
        })),
    };
    let paused = decode_paused(event).unwrap();
    assert_eq!(paused.request_id, "interception-1");
    assert!(paused.is_response_stage());
}

#[test]
fn test_decode_paused_failure() {
    let event = tabpilot_cdp::CdpEvent {
        method: "Fetch.requestPaused".to_string(),
        params: None,
    };
    let err = decode_paused(event).unwrap_err();
    assert!(matches!(err, crate::error::ExpectError::Command(_)));
}
