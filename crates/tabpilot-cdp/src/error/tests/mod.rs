use std::time::Duration;

use super::*;

#[test]
fn test_connection_failed_display() {
    let err = CdpError::ConnectionFailed("connection refused".to_string());
    assert_eq!(
        err.to_string(),
        "WebSocket connection failed: connection refused"
    );
}

#[test]
fn test_connection_closed_display() {
    let err = CdpError::ConnectionClosed;
    assert_eq!(err.to_string(), "CDP session closed");
}

#[test]
fn test_send_failed_display() {
    let err = CdpError::SendFailed("channel closed".to_string());
    assert_eq!(err.to_string(), "failed to send CDP message: channel closed");
}

#[test]
fn test_protocol_error_display() {
    let err = CdpError::Protocol {
        code: -32601,
        message: "Method not found".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "CDP protocol error -32601: Method not found"
    );
}

#[test]
fn test_timeout_display() {
    let err = CdpError::Timeout(Duration::from_secs(30));
    assert_eq!(err.to_string(), "response timeout after 30s");
}

#[test]
fn test_invalid_argument_display() {
    let err = CdpError::InvalidArgument("handler requires an event type".to_string());
    assert_eq!(
        err.to_string(),
        "invalid argument: handler requires an event type"
    );
}

#[test]
fn test_json_error_from_serde() {
    let json_err: serde_json::Error = serde_json::from_str::<i32>("not a number").unwrap_err();
    let err: CdpError = json_err.into();
    assert!(err.to_string().starts_with("JSON error:"));
}

#[test]
fn test_discovery_failed_display() {
    let err = CdpError::EndpointDiscoveryFailed {
        url: "http://localhost:9222".to_string(),
        reason: "HTTP status 500".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "endpoint discovery failed for http://localhost:9222: HTTP status 500"
    );
}
