use std::time::Duration;

use super::*;

#[tokio::test]
async fn test_ws_url_passthrough() {
    let options = ConnectOptions::default();
    let url = discover_websocket_url("ws://localhost:9222/devtools/browser/abc", &options)
        .await
        .unwrap();
    assert_eq!(url, "ws://localhost:9222/devtools/browser/abc");

    let url = discover_websocket_url("wss://remote:443/devtools/browser/abc", &options)
        .await
        .unwrap();
    assert_eq!(url, "wss://remote:443/devtools/browser/abc");
}

#[tokio::test]
async fn test_invalid_url_rejected() {
    let options = ConnectOptions::default();
    let err = discover_websocket_url("not a url", &options).await.unwrap_err();
    assert!(matches!(err, CdpError::InvalidEndpointUrl(_)));
}

#[tokio::test]
async fn test_unsupported_scheme_rejected() {
    let options = ConnectOptions::default();
    let err = discover_websocket_url("ftp://localhost:9222", &options)
        .await
        .unwrap_err();
    assert!(matches!(err, CdpError::InvalidEndpointUrl(_)));
}

#[test]
fn test_connect_options_builder() {
    let options = ConnectOptions::new()
        .timeout(Duration::from_secs(5))
        .header("Host", "localhost");
    assert_eq!(options.timeout, Some(Duration::from_secs(5)));
    assert_eq!(options.headers.get("Host").map(String::as_str), Some("localhost"));
}

#[test]
fn test_browser_version_deserialization() {
    let json = r#"{
        "Browser": "Chrome/131.0.6778.85",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/abc"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(
        version.web_socket_debugger_url.as_deref(),
        Some("ws://localhost:9222/devtools/browser/abc")
    );
}

#[test]
fn test_target_info_deserialization() {
    let json = r#"[{
        "id": "T1",
        "type": "page",
        "title": "Example Domain",
        "url": "https://example.com/",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/T1"
    }, {
        "id": "T2",
        "type": "service_worker",
        "title": "sw",
        "url": "https://example.com/sw.js"
    }]"#;
    let targets: Vec<TargetInfo> = serde_json::from_str(json).unwrap();
    assert_eq!(targets.len(), 2);
    assert!(targets[0].is_page());
    assert!(!targets[1].is_page());
    assert!(targets[1].web_socket_debugger_url.is_none());
}
