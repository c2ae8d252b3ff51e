use super::*;

#[test]
fn test_expand_full_event_name() {
    let expanded = CdpConnection::expand_event_name("Network.requestWillBeSent");
    assert_eq!(expanded, vec!["Network.requestWillBeSent".to_string()]);
}

#[test]
fn test_expand_domain_marker() {
    let expanded = CdpConnection::expand_event_name("Network");
    assert_eq!(expanded.len(), protocol::network::EVENTS.len());
    assert!(expanded.contains(&"Network.loadingFinished".to_string()));
}

#[test]
fn test_expand_unknown_domain() {
    assert!(CdpConnection::expand_event_name("NoSuchDomain").is_empty());
}

#[test]
fn test_handler_id_equality() {
    assert_eq!(HandlerId(3), HandlerId(3));
    assert_ne!(HandlerId(3), HandlerId(4));
}
