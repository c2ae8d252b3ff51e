use std::time::Duration;

use super::*;

#[test]
fn test_input_error_display() {
    let err = InputError::InvalidKey("'Hi' is not a single key".to_string());
    assert_eq!(err.to_string(), "invalid key input: 'Hi' is not a single key");

    let err = InputError::Unsupported("bare keyDown".to_string());
    assert_eq!(err.to_string(), "unsupported key emission: bare keyDown");
}

#[test]
fn test_expect_error_display() {
    assert_eq!(
        ExpectError::Timeout(Duration::from_secs(5)).to_string(),
        "expectation timed out after 5s"
    );
    assert_eq!(ExpectError::SessionClosed.to_string(), "CDP session closed");
}

#[test]
fn test_expect_error_from_cdp() {
    let err: ExpectError = CdpError::ConnectionClosed.into();
    assert!(matches!(err, ExpectError::SessionClosed));

    let err: ExpectError = CdpError::Timeout(Duration::from_secs(1)).into();
    assert!(matches!(err, ExpectError::Timeout(_)));

    let err: ExpectError = CdpError::Protocol {
        code: -32000,
        message: "boom".to_string(),
    }
    .into();
    assert!(matches!(err, ExpectError::Command(_)));
}

#[test]
fn test_tab_error_is_transparent_for_cdp() {
    let err = TabError::from(CdpError::ConnectionClosed);
    assert_eq!(err.to_string(), "CDP session closed");
}
