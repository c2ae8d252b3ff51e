//! Input domain types.
//!
//! Synthetic keyboard events. The Input domain has no events of its own;
//! it is command-only.

use serde::{Deserialize, Serialize};

/// Modifier bit masks for key and mouse events.
pub mod modifiers {
    /// No modifier.
    pub const NONE: i32 = 0;
    /// Alt key.
    pub const ALT: i32 = 1;
    /// Control key.
    pub const CTRL: i32 = 2;
    /// Meta / Command key.
    pub const META: i32 = 4;
    /// Shift key.
    pub const SHIFT: i32 = 8;
}

/// Type of a dispatched key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyEventType {
    /// Key pressed down.
    KeyDown,
    /// Key released.
    KeyUp,
    /// Key pressed down without text produced.
    RawKeyDown,
    /// Character generated by the key press.
    Char,
}

/// Parameters for Input.dispatchKeyEvent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchKeyEventParams {
    /// Type of the key event.
    #[serde(rename = "type")]
    pub event_type: KeyEventType,

    /// Bit field of pressed modifier keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<i32>,

    /// Text as generated by processing a virtual key code with a keyboard
    /// layout. Required for `Char`, otherwise optional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Text that would have been generated by the keyboard if no
    /// modifiers were pressed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmodified_text: Option<String>,

    /// DOM key value (e.g. "a", "Enter").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// DOM code value (e.g. "KeyA", "Enter").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Windows virtual key code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_virtual_key_code: Option<i32>,

    /// Native virtual key code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_virtual_key_code: Option<i32>,

    /// Whether the event was generated from auto repeat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_repeat: Option<bool>,

    /// Whether the event was generated from the keypad.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_keypad: Option<bool>,
}

impl DispatchKeyEventParams {
    /// A bare event of the given type with no key data attached.
    pub fn of_type(event_type: KeyEventType) -> Self {
        Self {
            event_type,
            modifiers: None,
            text: None,
            unmodified_text: None,
            key: None,
            code: None,
            windows_virtual_key_code: None,
            native_virtual_key_code: None,
            auto_repeat: None,
            is_keypad: None,
        }
    }
}

/// Parameters for Input.insertText.
#[derive(Debug, Clone, Serialize)]
pub struct InsertTextParams {
    /// The text to insert.
    pub text: String,
}
