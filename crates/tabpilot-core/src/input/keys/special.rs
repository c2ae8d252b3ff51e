//! Special key definitions.

use super::definition::KeyDefinition;
use super::{modifiers, SpecialKey};

/// Get the key definition for a special key.
pub(super) fn get_special_key(key: SpecialKey) -> KeyDefinition {
    match key {
        SpecialKey::Space => KeyDefinition {
            code: "Space",
            key: " ",
            key_code: 32,
            text: Some(" "),
        },
        SpecialKey::Enter => KeyDefinition {
            code: "Enter",
            key: "Enter",
            key_code: 13,
            text: Some("\r"),
        },
        SpecialKey::Tab => KeyDefinition {
            code: "Tab",
            key: "Tab",
            key_code: 9,
            text: Some("\t"),
        },
        SpecialKey::Backspace => KeyDefinition {
            code: "Backspace",
            key: "Backspace",
            key_code: 8,
            text: None,
        },
        SpecialKey::Escape => KeyDefinition {
            code: "Escape",
            key: "Escape",
            key_code: 27,
            text: None,
        },
        SpecialKey::Delete => KeyDefinition {
            code: "Delete",
            key: "Delete",
            key_code: 46,
            text: None,
        },
        SpecialKey::ArrowLeft => KeyDefinition {
            code: "ArrowLeft",
            key: "ArrowLeft",
            key_code: 37,
            text: None,
        },
        SpecialKey::ArrowUp => KeyDefinition {
            code: "ArrowUp",
            key: "ArrowUp",
            key_code: 38,
            text: None,
        },
        SpecialKey::ArrowRight => KeyDefinition {
            code: "ArrowRight",
            key: "ArrowRight",
            key_code: 39,
            text: None,
        },
        SpecialKey::ArrowDown => KeyDefinition {
            code: "ArrowDown",
            key: "ArrowDown",
            key_code: 40,
            text: None,
        },
        SpecialKey::Alt => modifiers::ALT,
        SpecialKey::Control => modifiers::CONTROL,
        SpecialKey::Meta => modifiers::META,
        SpecialKey::Shift => modifiers::SHIFT,
    }
}
