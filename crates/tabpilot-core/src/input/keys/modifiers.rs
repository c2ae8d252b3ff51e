//! Modifier key definitions.
//!
//! The left-hand variant of each modifier is synthesized.

use super::definition::KeyDefinition;

/// Alt key.
pub(super) const ALT: KeyDefinition = KeyDefinition {
    code: "AltLeft",
    key: "Alt",
    key_code: 18,
    text: None,
};

/// Control key.
pub(super) const CONTROL: KeyDefinition = KeyDefinition {
    code: "ControlLeft",
    key: "Control",
    key_code: 17,
    text: None,
};

/// Meta / Command key.
pub(super) const META: KeyDefinition = KeyDefinition {
    code: "MetaLeft",
    key: "Meta",
    key_code: 91,
    text: None,
};

/// Shift key.
pub(super) const SHIFT: KeyDefinition = KeyDefinition {
    code: "ShiftLeft",
    key: "Shift",
    key_code: 16,
    text: None,
};
