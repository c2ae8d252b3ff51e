//! Key definition struct.

/// Static properties of one physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDefinition {
    /// DOM code value (e.g. "KeyA", "Enter").
    pub code: &'static str,
    /// DOM key value (e.g. "a", "Enter").
    pub key: &'static str,
    /// Windows virtual key code.
    pub key_code: i32,
    /// Text produced by pressing the key without modifiers, if any.
    pub text: Option<&'static str>,
}
