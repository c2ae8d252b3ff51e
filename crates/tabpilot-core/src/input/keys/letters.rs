//! Letter key definitions.

use super::definition::KeyDefinition;

const LETTER_KEYS: [&str; 26] = [
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s",
    "t", "u", "v", "w", "x", "y", "z",
];

const LETTER_CODES: [&str; 26] = [
    "KeyA", "KeyB", "KeyC", "KeyD", "KeyE", "KeyF", "KeyG", "KeyH", "KeyI", "KeyJ", "KeyK",
    "KeyL", "KeyM", "KeyN", "KeyO", "KeyP", "KeyQ", "KeyR", "KeyS", "KeyT", "KeyU", "KeyV",
    "KeyW", "KeyX", "KeyY", "KeyZ",
];

/// Get the key definition for a lowercase English letter.
///
/// The key code is the ASCII value of the uppercase letter.
pub(super) fn get_letter_key(ch: char) -> Option<KeyDefinition> {
    if !ch.is_ascii_lowercase() {
        return None;
    }
    let index = (ch as u8 - b'a') as usize;
    Some(KeyDefinition {
        code: LETTER_CODES[index],
        key: LETTER_KEYS[index],
        key_code: i32::from(ch.to_ascii_uppercase() as u8),
        text: Some(LETTER_KEYS[index]),
    })
}
