//! Digit key definitions.

use super::definition::KeyDefinition;

const DIGIT_KEYS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

const DIGIT_CODES: [&str; 10] = [
    "Digit0", "Digit1", "Digit2", "Digit3", "Digit4", "Digit5", "Digit6", "Digit7", "Digit8",
    "Digit9",
];

/// The shifted character produced by each digit key, indexed by digit.
pub(super) const DIGIT_SHIFT_ROW: &str = ")!@#$%^&*(";

/// Get the key definition for a decimal digit.
///
/// The key code is the ASCII value of the digit.
pub(super) fn get_digit_key(ch: char) -> Option<KeyDefinition> {
    if !ch.is_ascii_digit() {
        return None;
    }
    let index = (ch as u8 - b'0') as usize;
    Some(KeyDefinition {
        code: DIGIT_CODES[index],
        key: DIGIT_KEYS[index],
        key_code: i32::from(ch as u8),
        text: Some(DIGIT_KEYS[index]),
    })
}

/// Map a shifted digit character (e.g. '!') back to its digit.
pub(super) fn unshift_digit(ch: char) -> Option<char> {
    DIGIT_SHIFT_ROW
        .find(ch)
        .map(|index| char::from(b'0' + index as u8))
}

/// Map a digit to the character its key produces under Shift.
pub(super) fn shift_digit(ch: char) -> Option<char> {
    ch.to_digit(10)
        .and_then(|d| DIGIT_SHIFT_ROW.chars().nth(d as usize))
}
