use tabpilot_cdp::protocol::input::{modifiers, DispatchKeyEventParams, KeyEventType};

use super::*;
use crate::error::InputError;

fn compile_chord(key: impl Into<KeyInput>, mask: i32) -> Vec<DispatchKeyEventParams> {
    KeyEvents::new(key, mask)
        .unwrap()
        .to_cdp_events(KeyPressKind::DownAndUp)
        .unwrap()
}

fn kinds(events: &[DispatchKeyEventParams]) -> Vec<KeyEventType> {
    events.iter().map(|e| e.event_type).collect()
}

#[test]
fn test_plain_letter_is_two_events() {
    let events = compile_chord('a', modifiers::NONE);
    assert_eq!(kinds(&events), vec![KeyEventType::KeyDown, KeyEventType::KeyUp]);
    for event in &events {
        assert_eq!(event.modifiers, Some(0));
        assert_eq!(event.key.as_deref(), Some("a"));
        assert_eq!(event.code.as_deref(), Some("KeyA"));
        assert_eq!(event.windows_virtual_key_code, Some(65));
        assert_eq!(event.native_virtual_key_code, Some(65));
    }
}

#[test]
fn test_chord_event_count_matches_modifier_popcount() {
    let masks = [
        modifiers::NONE,
        modifiers::ALT,
        modifiers::CTRL,
        modifiers::META,
        modifiers::SHIFT,
        modifiers::ALT | modifiers::CTRL,
        modifiers::CTRL | modifiers::META,
        modifiers::ALT | modifiers::CTRL | modifiers::META,
        modifiers::ALT | modifiers::CTRL | modifiers::META | modifiers::SHIFT,
    ];
    // Keys with no implied Shift accept any mask.
    for key in ['a', 'z', '5', ';', '['] {
        for mask in masks {
            let events = compile_chord(key, mask);
            let popcount = mask.count_ones() as usize;
            assert_eq!(events.len(), 2 * popcount + 2, "key {key:?} mask {mask}");
        }
    }
}

#[test]
fn test_chord_mask_accumulates_and_releases_in_order() {
    let mask = modifiers::ALT | modifiers::CTRL | modifiers::META | modifiers::SHIFT;
    let events = compile_chord('x', mask);
    assert_eq!(events.len(), 10);

    // Downs: Alt, Ctrl, Meta, Shift accumulate; then the main key under
    // the full mask.
    let down_keys: Vec<&str> = events[..5].iter().map(|e| e.key.as_deref().unwrap()).collect();
    assert_eq!(down_keys, vec!["Alt", "Control", "Meta", "Shift", "x"]);
    let down_masks: Vec<i32> = events[..5].iter().map(|e| e.modifiers.unwrap()).collect();
    assert_eq!(down_masks, vec![1, 3, 7, 15, 15]);

    // Ups: same modifier order, each removing its bit; main key last.
    let up_keys: Vec<&str> = events[5..].iter().map(|e| e.key.as_deref().unwrap()).collect();
    assert_eq!(up_keys, vec!["Alt", "Control", "Meta", "Shift", "x"]);
    let up_masks: Vec<i32> = events[5..].iter().map(|e| e.modifiers.unwrap()).collect();
    assert_eq!(up_masks, vec![14, 12, 8, 0, 0]);
}

#[test]
fn test_uppercase_letter_equals_lowercase_with_shift() {
    let from_upper = compile_chord('A', modifiers::NONE);
    let from_shift = compile_chord('a', modifiers::SHIFT);
    assert_eq!(from_upper, from_shift);

    assert_eq!(from_upper.len(), 4);
    assert_eq!(from_upper[0].key.as_deref(), Some("Shift"));
    assert_eq!(from_upper[0].code.as_deref(), Some("ShiftLeft"));
    assert_eq!(from_upper[0].modifiers, Some(8));
    // The main key displays its shifted form while Shift is held.
    assert_eq!(from_upper[1].key.as_deref(), Some("A"));
    assert_eq!(from_upper[1].code.as_deref(), Some("KeyA"));
    assert_eq!(from_upper[1].modifiers, Some(8));
    assert_eq!(from_upper[2].key.as_deref(), Some("Shift"));
    assert_eq!(from_upper[2].modifiers, Some(0));
    assert_eq!(from_upper[3].key.as_deref(), Some("a"));
    assert_eq!(from_upper[3].modifiers, Some(0));
}

#[test]
fn test_shifted_punctuation_rewrites_to_unshifted_key() {
    let events = compile_chord('?', modifiers::NONE);
    assert_eq!(events.len(), 4);
    assert_eq!(events[1].key.as_deref(), Some("?"));
    assert_eq!(events[1].code.as_deref(), Some("Slash"));
    assert_eq!(events[1].windows_virtual_key_code, Some(191));
    assert_eq!(events[1].modifiers, Some(8));
}

#[test]
fn test_shifted_digit_rewrites_to_digit_key() {
    let events = compile_chord('@', modifiers::NONE);
    assert_eq!(events.len(), 4);
    assert_eq!(events[1].key.as_deref(), Some("@"));
    assert_eq!(events[1].code.as_deref(), Some("Digit2"));
    assert_eq!(events[1].windows_virtual_key_code, Some(50));
}

#[test]
fn test_shifted_key_rejects_extra_modifiers() {
    let err = KeyEvents::new('A', modifiers::CTRL)
        .unwrap()
        .to_cdp_events(KeyPressKind::DownAndUp)
        .unwrap_err();
    assert!(matches!(err, InputError::InvalidKey(_)));

    let err = KeyEvents::new('!', modifiers::ALT)
        .unwrap()
        .to_cdp_events(KeyPressKind::DownAndUp)
        .unwrap_err();
    assert!(matches!(err, InputError::InvalidKey(_)));
}

#[test]
fn test_unknown_modifier_mask_is_rejected() {
    let err = KeyEvents::new('a', 16)
        .unwrap()
        .to_cdp_events(KeyPressKind::DownAndUp)
        .unwrap_err();
    assert!(matches!(err, InputError::InvalidKey(_)));
}

#[test]
fn test_multi_grapheme_string_is_not_a_key() {
    let err = KeyEvents::new("Hi", modifiers::NONE).unwrap_err();
    assert!(matches!(err, InputError::InvalidKey(_)));
}

#[test]
fn test_bare_emission_modes_are_not_implemented() {
    for kind in [
        KeyPressKind::KeyDown,
        KeyPressKind::KeyUp,
        KeyPressKind::RawKeyDown,
    ] {
        let err = KeyEvents::new('a', modifiers::NONE)
            .unwrap()
            .to_cdp_events(kind)
            .unwrap_err();
        assert!(matches!(err, InputError::Unsupported(_)));
    }
}

#[test]
fn test_char_for_non_textual_special_key_is_rejected() {
    let err = KeyEvents::new(SpecialKey::ArrowUp, modifiers::NONE)
        .unwrap()
        .to_cdp_events(KeyPressKind::Char)
        .unwrap_err();
    assert!(matches!(err, InputError::InvalidKey(_)));
}

#[test]
fn test_char_for_textual_keys() {
    let events = KeyEvents::new('a', modifiers::NONE)
        .unwrap()
        .to_cdp_events(KeyPressKind::Char)
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, KeyEventType::Char);
    assert_eq!(events[0].text.as_deref(), Some("a"));

    let events = KeyEvents::new(SpecialKey::Enter, modifiers::NONE)
        .unwrap()
        .to_cdp_events(KeyPressKind::Char)
        .unwrap();
    assert_eq!(events[0].text.as_deref(), Some("\n"));
}

#[test]
fn test_modifier_as_main_key_is_not_emitted_twice() {
    let events = compile_chord(SpecialKey::Shift, modifiers::SHIFT);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type, KeyEventType::KeyDown);
    assert_eq!(events[0].key.as_deref(), Some("Shift"));
    assert_eq!(events[0].modifiers, Some(8));
    assert_eq!(events[1].event_type, KeyEventType::KeyUp);
    assert_eq!(events[1].modifiers, Some(0));
}

#[test]
fn test_emoji_becomes_single_char_event() {
    for emoji in ["👍", "👍🏽", "👨‍👩‍👧‍👦", "é"] {
        let events = KeyEvents::from_text(emoji, KeyPressKind::DownAndUp).unwrap();
        assert_eq!(events.len(), 1, "grapheme {emoji:?}");
        assert_eq!(events[0].event_type, KeyEventType::Char);
        assert_eq!(events[0].text.as_deref(), Some(emoji));
        assert!(events[0].code.is_none());
        assert!(events[0].windows_virtual_key_code.is_none());
    }
}

#[test]
fn test_from_text_maps_whitespace_to_named_keys() {
    let events = KeyEvents::from_text("a\tb\nc d", KeyPressKind::DownAndUp).unwrap();
    let codes: Vec<&str> = events
        .iter()
        .filter(|e| e.event_type == KeyEventType::KeyDown)
        .map(|e| e.code.as_deref().unwrap())
        .collect();
    assert_eq!(codes, vec!["KeyA", "Tab", "KeyB", "Enter", "KeyC", "Space", "KeyD"]);
}

#[test]
fn test_mixed_input_sequence() {
    let events = KeyEvents::from_mixed_input(
        vec![
            InputItem::from("Hi"),
            InputItem::from(SpecialKey::Enter),
            InputItem::from(('a', modifiers::CTRL)),
            InputItem::from("👍"),
        ],
        KeyPressKind::DownAndUp,
    )
    .unwrap();

    let summary: Vec<(KeyEventType, Option<&str>, Option<i32>)> = events
        .iter()
        .map(|e| (e.event_type, e.key.as_deref(), e.modifiers))
        .collect();
    assert_eq!(
        summary,
        vec![
            // "H" expands to Shift + h.
            (KeyEventType::KeyDown, Some("Shift"), Some(8)),
            (KeyEventType::KeyDown, Some("H"), Some(8)),
            (KeyEventType::KeyUp, Some("Shift"), Some(0)),
            (KeyEventType::KeyUp, Some("h"), Some(0)),
            // "i".
            (KeyEventType::KeyDown, Some("i"), Some(0)),
            (KeyEventType::KeyUp, Some("i"), Some(0)),
            // Enter.
            (KeyEventType::KeyDown, Some("Enter"), Some(0)),
            (KeyEventType::KeyUp, Some("Enter"), Some(0)),
            // Ctrl+a.
            (KeyEventType::KeyDown, Some("Control"), Some(2)),
            (KeyEventType::KeyDown, Some("a"), Some(2)),
            (KeyEventType::KeyUp, Some("Control"), Some(0)),
            (KeyEventType::KeyUp, Some("a"), Some(0)),
            // Emoji.
            (KeyEventType::Char, None, Some(0)),
        ]
    );
    assert_eq!(events.last().unwrap().text.as_deref(), Some("👍"));
}

#[test]
fn test_enter_key_payload_shape() {
    let events = compile_chord(SpecialKey::Enter, modifiers::NONE);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].key.as_deref(), Some("Enter"));
    assert_eq!(events[0].code.as_deref(), Some("Enter"));
    assert_eq!(events[0].text.as_deref(), Some("\r"));
    assert_eq!(events[0].windows_virtual_key_code, Some(13));
}

#[test]
fn test_arrow_key_payload_has_no_text() {
    let events = compile_chord(SpecialKey::ArrowUp, modifiers::NONE);
    assert_eq!(events[0].key.as_deref(), Some("ArrowUp"));
    assert_eq!(events[0].code.as_deref(), Some("ArrowUp"));
    assert_eq!(events[0].windows_virtual_key_code, Some(38));
    assert!(events[0].text.is_none());
}

#[test]
fn test_special_key_definitions() {
    assert_eq!(SpecialKey::Backspace.definition().key_code, 8);
    assert_eq!(SpecialKey::Escape.definition().key_code, 27);
    assert_eq!(SpecialKey::Delete.definition().key_code, 46);
    assert_eq!(SpecialKey::ArrowLeft.definition().key_code, 37);
    assert_eq!(SpecialKey::ArrowRight.definition().key_code, 39);
    assert_eq!(SpecialKey::ArrowDown.definition().key_code, 40);
    assert_eq!(SpecialKey::Control.definition().code, "ControlLeft");
    assert_eq!(SpecialKey::Meta.definition().key_code, 91);
    assert!(SpecialKey::Shift.is_modifier());
    assert!(!SpecialKey::Enter.is_modifier());
}
