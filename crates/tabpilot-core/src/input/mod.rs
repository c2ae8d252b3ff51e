//! Key-event compiler.
//!
//! Translates human-level input (plain text, named keys, modifier
//! chords) into the ordered sequence of Input.dispatchKeyEvent payloads
//! the wire format expects. Pure; nothing here touches the connection.
//!
//! Text is iterated by grapheme cluster, so emoji and combining
//! sequences travel as a single `char` event carrying the literal
//! grapheme. ASCII characters expand into keyDown/keyUp chords; shifted
//! forms (`A`, `!`, `{`) are rewritten to their unshifted key with the
//! Shift modifier applied.

mod keys;

use tabpilot_cdp::protocol::input::{modifiers, DispatchKeyEventParams, KeyEventType};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::InputError;

pub use keys::{KeyDefinition, SpecialKey};

/// How a key should be emitted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPressKind {
    /// Bare key press. Not vended by the compiler.
    KeyDown,
    /// Bare key release. Not vended by the compiler.
    KeyUp,
    /// Bare raw key press. Not vended by the compiler.
    RawKeyDown,
    /// A single `char` event carrying literal text.
    Char,
    /// The full chord expansion: modifier downs, key down, modifier ups,
    /// key up.
    DownAndUp,
}

/// A single key addressed by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    /// One user-perceived character.
    Grapheme(String),
    /// A named key.
    Special(SpecialKey),
}

impl From<char> for KeyInput {
    fn from(ch: char) -> Self {
        Self::Grapheme(ch.to_string())
    }
}

impl From<&str> for KeyInput {
    fn from(s: &str) -> Self {
        Self::Grapheme(s.to_string())
    }
}

impl From<SpecialKey> for KeyInput {
    fn from(key: SpecialKey) -> Self {
        Self::Special(key)
    }
}

/// One element of a mixed input sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputItem {
    /// Plain text, processed grapheme by grapheme.
    Text(String),
    /// A named key, pressed and released.
    Special(SpecialKey),
    /// A key combined with a modifier bitmask.
    Chord(KeyInput, i32),
}

impl From<&str> for InputItem {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for InputItem {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<SpecialKey> for InputItem {
    fn from(key: SpecialKey) -> Self {
        Self::Special(key)
    }
}

impl From<(char, i32)> for InputItem {
    fn from((ch, modifiers): (char, i32)) -> Self {
        Self::Chord(ch.into(), modifiers)
    }
}

impl From<(SpecialKey, i32)> for InputItem {
    fn from((key, modifiers): (SpecialKey, i32)) -> Self {
        Self::Chord(key.into(), modifiers)
    }
}

/// A single key plus modifiers, compiled on demand into wire payloads.
#[derive(Debug, Clone)]
pub struct KeyEvents {
    key: KeyInput,
    modifiers: i32,
    definition: Option<KeyDefinition>,
}

impl KeyEvents {
    /// Prepare a key for compilation.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is a string of more than one grapheme;
    /// whole strings go through [`from_text`](Self::from_text) or
    /// [`from_mixed_input`](Self::from_mixed_input).
    pub fn new(key: impl Into<KeyInput>, modifiers: i32) -> Result<Self, InputError> {
        let key = key.into();
        let definition = match &key {
            KeyInput::Grapheme(grapheme) => {
                if grapheme.graphemes(true).count() != 1 {
                    return Err(InputError::InvalidKey(format!(
                        "'{grapheme}' is not a single key; use from_text or from_mixed_input \
                         for whole strings"
                    )));
                }
                single_char(grapheme).and_then(keys::grapheme_definition)
            }
            KeyInput::Special(key) => Some(key.definition()),
        };
        Ok(Self {
            key,
            modifiers,
            definition,
        })
    }

    /// Compile this key into its ordered wire payloads.
    ///
    /// A grapheme outside the ASCII key tables is always emitted as a
    /// `char` event, whatever `kind` says.
    ///
    /// # Errors
    ///
    /// Returns an error for bare keyDown/keyUp/rawKeyDown requests, for
    /// a `char` request on a non-textual special key, and for
    /// unsupported key/modifier combinations.
    pub fn to_cdp_events(
        &self,
        kind: KeyPressKind,
    ) -> Result<Vec<DispatchKeyEventParams>, InputError> {
        let kind = match &self.key {
            KeyInput::Grapheme(_) if self.definition.is_none() => KeyPressKind::Char,
            _ => kind,
        };

        match kind {
            KeyPressKind::KeyDown | KeyPressKind::KeyUp | KeyPressKind::RawKeyDown => {
                Err(InputError::Unsupported(
                    "bare keyDown/keyUp/rawKeyDown are not emitted on their own; \
                     use Char or DownAndUp"
                        .to_string(),
                ))
            }
            KeyPressKind::Char => Ok(vec![self.char_event()?]),
            KeyPressKind::DownAndUp => {
                let (normalized, modifiers) = self.normalized()?;
                normalized.down_up_sequence(modifiers)
            }
        }
    }

    /// Compile a text string, grapheme by grapheme.
    ///
    /// Whitespace maps to its named key (`\n`/`\r` to Enter, `\t` to
    /// Tab, space to Space); ASCII characters are emitted as `kind`;
    /// anything else becomes a `char` event.
    ///
    /// # Errors
    ///
    /// Returns an error if `kind` is one of the bare emission modes.
    pub fn from_text(
        text: &str,
        kind: KeyPressKind,
    ) -> Result<Vec<DispatchKeyEventParams>, InputError> {
        let mut payloads = Vec::new();
        for grapheme in text.graphemes(true) {
            let events = match grapheme {
                "\n" | "\r" | "\r\n" => Self::new(SpecialKey::Enter, modifiers::NONE)?,
                "\t" => Self::new(SpecialKey::Tab, modifiers::NONE)?,
                " " => Self::new(SpecialKey::Space, modifiers::NONE)?,
                _ => Self::new(KeyInput::Grapheme(grapheme.to_string()), modifiers::NONE)?,
            };
            payloads.extend(events.to_cdp_events(kind)?);
        }
        Ok(payloads)
    }

    /// Compile a mixed sequence of text, named keys, and chords.
    ///
    /// Text runs are emitted as `kind`; named keys and chords always use
    /// the full down-and-up expansion.
    ///
    /// # Errors
    ///
    /// Propagates any compilation error of the individual items.
    pub fn from_mixed_input<I>(
        items: I,
        kind: KeyPressKind,
    ) -> Result<Vec<DispatchKeyEventParams>, InputError>
    where
        I: IntoIterator<Item = InputItem>,
    {
        let mut payloads = Vec::new();
        for item in items {
            match item {
                InputItem::Text(text) => payloads.extend(Self::from_text(&text, kind)?),
                InputItem::Special(key) => payloads.extend(
                    Self::new(key, modifiers::NONE)?.to_cdp_events(KeyPressKind::DownAndUp)?,
                ),
                InputItem::Chord(key, modifiers) => payloads.extend(
                    Self::new(key, modifiers)?.to_cdp_events(KeyPressKind::DownAndUp)?,
                ),
            }
        }
        Ok(payloads)
    }

    /// Rewrite a shifted form to its unshifted key and fold the implied
    /// Shift into the modifier mask; map whitespace to its named key.
    fn normalized(&self) -> Result<(Self, i32), InputError> {
        let KeyInput::Grapheme(grapheme) = &self.key else {
            // Named keys have no shifted variants.
            return Ok((self.clone(), self.modifiers));
        };
        let Some(ch) = single_char(grapheme) else {
            return Ok((self.clone(), self.modifiers));
        };

        if let Some(unshifted) = keys::unshift(ch) {
            let modifiers = self.modifiers | modifiers::SHIFT;
            if modifiers != modifiers::SHIFT {
                return Err(InputError::InvalidKey(format!(
                    "key '{ch}' implies Shift and cannot combine with modifier mask {}",
                    self.modifiers
                )));
            }
            return Ok((Self::new(unshifted, modifiers)?, modifiers));
        }

        let named = match ch {
            '\n' | '\r' => Some(SpecialKey::Enter),
            '\t' => Some(SpecialKey::Tab),
            ' ' => Some(SpecialKey::Space),
            _ => None,
        };
        match named {
            Some(key) => Ok((Self::new(key, self.modifiers)?, self.modifiers)),
            None => Ok((self.clone(), self.modifiers)),
        }
    }

    /// The chord expansion for one key under an already-normalized
    /// modifier mask.
    ///
    /// Modifier downs come first in fixed Alt, Ctrl, Meta, Shift order,
    /// each payload carrying the mask accumulated so far; then the main
    /// key down under the full mask; then modifier ups in the same
    /// order, each removing its bit; then the main key up under the
    /// emptied mask. A main key that is itself one of the held modifiers
    /// is not emitted twice.
    fn down_up_sequence(&self, modifiers: i32) -> Result<Vec<DispatchKeyEventParams>, InputError> {
        let held = decompose_modifiers(modifiers)?;
        let main_is_held_modifier = held
            .iter()
            .any(|(key, _)| self.key == KeyInput::Special(*key));

        let mut events = Vec::with_capacity(2 * held.len() + 2);
        let mut current = 0;
        for (key, flag) in &held {
            current |= flag;
            events.push(Self::new(*key, current)?.basic_event(KeyEventType::KeyDown, current)?);
        }
        if !main_is_held_modifier {
            events.push(self.basic_event(KeyEventType::KeyDown, current)?);
        }
        for (key, flag) in &held {
            current &= !flag;
            events.push(Self::new(*key, current)?.basic_event(KeyEventType::KeyUp, current)?);
        }
        if !main_is_held_modifier {
            events.push(self.basic_event(KeyEventType::KeyUp, current)?);
        }
        Ok(events)
    }

    /// Build one keyDown/keyUp payload for this key under `mask`.
    fn basic_event(
        &self,
        event_type: KeyEventType,
        mask: i32,
    ) -> Result<DispatchKeyEventParams, InputError> {
        let definition = self.definition.ok_or_else(|| {
            InputError::InvalidKey(format!("{:?} has no key definition", self.key))
        })?;

        let (key, text) = match &self.key {
            KeyInput::Grapheme(grapheme) => {
                let display = Self::display_form(grapheme, mask);
                (display.clone(), Some(display))
            }
            KeyInput::Special(_) => (
                definition.key.to_string(),
                definition.text.map(str::to_string),
            ),
        };

        let mut params = DispatchKeyEventParams::of_type(event_type);
        params.modifiers = Some(mask);
        params.text = text.clone();
        params.unmodified_text = text;
        params.key = Some(key);
        params.code = Some(definition.code.to_string());
        params.windows_virtual_key_code = Some(definition.key_code);
        params.native_virtual_key_code = Some(definition.key_code);
        Ok(params)
    }

    /// The character a grapheme key displays under `mask`: its shifted
    /// form when Shift is the only held modifier, itself otherwise.
    fn display_form(grapheme: &str, mask: i32) -> String {
        if mask == modifiers::SHIFT {
            if let Some(shifted) = single_char(grapheme).and_then(keys::shift) {
                return shifted.to_string();
            }
        }
        grapheme.to_string()
    }

    /// Build the `char` payload for this key.
    fn char_event(&self) -> Result<DispatchKeyEventParams, InputError> {
        let text = match &self.key {
            KeyInput::Grapheme(grapheme) => grapheme.clone(),
            KeyInput::Special(key) => key
                .char_text()
                .ok_or_else(|| {
                    InputError::InvalidKey(format!(
                        "{key:?} produces no text and cannot be sent as a char event"
                    ))
                })?
                .to_string(),
        };

        let mut params = DispatchKeyEventParams::of_type(KeyEventType::Char);
        params.modifiers = Some(self.modifiers);
        params.text = Some(text.clone());
        params.unmodified_text = Some(text);
        Ok(params)
    }
}

/// The sole char of a one-char grapheme, `None` for multi-codepoint
/// clusters.
fn single_char(grapheme: &str) -> Option<char> {
    let mut chars = grapheme.chars();
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}

/// Split a modifier mask into held keys, in fixed Alt, Ctrl, Meta,
/// Shift order.
fn decompose_modifiers(mask: i32) -> Result<Vec<(SpecialKey, i32)>, InputError> {
    if mask == modifiers::NONE {
        return Ok(Vec::new());
    }
    let held: Vec<(SpecialKey, i32)> = [
        (SpecialKey::Alt, modifiers::ALT),
        (SpecialKey::Control, modifiers::CTRL),
        (SpecialKey::Meta, modifiers::META),
        (SpecialKey::Shift, modifiers::SHIFT),
    ]
    .into_iter()
    .filter(|(_, flag)| mask & flag != 0)
    .collect();

    if held.is_empty() {
        return Err(InputError::InvalidKey(format!(
            "modifier mask {mask} names no known modifier"
        )));
    }
    Ok(held)
}

#[cfg(test)]
mod tests;
