//! Plain-text codec for key events.
//!
//! Wire format:
//! ```text
//! [action:1][name:N]
//! ```
//! `action` is `+` for a key press and `-` for a key release; `name` is the
//! key's wire name (see [`NumpadKey::wire_name`]).  Nothing else is written:
//! there is no terminator and no acknowledgement.  Each encoded event is
//! handed to the transport as one write.
//!
//! | Event               | Wire string  |
//! |---------------------|--------------|
//! | press 7             | `+7`         |
//! | release 7           | `-7`         |
//! | press Enter         | `+enter`     |
//! | release Num Lock    | `-num_lock`  |

use thiserror::Error;

use crate::domain::key_event::{KeyAction, KeyEvent};
use crate::keymap::numpad::NumpadKey;

/// Marker prefixed to a key press.
pub const PRESS_MARKER: char = '+';

/// Marker prefixed to a key release.
pub const RELEASE_MARKER: char = '-';

/// Errors that can occur while decoding a wire string.
#[derive(Debug, Error, PartialEq)]
pub enum WireError {
    /// The input was empty.
    #[error("empty key event string")]
    Empty,

    /// The first character was neither `+` nor `-`.
    #[error("unknown action marker {0:?}")]
    UnknownAction(char),

    /// The key name is not on the numpad.
    #[error("unknown key name {0:?}")]
    UnknownKey(String),
}

/// Encodes a [`KeyEvent`] into its wire string.
///
/// # Examples
///
/// ```rust
/// use numpad_core::{encode_key_event, KeyEvent, NumpadKey};
///
/// assert_eq!(encode_key_event(&KeyEvent::press(NumpadKey::Digit7)), "+7");
/// assert_eq!(encode_key_event(&KeyEvent::release(NumpadKey::Enter)), "-enter");
/// ```
pub fn encode_key_event(event: &KeyEvent) -> String {
    let marker = match event.action {
        KeyAction::Press => PRESS_MARKER,
        KeyAction::Release => RELEASE_MARKER,
    };
    let name = event.key.wire_name();

    let mut out = String::with_capacity(1 + name.len());
    out.push(marker);
    out.push_str(name);
    out
}

/// Decodes a single wire string back into a [`KeyEvent`].
///
/// # Errors
///
/// Returns [`WireError`] if the string is empty, has an unknown action
/// marker, or names a key that is not on the numpad.
pub fn decode_key_event(input: &str) -> Result<KeyEvent, WireError> {
    let mut chars = input.chars();
    let action = match chars.next() {
        None => return Err(WireError::Empty),
        Some(PRESS_MARKER) => KeyAction::Press,
        Some(RELEASE_MARKER) => KeyAction::Release,
        Some(other) => return Err(WireError::UnknownAction(other)),
    };

    let name = chars.as_str();
    let key =
        NumpadKey::from_wire_name(name).ok_or_else(|| WireError::UnknownKey(name.to_string()))?;

    Ok(KeyEvent { key, action })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
