//! Key events produced by the virtual numpad.

use serde::{Deserialize, Serialize};

use crate::keymap::numpad::NumpadKey;

/// Whether a key went down or came back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAction {
    Press,
    Release,
}

/// A single key transition on the numpad.
///
/// Key events are plain values: they carry no identity beyond their content,
/// and are never retried or buffered once handed to a sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: NumpadKey,
    pub action: KeyAction,
}

impl KeyEvent {
    /// Creates a key-down event for `key`.
    pub fn press(key: NumpadKey) -> Self {
        Self {
            key,
            action: KeyAction::Press,
        }
    }

    /// Creates a key-up event for `key`.
    pub fn release(key: NumpadKey) -> Self {
        Self {
            key,
            action: KeyAction::Release,
        }
    }

    /// Returns the press/release pair produced by a single tap on `key`.
    pub fn tap(key: NumpadKey) -> [KeyEvent; 2] {
        [Self::press(key), Self::release(key)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_is_press_then_release() {
        // Act
        let [down, up] = KeyEvent::tap(NumpadKey::Digit5);

        // Assert
        assert_eq!(down.action, KeyAction::Press);
        assert_eq!(up.action, KeyAction::Release);
        assert_eq!(down.key, up.key);
    }
}
