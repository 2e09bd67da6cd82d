//! The keys of the virtual numpad.
//!
//! # HID usage IDs
//!
//! | Key        | HID Usage ID | Wire name  | Face |
//! |------------|--------------|------------|------|
//! | Num Lock   | 0x53         | `num_lock` | Num  |
//! | Divide     | 0x54         | `divide`   | /    |
//! | Multiply   | 0x55         | `multiply` | *    |
//! | Subtract   | 0x56         | `subtract` | -    |
//! | Add        | 0x57         | `add`      | +    |
//! | Enter      | 0x58         | `enter`    | ⏎    |
//! | 1 … 9      | 0x59 … 0x61  | `1` … `9`  | 1…9  |
//! | 0          | 0x62         | `0`        | 0    |
//! | Decimal    | 0x63         | `decimal`  | .    |
//! | Backspace  | 0x2A         | `backspace`| ⌫    |
//!
//! Backspace is not a keypad key on a physical keyboard; the virtual numpad
//! can show it in place of Num Lock.

use serde::{Deserialize, Serialize};

/// A key on the virtual numpad.
///
/// The numeric value of each variant is its HID Usage ID on the keyboard/keypad page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum NumpadKey {
    NumLock = 0x53,
    Divide = 0x54,
    Multiply = 0x55,
    Subtract = 0x56,
    Add = 0x57,
    Enter = 0x58,
    Digit1 = 0x59,
    Digit2 = 0x5A,
    Digit3 = 0x5B,
    Digit4 = 0x5C,
    Digit5 = 0x5D,
    Digit6 = 0x5E,
    Digit7 = 0x5F,
    Digit8 = 0x60,
    Digit9 = 0x61,
    Digit0 = 0x62,
    Decimal = 0x63,
    Backspace = 0x2A,
}

impl NumpadKey {
    /// Every key of the numpad, in HID order with Backspace last.
    pub const ALL: [NumpadKey; 18] = [
        NumpadKey::NumLock,
        NumpadKey::Divide,
        NumpadKey::Multiply,
        NumpadKey::Subtract,
        NumpadKey::Add,
        NumpadKey::Enter,
        NumpadKey::Digit1,
        NumpadKey::Digit2,
        NumpadKey::Digit3,
        NumpadKey::Digit4,
        NumpadKey::Digit5,
        NumpadKey::Digit6,
        NumpadKey::Digit7,
        NumpadKey::Digit8,
        NumpadKey::Digit9,
        NumpadKey::Digit0,
        NumpadKey::Decimal,
        NumpadKey::Backspace,
    ];

    /// Returns the HID Usage ID of this key.
    pub fn hid_usage(self) -> u16 {
        self as u16
    }

    /// Converts a raw HID Usage ID to a numpad key.
    ///
    /// Returns `None` for usages that are not on the virtual numpad.
    pub fn from_hid_usage(usage: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.hid_usage() == usage)
    }

    /// Returns the name used for this key in the wire protocol.
    pub fn wire_name(self) -> &'static str {
        match self {
            NumpadKey::NumLock => "num_lock",
            NumpadKey::Divide => "divide",
            NumpadKey::Multiply => "multiply",
            NumpadKey::Subtract => "subtract",
            NumpadKey::Add => "add",
            NumpadKey::Enter => "enter",
            NumpadKey::Digit1 => "1",
            NumpadKey::Digit2 => "2",
            NumpadKey::Digit3 => "3",
            NumpadKey::Digit4 => "4",
            NumpadKey::Digit5 => "5",
            NumpadKey::Digit6 => "6",
            NumpadKey::Digit7 => "7",
            NumpadKey::Digit8 => "8",
            NumpadKey::Digit9 => "9",
            NumpadKey::Digit0 => "0",
            NumpadKey::Decimal => "decimal",
            NumpadKey::Backspace => "backspace",
        }
    }

    /// Looks up a key by its wire name.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.wire_name() == name)
    }

    /// Returns the label printed on the virtual key.
    pub fn face(self) -> &'static str {
        match self {
            NumpadKey::NumLock => "Num",
            NumpadKey::Divide => "/",
            NumpadKey::Multiply => "*",
            NumpadKey::Subtract => "-",
            NumpadKey::Add => "+",
            NumpadKey::Enter => "⏎",
            NumpadKey::Decimal => ".",
            NumpadKey::Backspace => "⌫",
            digit => digit.wire_name(),
        }
    }

    /// Parses what a user typed to name a key: its face, its wire name, or a
    /// few common spellings (`numlock`, `bksp`, `return`).  Case-insensitive.
    pub fn parse_user_input(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(key) = Self::ALL.iter().copied().find(|k| k.face() == input) {
            return Some(key);
        }
        let lower = input.to_ascii_lowercase();
        match lower.as_str() {
            "numlock" | "num" => Some(NumpadKey::NumLock),
            "bksp" => Some(NumpadKey::Backspace),
            "return" => Some(NumpadKey::Enter),
            other => Self::from_wire_name(other),
        }
    }

    /// Returns `true` for the ten digit keys.
    pub fn is_digit(self) -> bool {
        (NumpadKey::Digit1.hid_usage()..=NumpadKey::Digit0.hid_usage()).contains(&self.hid_usage())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_wire_names_are_unique() {
        let names: HashSet<_> = NumpadKey::ALL.iter().map(|k| k.wire_name()).collect();
        assert_eq!(names.len(), NumpadKey::ALL.len());
    }

    #[test]
    fn test_every_key_resolves_from_its_wire_name() {
        for key in NumpadKey::ALL {
            assert_eq!(NumpadKey::from_wire_name(key.wire_name()), Some(key));
        }
    }

    #[test]
    fn test_every_key_resolves_from_its_hid_usage() {
        for key in NumpadKey::ALL {
            assert_eq!(NumpadKey::from_hid_usage(key.hid_usage()), Some(key));
        }
    }

    #[test]
    fn test_from_hid_usage_rejects_non_numpad_usage() {
        // 0x04 is the letter A
        assert_eq!(NumpadKey::from_hid_usage(0x04), None);
    }

    #[test]
    fn test_digit_usages_follow_hid_keypad_page() {
        assert_eq!(NumpadKey::Digit1.hid_usage(), 0x59);
        assert_eq!(NumpadKey::Digit0.hid_usage(), 0x62);
        assert_eq!(NumpadKey::NumLock.hid_usage(), 0x53);
    }

    #[test]
    fn test_exactly_ten_digit_keys() {
        let digits = NumpadKey::ALL.iter().filter(|k| k.is_digit()).count();
        assert_eq!(digits, 10);
        assert!(!NumpadKey::Decimal.is_digit());
        assert!(!NumpadKey::Enter.is_digit());
    }

    #[test]
    fn test_parse_user_input_accepts_faces_and_names() {
        assert_eq!(NumpadKey::parse_user_input("7"), Some(NumpadKey::Digit7));
        assert_eq!(NumpadKey::parse_user_input("/"), Some(NumpadKey::Divide));
        assert_eq!(NumpadKey::parse_user_input("+"), Some(NumpadKey::Add));
        assert_eq!(NumpadKey::parse_user_input("."), Some(NumpadKey::Decimal));
        assert_eq!(NumpadKey::parse_user_input("Enter"), Some(NumpadKey::Enter));
        assert_eq!(NumpadKey::parse_user_input(" numlock "), Some(NumpadKey::NumLock));
        assert_eq!(NumpadKey::parse_user_input("BACKSPACE"), Some(NumpadKey::Backspace));
    }

    #[test]
    fn test_parse_user_input_rejects_unknown() {
        assert_eq!(NumpadKey::parse_user_input("a"), None);
        assert_eq!(NumpadKey::parse_user_input(""), None);
    }
}
