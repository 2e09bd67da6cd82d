//! Key table for the virtual numpad.
//!
//! The canonical identity of a key is its USB HID Usage ID (page 0x07,
//! Keyboard/Keypad).  Each key also has a short wire name used by the text
//! protocol and a face label printed on the virtual key.

pub mod numpad;

pub use numpad::NumpadKey;
