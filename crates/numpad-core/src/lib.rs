//! # numpad-core
//!
//! Shared library for Remote Numpad containing the connection status model,
//! the numpad key table, and the plain-text wire codec for key events.
//!
//! It has zero dependencies on sockets, async runtimes, or UI frameworks, so
//! both the remote application and host-side tooling can use it.
//!
//! # Architecture overview
//!
//! Remote Numpad turns a handheld device into a numeric keypad for a computer
//! that lacks one.  Every key tap on the device is sent to the host as a short
//! text string over a transport (a TCP socket by default).
//!
//! - **`domain`** – The [`ConnectionStatus`] state values reported to the user
//!   interface and the immutable [`KeyEvent`] value produced by the keypad.
//!
//! - **`keymap`** – The [`NumpadKey`] table: every key of the virtual numpad
//!   with its USB HID usage ID and its wire name.
//!
//! - **`protocol`** – How a key event becomes the string written to the
//!   transport (`+7` for a press of the 7 key, `-7` for its release) and how
//!   such a string is parsed back.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::key_event::{KeyAction, KeyEvent};
pub use domain::status::{ConnectionStatus, StatusTone};
pub use keymap::numpad::NumpadKey;
pub use protocol::wire::{decode_key_event, encode_key_event, WireError};
