//! Domain entities for Remote Numpad.
//!
//! Pure values with no infrastructure dependencies: the connection status
//! reported by a transport and the key events produced by the keypad.
//! Outer layers (transports, the coordinator, the terminal front end) depend
//! on these types, never the other way around.

/// Key events produced by the virtual numpad.
pub mod key_event;

/// Connection status values and their presentation attributes.
pub mod status;
