//! numpad-remote library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does numpad-remote do?
//!
//! It manages the connection from the handheld keypad to the host computer:
//!
//! 1. Looks up the transport the user selected (TCP socket by default) in a
//!    [`TransportRegistry`](infrastructure::registry::TransportRegistry).
//! 2. Validates the host address with that transport's host validator.
//! 3. Opens a fresh connection and reports every status transition
//!    (`Connecting`, `Connected`, `CouldNotConnect`, …) to the user interface.
//! 4. Forwards key events to the open connection as wire strings.
//! 5. Resets failure statuses back to `Disconnected` after a fixed display time.

/// Application layer: key forwarding and connection coordination.
pub mod application;

/// Infrastructure layer: transports, host validation, registry, preferences.
pub mod infrastructure;
