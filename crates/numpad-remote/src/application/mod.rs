//! Application layer use cases for the remote numpad.
//!
//! # What use cases does the remote have?
//!
//! - **`send_keys`** – Encodes numpad key events into wire strings and hands
//!   them to whichever connection is currently live.  Keys typed while no
//!   connection is registered are dropped, never queued.
//!
//! - **`coordinator`** – Owns the connection lifecycle: resolves the chosen
//!   transport, validates the host, opens and closes connections, reacts to
//!   status transitions, and runs the failure-display reset timer.  The UI
//!   only ever sees the resulting [`coordinator::StatusView`]s.

pub mod coordinator;
pub mod send_keys;
