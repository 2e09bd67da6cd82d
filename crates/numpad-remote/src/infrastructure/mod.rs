//! Infrastructure layer for the remote application.
//!
//! **Dependency rule**: this layer may depend on `numpad_core`, but MUST NOT
//! import from the `application` layer.
//!
//! # Sub-modules
//!
//! - **`connection`** – The `ConnectionInterface` contract, the status
//!   listener contract, and the transport variants (TCP socket, in-memory mock).
//!
//! - **`validation`** – Per-transport syntactic host address checks.
//!
//! - **`registry`** – Maps a transport identifier to the factory that builds
//!   its validator and a fresh connection for each attempt.
//!
//! - **`storage`** – TOML preferences (host, transport, socket settings).

pub mod connection;
pub mod registry;
pub mod storage;
pub mod validation;
