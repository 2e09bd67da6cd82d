//! Protocol module containing the plain-text wire codec.

pub mod wire;

pub use wire::{decode_key_event, encode_key_event, WireError};
