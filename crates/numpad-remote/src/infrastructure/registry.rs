//! Transport registry.
//!
//! Maps the transport identifier chosen by the user (for example
//! `"socket"`) to a [`TransportFactory`].  The registry is populated once at
//! startup; each connection attempt looks its transport up by name and asks
//! the factory for a host validator and a brand-new connection.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::infrastructure::connection::{
    socket::{SocketConfig, SocketConnection},
    ConnectionInterface,
};
use crate::infrastructure::validation::{HostValidator, SocketHostValidator};

/// Identifier of the TCP socket transport.
pub const SOCKET_TRANSPORT: &str = "socket";

/// Identifier of the in-memory mock transport.
pub const MOCK_TRANSPORT: &str = "mock";

/// Error returned when a factory cannot build a connection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport {name} is unavailable: {reason}")]
    Unavailable { name: String, reason: String },
}

/// Builds the validator and per-attempt connections for one transport.
pub trait TransportFactory: Send + Sync {
    /// Returns the host validator for this transport.
    fn validator(&self) -> Arc<dyn HostValidator>;

    /// Builds a fresh, unopened connection.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the transport cannot be used on this
    /// device (missing adapter, missing permission, …).
    fn create_connection(&self) -> Result<Arc<dyn ConnectionInterface>, TransportError>;
}

/// Factory for [`SocketConnection`]s sharing one [`SocketConfig`].
#[derive(Debug, Clone, Default)]
pub struct SocketTransport {
    config: SocketConfig,
}

impl SocketTransport {
    pub fn new(config: SocketConfig) -> Self {
        Self { config }
    }
}

impl TransportFactory for SocketTransport {
    fn validator(&self) -> Arc<dyn HostValidator> {
        Arc::new(SocketHostValidator)
    }

    fn create_connection(&self) -> Result<Arc<dyn ConnectionInterface>, TransportError> {
        Ok(Arc::new(SocketConnection::new(self.config.clone())))
    }
}

/// Name-to-factory lookup for all known transports.
#[derive(Default, Clone)]
pub struct TransportRegistry {
    factories: BTreeMap<String, Arc<dyn TransportFactory>>,
}

impl TransportRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry containing the socket transport.
    pub fn with_socket(config: SocketConfig) -> Self {
        let mut registry = Self::new();
        registry.register(SOCKET_TRANSPORT, Arc::new(SocketTransport::new(config)));
        registry
    }

    /// Registers `factory` under `name`, returning any factory it replaces.
    ///
    /// Names are case-insensitive.
    pub fn register(
        &mut self,
        name: &str,
        factory: Arc<dyn TransportFactory>,
    ) -> Option<Arc<dyn TransportFactory>> {
        self.factories.insert(normalize(name), factory)
    }

    /// Looks up the factory registered under `name`.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn TransportFactory>> {
        self.factories.get(&normalize(name)).cloned()
    }

    /// Registered transport names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
