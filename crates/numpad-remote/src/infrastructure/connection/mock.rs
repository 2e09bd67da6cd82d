//! In-memory transport for tests and demos.
//!
//! # Why a mock transport?
//!
//! The socket transport needs a reachable host, and the interesting failure
//! paths (a peer disappearing mid-session, an attempt that never finishes)
//! are awkward to produce with real sockets.  `MockConnection` follows the
//! same contract as the socket variant but scripts the outcome of `open`
//! and records every string it is asked to send.
//!
//! # Usage in tests
//!
//! ```ignore
//! let factory = Arc::new(MockTransportFactory::new(MockOpenOutcome::Connect));
//! registry.register(MOCK_TRANSPORT, factory.clone());
//!
//! coordinator.connect("10.0.0.5", MOCK_TRANSPORT).await?;
//!
//! let conn = factory.last_instance().unwrap();
//! assert_eq!(conn.sent(), vec!["+7", "-7"]);
//! ```

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use numpad_core::ConnectionStatus;
use tokio::sync::watch;
use tracing::debug;

use super::{ConnectionInterface, ConnectionStatusListener, StatusNotifier};
use crate::infrastructure::registry::{TransportError, TransportFactory};
use crate::infrastructure::validation::{HostValidator, SocketHostValidator};

/// What a [`MockConnection`] does when opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOpenOutcome {
    /// Reports `Connected`.
    Connect,
    /// Reports `CouldNotConnect`.
    Fail,
    /// Stays in `Connecting` until the connection is closed.
    Hang,
}

/// A connection that records calls instead of performing I/O.
pub struct MockConnection {
    outcome: MockOpenOutcome,
    notifier: StatusNotifier,
    connected: AtomicBool,
    peer_dropped: AtomicBool,
    closed: watch::Sender<bool>,
    sent: Mutex<Vec<String>>,
    hosts: Mutex<Vec<String>>,
    close_calls: AtomicUsize,
}

impl MockConnection {
    /// Creates a mock whose `open` behaves according to `outcome`.
    pub fn new(outcome: MockOpenOutcome) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            outcome,
            notifier: StatusNotifier::new(),
            connected: AtomicBool::new(false),
            peer_dropped: AtomicBool::new(false),
            closed,
            sent: Mutex::new(Vec::new()),
            hosts: Mutex::new(Vec::new()),
            close_calls: AtomicUsize::new(0),
        }
    }

    /// Simulates the host going away: the next send fails.
    pub fn drop_peer(&self) {
        self.peer_dropped.store(true, Ordering::SeqCst);
    }

    /// Strings accepted by `send_string`, in order.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Hosts passed to `open`, in order.
    pub fn opened_hosts(&self) -> Vec<String> {
        self.hosts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of times `close` ran.
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Whether the mock currently counts as open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Returns the last status this connection emitted.
    pub fn status(&self) -> ConnectionStatus {
        self.notifier.current()
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

#[async_trait]
impl ConnectionInterface for MockConnection {
    async fn open(&self, host: &str) {
        if self.is_closed() {
            return;
        }
        self.hosts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(host.to_string());
        self.notifier.emit(ConnectionStatus::Connecting);

        match self.outcome {
            MockOpenOutcome::Connect => {
                tokio::task::yield_now().await;
                if self.is_closed() {
                    return;
                }
                self.connected.store(true, Ordering::SeqCst);
                self.notifier.emit(ConnectionStatus::Connected);
            }
            MockOpenOutcome::Fail => {
                tokio::task::yield_now().await;
                if self.is_closed() {
                    return;
                }
                self.notifier.emit(ConnectionStatus::CouldNotConnect);
            }
            MockOpenOutcome::Hang => {
                let mut closed_rx = self.closed.subscribe();
                let _ = closed_rx.wait_for(|closed| *closed).await;
                debug!("mock open({host}) abandoned: close requested");
            }
        }
    }

    async fn send_string(&self, data: &str) -> bool {
        if !self.connected.load(Ordering::SeqCst) {
            return false;
        }
        if self.peer_dropped.load(Ordering::SeqCst) {
            self.connected.store(false, Ordering::SeqCst);
            if !self.is_closed() {
                self.notifier.emit(ConnectionStatus::ConnectionLost);
            }
            return false;
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(data.to_string());
        true
    }

    async fn close(&self) {
        self.closed.send_replace(true);
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.notifier.emit(ConnectionStatus::Disconnecting);
        self.connected.store(false, Ordering::SeqCst);
        self.notifier.emit(ConnectionStatus::Disconnected);
    }

    fn register_connection_status_listener(&self, listener: Arc<dyn ConnectionStatusListener>) {
        self.notifier.register(listener);
    }
}

/// Builds [`MockConnection`]s and keeps every instance for inspection.
///
/// Host validation uses the socket rules so tests exercise real addresses.
pub struct MockTransportFactory {
    outcome: Mutex<MockOpenOutcome>,
    /// When `true`, `create_connection` fails as an unconstructable transport would.
    pub fail_construction: AtomicBool,
    instances: Mutex<Vec<Arc<MockConnection>>>,
}

impl MockTransportFactory {
    /// Creates a factory whose connections open with `outcome`.
    pub fn new(outcome: MockOpenOutcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            fail_construction: AtomicBool::new(false),
            instances: Mutex::new(Vec::new()),
        }
    }

    /// Changes the outcome for connections created from now on.
    pub fn set_outcome(&self, outcome: MockOpenOutcome) {
        *self.outcome.lock().unwrap_or_else(|e| e.into_inner()) = outcome;
    }

    /// Number of connections created so far.
    pub fn created(&self) -> usize {
        self.instances.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// The most recently created connection.
    pub fn last_instance(&self) -> Option<Arc<MockConnection>> {
        self.instances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

impl TransportFactory for MockTransportFactory {
    fn validator(&self) -> Arc<dyn HostValidator> {
        Arc::new(SocketHostValidator)
    }

    fn create_connection(&self) -> Result<Arc<dyn ConnectionInterface>, TransportError> {
        if self.fail_construction.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable {
                name: "mock".into(),
                reason: "construction disabled".into(),
            });
        }
        let outcome = *self.outcome.lock().unwrap_or_else(|e| e.into_inner());
        let conn = Arc::new(MockConnection::new(outcome));
        self.instances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::clone(&conn));
        Ok(conn)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_outcome_accepts_sends() {
        // Arrange
        let conn = MockConnection::new(MockOpenOutcome::Connect);

        // Act
        conn.open("10.0.0.1").await;
        let ok = conn.send_string("+1").await;

        // Assert
        assert!(ok);
        assert_eq!(conn.sent(), vec!["+1"]);
        assert_eq!(conn.opened_hosts(), vec!["10.0.0.1"]);
    }

    #[tokio::test]
    async fn test_dropped_peer_reports_connection_lost() {
        // Arrange
        let conn = MockConnection::new(MockOpenOutcome::Connect);
        conn.open("10.0.0.1").await;
        conn.drop_peer();

        // Act
        let ok = conn.send_string("+1").await;

        // Assert
        assert!(!ok);
        assert_eq!(conn.status(), ConnectionStatus::ConnectionLost);
        assert!(!conn.is_connected());
    }

    #[tokio::test]
    async fn test_hang_outcome_ends_on_close() {
        // Arrange
        let conn = Arc::new(MockConnection::new(MockOpenOutcome::Hang));
        let opener = Arc::clone(&conn);
        let task = tokio::spawn(async move { opener.open("10.0.0.1").await });
        tokio::task::yield_now().await;

        // Act
        conn.close().await;
        task.await.unwrap();

        // Assert
        assert_eq!(conn.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_factory_construction_failure() {
        let factory = MockTransportFactory::new(MockOpenOutcome::Connect);
        factory.fail_construction.store(true, Ordering::SeqCst);
        assert!(factory.create_connection().is_err());
        assert_eq!(factory.created(), 0);
    }
}
