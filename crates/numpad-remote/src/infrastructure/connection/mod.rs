//! Transport-agnostic connection contract.
//!
//! Every transport (TCP socket, in-memory mock, and any future plug-in such
//! as Bluetooth RFCOMM) implements [`ConnectionInterface`].  The coordinator
//! and the key sender only ever hold an `Arc<dyn ConnectionInterface>`; the
//! transport handle itself stays private to the implementation.
//!
//! # Status reporting
//!
//! A connection reports each [`ConnectionStatus`] transition to at most one
//! [`ConnectionStatusListener`].  The shared [`StatusNotifier`] holds that
//! listener slot so every transport behaves the same way: the latest
//! registration wins, and the listener is called synchronously at the moment
//! of the transition.

use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use numpad_core::ConnectionStatus;
use tracing::debug;

pub mod mock;
pub mod socket;

/// Observer of connection status transitions.
///
/// Implementations must return quickly: they are called from whatever task
/// performed the transition.  A UI-side listener should forward the status to
/// its own dispatch context rather than doing work inline.
pub trait ConnectionStatusListener: Send + Sync {
    /// Called once per transition, in transition order.
    fn on_connection_status_change(&self, status: ConnectionStatus);
}

impl<F> ConnectionStatusListener for F
where
    F: Fn(ConnectionStatus) + Send + Sync,
{
    fn on_connection_status_change(&self, status: ConnectionStatus) {
        self(status)
    }
}

/// An open/send/close abstraction over one transport.
///
/// An instance is created fresh for each connection attempt and is never
/// reused once closed.  None of the methods return errors: failures are
/// reported through status transitions (and the `bool` of [`send_string`]).
///
/// [`send_string`]: ConnectionInterface::send_string
#[async_trait]
pub trait ConnectionInterface: Send + Sync {
    /// Opens the transport to `host`.
    ///
    /// Emits `Connecting` on entry, then `Connected` or `CouldNotConnect`.
    /// Never runs concurrently with [`close`](ConnectionInterface::close) on
    /// the same instance; a close issued while the open is in flight abandons
    /// it without a further status.
    async fn open(&self, host: &str);

    /// Writes `data` as one write and flushes it.
    ///
    /// Returns `false` when nothing could be sent.  A transport failure also
    /// releases the transport and emits `ConnectionLost`.
    async fn send_string(&self, data: &str) -> bool;

    /// Releases the transport.  Emits `Disconnecting` then `Disconnected`.
    ///
    /// Safe to call on an instance that was never opened or is already closed.
    async fn close(&self);

    /// Replaces the status listener.
    fn register_connection_status_listener(&self, listener: Arc<dyn ConnectionStatusListener>);
}

/// Single-listener status slot shared by all transport implementations.
#[derive(Default)]
pub struct StatusNotifier {
    listener: RwLock<Option<Arc<dyn ConnectionStatusListener>>>,
    current: Mutex<ConnectionStatus>,
}

impl StatusNotifier {
    /// Creates a notifier with no listener, in the `Disconnected` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`, replacing any previous one.
    pub fn register(&self, listener: Arc<dyn ConnectionStatusListener>) {
        let mut slot = self.listener.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(listener);
    }

    /// Records `status` and hands it to the registered listener.
    pub fn emit(&self, status: ConnectionStatus) {
        {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            *current = status;
        }

        // Clone out of the slot so the listener runs without the lock held.
        let listener = self
            .listener
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        match listener {
            Some(listener) => listener.on_connection_status_change(status),
            None => debug!("status {status:?} emitted with no listener registered"),
        }
    }

    /// Returns the most recently emitted status.
    pub fn current(&self) -> ConnectionStatus {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<ConnectionStatus>>>, Arc<dyn ConnectionStatusListener>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: Arc<dyn ConnectionStatusListener> =
            Arc::new(move |s: ConnectionStatus| sink.lock().unwrap().push(s));
        (seen, listener)
    }

    #[test]
    fn test_new_notifier_reports_disconnected() {
        assert_eq!(StatusNotifier::new().current(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_emit_without_listener_still_updates_current() {
        // Arrange
        let notifier = StatusNotifier::new();

        // Act
        notifier.emit(ConnectionStatus::Connecting);

        // Assert
        assert_eq!(notifier.current(), ConnectionStatus::Connecting);
    }

    #[test]
    fn test_emit_calls_listener_in_order() {
        // Arrange
        let notifier = StatusNotifier::new();
        let (seen, listener) = recorder();
        notifier.register(listener);

        // Act
        notifier.emit(ConnectionStatus::Connecting);
        notifier.emit(ConnectionStatus::Connected);

        // Assert
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ConnectionStatus::Connecting, ConnectionStatus::Connected]
        );
    }

    #[test]
    fn test_latest_registration_wins() {
        // Arrange
        let notifier = StatusNotifier::new();
        let (first, first_listener) = recorder();
        let (second, second_listener) = recorder();
        notifier.register(first_listener);
        notifier.register(second_listener);

        // Act
        notifier.emit(ConnectionStatus::CouldNotConnect);

        // Assert
        assert!(first.lock().unwrap().is_empty());
        assert_eq!(*second.lock().unwrap(), vec![ConnectionStatus::CouldNotConnect]);
    }

    #[test]
    fn test_listener_may_reenter_notifier() {
        // A listener that reads the current status must not deadlock.
        let notifier = Arc::new(StatusNotifier::new());
        let inner = Arc::clone(&notifier);
        let observed = Arc::new(Mutex::new(None));
        let out = Arc::clone(&observed);
        notifier.register(Arc::new(move |_s: ConnectionStatus| {
            *out.lock().unwrap() = Some(inner.current());
        }));

        notifier.emit(ConnectionStatus::Connected);

        assert_eq!(*observed.lock().unwrap(), Some(ConnectionStatus::Connected));
    }
}
