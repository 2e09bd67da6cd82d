//! KeyEventSender: forwards numpad key events to the live connection.

use std::sync::{Arc, RwLock};

use numpad_core::{encode_key_event, KeyEvent, NumpadKey};
use tracing::trace;

use crate::infrastructure::connection::ConnectionInterface;

/// Sends key events through the currently registered connection.
///
/// The sender holds no lifecycle state of its own.  The coordinator registers
/// a connection once it reports `Connected` and unregisters it when the
/// connection is lost or closed.
#[derive(Default)]
pub struct KeyEventSender {
    target: RwLock<Option<Arc<dyn ConnectionInterface>>>,
}

impl KeyEventSender {
    /// Creates a sender with no registered connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes subsequent key events to `connection`.
    pub fn register(&self, connection: Arc<dyn ConnectionInterface>) {
        *self.target.write().unwrap_or_else(|e| e.into_inner()) = Some(connection);
    }

    /// Stops routing key events anywhere.
    pub fn unregister(&self) {
        *self.target.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Returns `true` if a connection is registered.
    pub fn is_registered(&self) -> bool {
        self.target
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Encodes `event` and sends it.
    ///
    /// Returns `false` when no connection is registered or the connection
    /// could not deliver the string.
    pub async fn send(&self, event: &KeyEvent) -> bool {
        // Clone the target out so no lock is held across the await.
        let target = self
            .target
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        let Some(target) = target else {
            trace!(?event, "key event dropped: no connection registered");
            return false;
        };

        let wire = encode_key_event(event);
        trace!(%wire, "sending key event");
        target.send_string(&wire).await
    }

    /// Sends a press followed by a release of `key`.
    ///
    /// The release is skipped if the press could not be sent.
    pub async fn press(&self, key: NumpadKey) -> bool {
        let [down, up] = KeyEvent::tap(key);
        self.send(&down).await && self.send(&up).await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
