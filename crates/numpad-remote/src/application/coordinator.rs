//! ConnectionCoordinator: owns the lifecycle of the single live connection.
//!
//! # How status flows
//!
//! ```text
//!  connection task ──status──► listener ──StatusUpdate──► dispatch task ──StatusView──► presenter
//!  reset timer ──────────────────────────StatusUpdate──┘
//! ```
//!
//! Connections report transitions from whatever task performed them.  The
//! coordinator's listener tags each one with the attempt id of the connection
//! that produced it and pushes it onto an unbounded channel.  A single
//! dispatch task drains that channel, drops updates from superseded attempts,
//! applies the rest to the coordinator state, and hands the resulting
//! [`StatusView`] to the [`StatusPresenter`].  The presenter is therefore only
//! ever called from one task, in transition order.
//!
//! # Failure display
//!
//! `CouldNotConnect` and `ConnectionLost` are shown for [`RESET_DELAY`] with
//! both controls disabled, then the coordinator resets to `Disconnected` on
//! its own.  A new attempt or an explicit disconnect cancels the pending reset.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use numpad_core::ConnectionStatus;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::send_keys::KeyEventSender;
use crate::infrastructure::connection::{ConnectionInterface, ConnectionStatusListener};
use crate::infrastructure::registry::TransportRegistry;

/// How long a failure status stays on screen before resetting to `Disconnected`.
pub const RESET_DELAY: Duration = Duration::from_millis(2000);

/// Reasons a connection attempt is rejected before any transport work starts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("no host selected")]
    NoHostSelected,
    #[error("transport {0:?} is not available")]
    InvalidTransport(String),
    #[error("{0:?} is not a valid host address")]
    InvalidHost(String),
}

/// What the UI should display after a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusView {
    pub status: ConnectionStatus,
    pub connect_enabled: bool,
    pub disconnect_enabled: bool,
}

/// UI-side sink for [`StatusView`]s.
pub trait StatusPresenter: Send + Sync {
    fn present(&self, view: StatusView);
}

impl<F> StatusPresenter for F
where
    F: Fn(StatusView) + Send + Sync,
{
    fn present(&self, view: StatusView) {
        self(view)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateOrigin {
    Connection,
    /// Carries the token of the timer that fired.
    Timer(Uuid),
    Coordinator,
}

#[derive(Debug)]
struct StatusUpdate {
    attempt: Uuid,
    status: ConnectionStatus,
    origin: UpdateOrigin,
}

struct ResetTimer {
    token: Uuid,
    handle: JoinHandle<()>,
}

struct State {
    status: ConnectionStatus,
    connect_enabled: bool,
    disconnect_enabled: bool,
    connection: Option<Arc<dyn ConnectionInterface>>,
    attempt: Option<Uuid>,
    reset_timer: Option<ResetTimer>,
}

impl State {
    fn new() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            connect_enabled: true,
            disconnect_enabled: false,
            connection: None,
            attempt: None,
            reset_timer: None,
        }
    }

    fn view(&self) -> StatusView {
        StatusView {
            status: self.status,
            connect_enabled: self.connect_enabled,
            disconnect_enabled: self.disconnect_enabled,
        }
    }

    fn show(&mut self, status: ConnectionStatus, connect_enabled: bool, disconnect_enabled: bool) {
        self.status = status;
        self.connect_enabled = connect_enabled;
        self.disconnect_enabled = disconnect_enabled;
    }

    fn cancel_reset_timer(&mut self) {
        if let Some(timer) = self.reset_timer.take() {
            debug!(token = %timer.token, "reset timer cancelled");
            timer.handle.abort();
        }
    }
}

struct Shared {
    registry: TransportRegistry,
    sender: Arc<KeyEventSender>,
    presenter: Arc<dyn StatusPresenter>,
    updates_tx: mpsc::UnboundedSender<StatusUpdate>,
    state: Mutex<State>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies one update on the dispatch task and presents the result.
    fn apply(&self, update: StatusUpdate) {
        let view = {
            let mut state = self.lock_state();
            if state.attempt != Some(update.attempt) {
                debug!(
                    attempt = %update.attempt,
                    status = ?update.status,
                    "dropping status from superseded attempt"
                );
                return;
            }

            match update.origin {
                UpdateOrigin::Timer(token) => {
                    let armed = state.reset_timer.as_ref().map(|t| t.token) == Some(token);
                    if !armed || !state.status.is_failure() {
                        debug!(%token, "dropping stale reset");
                        return;
                    }
                    state.reset_timer = None;
                    state.show(ConnectionStatus::Disconnected, true, false);
                }
                UpdateOrigin::Connection | UpdateOrigin::Coordinator => {
                    if !self.transition(&mut state, update.attempt, update.status) {
                        return;
                    }
                }
            }
            state.view()
        };

        info!(status = %view.status, "connection status");
        self.presenter.present(view);
    }

    /// Returns `false` if the update was ignored.
    fn transition(&self, state: &mut State, attempt: Uuid, status: ConnectionStatus) -> bool {
        match status {
            ConnectionStatus::Connecting => {
                state.cancel_reset_timer();
                state.show(status, false, true);
            }
            ConnectionStatus::Connected => {
                state.cancel_reset_timer();
                // Absent if a disconnect already took the connection.
                if let Some(connection) = &state.connection {
                    self.sender.register(Arc::clone(connection));
                }
                state.show(status, false, true);
            }
            ConnectionStatus::Disconnecting => {
                state.cancel_reset_timer();
                state.show(status, false, false);
            }
            ConnectionStatus::Disconnected => {
                state.cancel_reset_timer();
                state.show(status, true, false);
            }
            ConnectionStatus::ConnectionLost | ConnectionStatus::CouldNotConnect => {
                // A failure racing a disconnect: the disconnect already claimed the instance.
                if state.connection.take().is_none() {
                    debug!(?status, "ignoring failure of a connection being closed");
                    return false;
                }
                self.sender.unregister();
                state.show(status, false, false);
                state.cancel_reset_timer();
                state.reset_timer = Some(self.arm_reset(attempt));
            }
        }
        true
    }

    fn arm_reset(&self, attempt: Uuid) -> ResetTimer {
        let token = Uuid::new_v4();
        let tx = self.updates_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(RESET_DELAY).await;
            let _ = tx.send(StatusUpdate {
                attempt,
                status: ConnectionStatus::Disconnected,
                origin: UpdateOrigin::Timer(token),
            });
        });
        ResetTimer { token, handle }
    }

    fn push(&self, attempt: Uuid, status: ConnectionStatus, origin: UpdateOrigin) {
        if self
            .updates_tx
            .send(StatusUpdate {
                attempt,
                status,
                origin,
            })
            .is_err()
        {
            debug!(?status, "dispatch task gone; status update dropped");
        }
    }
}

/// Connects, disconnects, and tracks the status of the remote numpad.
///
/// Cheap to clone; all clones share the same state.  Must be created inside a
/// Tokio runtime because it spawns its dispatch task on construction.
#[derive(Clone)]
pub struct ConnectionCoordinator {
    shared: Arc<Shared>,
}

impl ConnectionCoordinator {
    /// Creates a coordinator using the transports in `registry`.
    pub fn new(registry: TransportRegistry, presenter: Arc<dyn StatusPresenter>) -> Self {
        let (updates_tx, mut updates_rx) = mpsc::unbounded_channel::<StatusUpdate>();
        let shared = Arc::new(Shared {
            registry,
            sender: Arc::new(KeyEventSender::new()),
            presenter,
            updates_tx,
            state: Mutex::new(State::new()),
        });

        let weak: Weak<Shared> = Arc::downgrade(&shared);
        tokio::spawn(async move {
            while let Some(update) = updates_rx.recv().await {
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                shared.apply(update);
            }
            debug!("status dispatch task stopped");
        });

        Self { shared }
    }

    /// Starts a connection attempt to `host` over the named transport.
    ///
    /// Returns once the attempt is under way; progress is reported through the
    /// presenter.  A connection that is still live is closed first.
    ///
    /// # Errors
    ///
    /// - [`ConnectError::NoHostSelected`] if `host` is blank.
    /// - [`ConnectError::InvalidTransport`] if the transport is unknown or
    ///   cannot be constructed.
    /// - [`ConnectError::InvalidHost`] if the transport rejects the address.
    ///
    /// A rejected attempt changes no state.
    pub async fn connect(&self, host: &str, transport: &str) -> Result<(), ConnectError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(ConnectError::NoHostSelected);
        }

        let factory = self
            .shared
            .registry
            .resolve(transport)
            .ok_or_else(|| ConnectError::InvalidTransport(transport.to_string()))?;

        if !factory.validator().is_host_valid(host) {
            warn!(host, transport, "rejected host address");
            return Err(ConnectError::InvalidHost(host.to_string()));
        }

        let connection = factory.create_connection().map_err(|e| {
            warn!(transport, error = %e, "could not construct transport");
            ConnectError::InvalidTransport(transport.to_string())
        })?;

        let attempt = Uuid::new_v4();
        connection.register_connection_status_listener(self.listener_for(attempt));

        let previous = {
            let mut state = self.shared.lock_state();
            state.cancel_reset_timer();
            state.attempt = Some(attempt);
            state.connection.replace(Arc::clone(&connection))
        };

        if let Some(previous) = previous {
            info!("closing previous connection before reconnecting");
            self.shared.sender.unregister();
            previous.close().await;
        }

        info!(host, transport, %attempt, "connecting");
        let host = host.to_string();
        tokio::spawn(async move {
            connection.open(&host).await;
        });
        Ok(())
    }

    /// Tears down the current connection, or clears a failure display.
    ///
    /// Waits for the transport to finish closing.  Does nothing when already
    /// idle.
    pub async fn disconnect(&self) {
        let (connection, attempt, status) = {
            let mut state = self.shared.lock_state();
            state.cancel_reset_timer();
            (state.connection.take(), state.attempt, state.status)
        };
        self.shared.sender.unregister();

        match (connection, attempt) {
            (Some(connection), _) => {
                info!("disconnecting");
                connection.close().await;
            }
            (None, Some(attempt)) if !status.is_idle() => {
                // The failed connection is already gone; report the teardown ourselves.
                self.shared
                    .push(attempt, ConnectionStatus::Disconnecting, UpdateOrigin::Coordinator);
                self.shared
                    .push(attempt, ConnectionStatus::Disconnected, UpdateOrigin::Coordinator);
            }
            _ => debug!("disconnect requested while idle"),
        }
    }

    /// Status as of the last applied update.
    pub fn status(&self) -> ConnectionStatus {
        self.shared.lock_state().status
    }

    /// Status and control state as of the last applied update.
    pub fn view(&self) -> StatusView {
        self.shared.lock_state().view()
    }

    /// Returns `true` while a failure reset is pending.
    pub fn reset_pending(&self) -> bool {
        self.shared.lock_state().reset_timer.is_some()
    }

    /// The sender key events should go through.
    pub fn key_sender(&self) -> Arc<KeyEventSender> {
        Arc::clone(&self.shared.sender)
    }

    /// Names of the transports this coordinator can use.
    pub fn transports(&self) -> Vec<String> {
        self.shared
            .registry
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn listener_for(&self, attempt: Uuid) -> Arc<dyn ConnectionStatusListener> {
        let tx = self.shared.updates_tx.clone();
        Arc::new(move |status: ConnectionStatus| {
            let _ = tx.send(StatusUpdate {
                attempt,
                status,
                origin: UpdateOrigin::Connection,
            });
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
