//! TCP socket transport.
//!
//! Connects to the host's Remote Numpad server on TCP port 4576 and writes
//! each key event string as a single write followed by a flush.  Nothing is
//! ever read back: the read half of the socket is only kept as the transport
//! handle and probed for EOF before each write, so a peer that has gone away
//! is noticed on the next keystroke.
//!
//! # Resource fields
//!
//! ```text
//! writer: Option<BufWriter<OwnedWriteHalf>>   the write channel
//! socket: Option<OwnedReadHalf>               the transport handle
//! ```
//!
//! Both are `Some` only between a successful open and the next release.
//! Lock order is always `writer` then `socket`.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use numpad_core::ConnectionStatus;
use thiserror::Error;
use tokio::{
    io::{AsyncWriteExt, BufWriter},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
    sync::{watch, Mutex},
    time,
};
use tracing::{debug, info, trace, warn};

use super::{ConnectionInterface, ConnectionStatusListener, StatusNotifier};

/// The port the host-side server listens on.
pub const DEFAULT_PORT: u16 = 4576;

/// How long to wait for the TCP handshake before giving up.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Errors that can occur while opening the socket.
#[derive(Debug, Error)]
pub enum SocketError {
    /// The handshake (including name resolution) did not finish in time.
    #[error("timed out after {timeout:?} connecting to {host}:{port}")]
    Timeout {
        host: String,
        port: u16,
        timeout: Duration,
    },
    /// The connection was refused, unreachable, or the name did not resolve.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
}

/// Settings for the socket transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketConfig {
    /// Port on the host to connect to.
    pub port: u16,
    /// Upper bound for the connect handshake.
    pub connect_timeout: Duration,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

type WriteChannel = BufWriter<OwnedWriteHalf>;

/// A [`ConnectionInterface`] over one TCP socket.
pub struct SocketConnection {
    config: SocketConfig,
    notifier: StatusNotifier,
    /// Serializes `open` against `close`.
    lifecycle: Mutex<()>,
    writer: Mutex<Option<WriteChannel>>,
    socket: Mutex<Option<OwnedReadHalf>>,
    /// Set once by `close`; an in-flight `open` watches it to abandon the attempt.
    closed: watch::Sender<bool>,
}

impl SocketConnection {
    /// Creates an unopened socket connection.
    pub fn new(config: SocketConfig) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            config,
            notifier: StatusNotifier::new(),
            lifecycle: Mutex::new(()),
            writer: Mutex::new(None),
            socket: Mutex::new(None),
            closed,
        }
    }

    /// Returns the configuration this connection was built with.
    pub fn config(&self) -> &SocketConfig {
        &self.config
    }

    /// Returns the last status this connection emitted.
    pub fn status(&self) -> ConnectionStatus {
        self.notifier.current()
    }

    /// Returns `true` when neither the write channel nor the socket handle is held.
    pub async fn is_released(&self) -> bool {
        let writer = self.writer.lock().await;
        let socket = self.socket.lock().await;
        writer.is_none() && socket.is_none()
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves `host` and connects to it within the configured timeout.
    async fn open_socket(&self, host: &str) -> Result<TcpStream, SocketError> {
        let port = self.config.port;
        let timeout = self.config.connect_timeout;

        match time::timeout(timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(SocketError::Connect {
                host: host.to_string(),
                port,
                source,
            }),
            Err(_) => Err(SocketError::Timeout {
                host: host.to_string(),
                port,
                timeout,
            }),
        }
    }

    async fn release(&self) {
        let mut writer = self.writer.lock().await;
        let mut socket = self.socket.lock().await;
        Self::release_locked(&mut writer, &mut socket).await;
    }

    /// Closes the write channel, then drops the socket handle.
    ///
    /// A failure closing the first does not prevent the second; errors are
    /// only logged.
    async fn release_locked(writer: &mut Option<WriteChannel>, socket: &mut Option<OwnedReadHalf>) {
        if let Some(mut channel) = writer.take() {
            if let Err(e) = channel.shutdown().await {
                debug!("error closing socket write channel: {e}");
            }
        }
        if socket.take().is_some() {
            debug!("socket handle released");
        }
    }

    /// Non-blocking check for an orderly shutdown or reset from the peer.
    fn peer_has_closed(socket: &Option<OwnedReadHalf>) -> bool {
        let Some(handle) = socket else {
            return true;
        };

        let mut probe = [0u8; 64];
        loop {
            match handle.try_read(&mut probe) {
                Ok(0) => return true,
                // The host is not expected to talk; discard anything it sends.
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return false,
                Err(e) => {
                    debug!("socket probe failed: {e}");
                    return true;
                }
            }
        }
    }

    async fn write_and_flush(channel: &mut WriteChannel, data: &str) -> io::Result<()> {
        channel.write_all(data.as_bytes()).await?;
        channel.flush().await
    }
}

#[async_trait]
impl ConnectionInterface for SocketConnection {
    async fn open(&self, host: &str) {
        let _lifecycle = self.lifecycle.lock().await;
        if self.is_closed() {
            debug!("open({host}) ignored: connection already closed");
            return;
        }

        self.notifier.emit(ConnectionStatus::Connecting);

        let mut closed_rx = self.closed.subscribe();
        let outcome = tokio::select! {
            result = self.open_socket(host) => Some(result),
            _ = closed_rx.wait_for(|closed| *closed) => None,
        };

        match outcome {
            None => {
                // Dropping the connect future released any half-open socket.
                debug!("open({host}) abandoned: close requested");
            }
            Some(Ok(stream)) => {
                if self.is_closed() {
                    debug!("open({host}) completed after close; discarding socket");
                    return;
                }
                if let Err(e) = stream.set_nodelay(true) {
                    debug!("could not disable Nagle on socket to {host}: {e}");
                }

                let (read_half, write_half) = stream.into_split();
                {
                    let mut writer = self.writer.lock().await;
                    let mut socket = self.socket.lock().await;
                    *writer = Some(BufWriter::new(write_half));
                    *socket = Some(read_half);
                }

                info!("connected to {host}:{}", self.config.port);
                self.notifier.emit(ConnectionStatus::Connected);
            }
            Some(Err(e)) => {
                warn!("{e}");
                self.release().await;
                self.notifier.emit(ConnectionStatus::CouldNotConnect);
            }
        }
    }

    async fn send_string(&self, data: &str) -> bool {
        let mut writer = self.writer.lock().await;
        let mut socket = self.socket.lock().await;

        let Some(channel) = writer.as_mut() else {
            debug!("send of {data:?} dropped: socket not open");
            return false;
        };

        let mut closed_rx = self.closed.subscribe();
        let outcome = if Self::peer_has_closed(&socket) {
            Some(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "peer closed the connection",
            )))
        } else {
            // A peer that stopped reading can stall the write indefinitely;
            // `close` must still get through.
            tokio::select! {
                biased;
                _ = closed_rx.wait_for(|closed| *closed) => None,
                result = Self::write_and_flush(channel, data) => Some(result),
            }
        };

        match outcome {
            None => {
                // The channel may hold a partial write; drop it without flushing.
                debug!("send of {} bytes abandoned: close requested", data.len());
                writer.take();
                socket.take();
                false
            }
            Some(Ok(())) => {
                trace!("sent {data:?}");
                true
            }
            Some(Err(e)) => {
                warn!("connection lost while sending {data:?}: {e}");
                Self::release_locked(&mut writer, &mut socket).await;
                drop(socket);
                drop(writer);

                // A send racing an explicit close is not a loss.
                if !self.is_closed() {
                    self.notifier.emit(ConnectionStatus::ConnectionLost);
                }
                false
            }
        }
    }

    async fn close(&self) {
        self.closed.send_replace(true);

        let _lifecycle = self.lifecycle.lock().await;
        self.notifier.emit(ConnectionStatus::Disconnecting);
        self.release().await;
        info!("socket connection closed");
        self.notifier.emit(ConnectionStatus::Disconnected);
    }

    fn register_connection_status_listener(&self, listener: Arc<dyn ConnectionStatusListener>) {
        self.notifier.register(listener);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use tokio::net::TcpListener;

    fn recording(conn: &SocketConnection) -> Arc<StdMutex<Vec<ConnectionStatus>>> {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        conn.register_connection_status_listener(Arc::new(move |s: ConnectionStatus| {
            sink.lock().unwrap().push(s)
        }));
        seen
    }

    /// Returns a loopback port with nothing listening on it.
    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    #[test]
    fn test_default_config_uses_port_4576() {
        assert_eq!(SocketConfig::default().port, 4576);
    }

    #[test]
    fn test_default_connect_timeout_is_three_seconds() {
        assert_eq!(
            SocketConfig::default().connect_timeout,
            Duration::from_millis(3000)
        );
    }

    #[tokio::test]
    async fn test_new_connection_holds_no_resources() {
        let conn = SocketConnection::new(SocketConfig::default());
        assert!(conn.is_released().await);
        assert_eq!(conn.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_send_before_open_returns_false_without_status() {
        // Arrange
        let conn = SocketConnection::new(SocketConfig::default());
        let seen = recording(&conn);

        // Act
        let sent = conn.send_string("+1").await;

        // Assert
        assert!(!sent);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_close_on_never_opened_connection_is_harmless() {
        // Arrange
        let conn = SocketConnection::new(SocketConfig::default());
        let seen = recording(&conn);

        // Act
        conn.close().await;
        conn.close().await;

        // Assert
        assert!(conn.is_released().await);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ConnectionStatus::Disconnecting,
                ConnectionStatus::Disconnected,
                ConnectionStatus::Disconnecting,
                ConnectionStatus::Disconnected,
            ]
        );
    }

    #[tokio::test]
    async fn test_open_refused_port_reports_could_not_connect() {
        // Arrange
        let port = closed_port().await;
        let conn = SocketConnection::new(SocketConfig {
            port,
            connect_timeout: Duration::from_secs(3),
        });
        let seen = recording(&conn);

        // Act
        conn.open("127.0.0.1").await;

        // Assert
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ConnectionStatus::Connecting, ConnectionStatus::CouldNotConnect]
        );
        assert!(conn.is_released().await);
    }

    #[tokio::test]
    async fn test_open_after_close_is_ignored() {
        // Arrange
        let conn = SocketConnection::new(SocketConfig::default());
        conn.close().await;
        let seen = recording(&conn);

        // Act
        conn.open("127.0.0.1").await;

        // Assert
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(conn.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_send_after_close_returns_false() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let conn = SocketConnection::new(SocketConfig {
            port,
            ..Default::default()
        });
        conn.open("127.0.0.1").await;
        let (_peer, _) = listener.accept().await.unwrap();
        let seen = recording(&conn);

        // Act
        conn.close().await;
        let sent = conn.send_string("+1").await;

        // Assert
        assert!(!sent);
        assert!(conn.is_released().await);
        assert!(!seen
            .lock()
            .unwrap()
            .contains(&ConnectionStatus::ConnectionLost));
    }

    #[tokio::test]
    async fn test_close_interrupts_send_stalled_on_silent_peer() {
        // Arrange: a peer that accepts but never reads
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let conn = Arc::new(SocketConnection::new(SocketConfig {
            port,
            ..Default::default()
        }));
        conn.open("127.0.0.1").await;
        let (_peer, _) = listener.accept().await.unwrap();
        let seen = recording(&conn);

        let sending = Arc::clone(&conn);
        let send = tokio::spawn(async move {
            sending.send_string(&"7".repeat(64 * 1024 * 1024)).await
        });
        time::sleep(Duration::from_millis(300)).await;

        // Act
        let closed = time::timeout(Duration::from_secs(3), conn.close()).await;

        // Assert
        assert!(closed.is_ok(), "close waited on the stalled send");
        let sent = time::timeout(Duration::from_secs(3), send)
            .await
            .unwrap()
            .unwrap();
        assert!(!sent);
        assert!(conn.is_released().await);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ConnectionStatus::Disconnecting, ConnectionStatus::Disconnected]
        );
    }

    #[tokio::test]
    async fn test_open_and_send_reaches_listener() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let conn = SocketConnection::new(SocketConfig {
            port,
            ..Default::default()
        });

        // Act
        conn.open("127.0.0.1").await;
        let (mut peer, _) = listener.accept().await.unwrap();
        assert!(conn.send_string("+7").await);
        conn.close().await;

        // Assert: the peer reads exactly what was written, then EOF
        let mut received = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut peer, &mut received)
            .await
            .unwrap();
        assert_eq!(received, "+7");
        assert!(conn.is_released().await);
    }
}
