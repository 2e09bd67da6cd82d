//! Remote Numpad, terminal front end.
//!
//! Turns this machine into a numeric keypad for another computer.  Keys typed
//! on stdin are sent to the host over the selected transport; connection
//! status changes are printed as they happen.
//!
//! # Usage
//!
//! ```text
//! numpad-remote [OPTIONS]
//!
//! Options:
//!   --config <PATH>              Preferences file [default: platform config dir]
//!   --host <HOST>                Host to connect to
//!   --transport <NAME>           Transport identifier [default: socket]
//!   --port <PORT>                Socket port [default: 4576]
//!   --connect-timeout-ms <MS>    Socket connect timeout [default: 3000]
//!   --save                       Write the effective preferences back to the file
//!   --backspace                  Put Backspace where NumLock normally is
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable           | Description                  |
//! |--------------------|------------------------------|
//! | `NUMPAD_HOST`      | Same as `--host`             |
//! | `NUMPAD_TRANSPORT` | Same as `--transport`        |
//! | `RUST_LOG`         | Overrides `app.log_level`    |
//!
//! # Commands
//!
//! One per line on stdin: `connect`, `disconnect`, `status`, `quit`, or a key
//! (`0`-`9`, `/`, `*`, `-`, `+`, `.`, `enter`, `numlock` or `backspace`).
//! Every key is sent as a press followed by a release.  Ctrl+C or end of input
//! disconnects before exiting.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use numpad_core::{NumpadKey, StatusTone};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use numpad_remote::application::coordinator::{ConnectionCoordinator, StatusPresenter, StatusView};
use numpad_remote::infrastructure::connection::mock::{MockOpenOutcome, MockTransportFactory};
use numpad_remote::infrastructure::registry::{TransportRegistry, MOCK_TRANSPORT};
use numpad_remote::infrastructure::storage::{config_file_path, load_config_from, save_config_to, AppConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Remote Numpad.
///
/// Sends numeric keypad keystrokes to a host computer.
#[derive(Debug, Parser)]
#[command(
    name = "numpad-remote",
    about = "Use this terminal as a remote numeric keypad",
    version
)]
struct Cli {
    /// Preferences file to read (and write with `--save`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host name or IP address of the computer to send keys to.
    #[arg(long, env = "NUMPAD_HOST")]
    host: Option<String>,

    /// Transport to use (`socket`, or `mock` for a local demo).
    #[arg(long, env = "NUMPAD_TRANSPORT")]
    transport: Option<String>,

    /// TCP port the host listens on.
    #[arg(long)]
    port: Option<u16>,

    /// How long to wait for a socket connection, in milliseconds.
    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Persist the effective preferences, including any overrides given here.
    #[arg(long)]
    save: bool,

    /// Replace the NumLock key with Backspace.
    #[arg(long)]
    backspace: bool,
}

impl Cli {
    /// Applies the command-line overrides on top of the loaded preferences.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.connection.host = Some(host.clone());
        }
        if let Some(transport) = &self.transport {
            config.connection.transport = transport.clone();
        }
        if let Some(port) = self.port {
            config.socket.port = port;
        }
        if let Some(ms) = self.connect_timeout_ms {
            config.socket.connect_timeout_ms = ms;
        }
    }
}

// ── Stdin commands ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Connect,
    Disconnect,
    Status,
    Quit,
    Key(NumpadKey),
}

/// Parses one line of user input.
///
/// `backspace_layout` selects which of NumLock and Backspace exists on the
/// keypad; the other one is rejected.
fn parse_command(line: &str, backspace_layout: bool) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let command = match line.to_ascii_lowercase().as_str() {
        "connect" => Command::Connect,
        "disconnect" => Command::Disconnect,
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        _ => {
            let key = NumpadKey::parse_user_input(line)
                .ok_or_else(|| format!("unknown command or key: {line:?}"))?;
            if key == missing_key(backspace_layout) {
                return Err(format!("{} is not on this keypad", key.wire_name()));
            }
            Command::Key(key)
        }
    };
    Ok(Some(command))
}

fn missing_key(backspace_layout: bool) -> NumpadKey {
    if backspace_layout {
        NumpadKey::NumLock
    } else {
        NumpadKey::Backspace
    }
}

fn keypad_layout(backspace_layout: bool) -> String {
    let corner = missing_key(!backspace_layout).face();
    format!(
        " {corner:^3} /   *   -\n 7   8   9   +\n 4   5   6\n 1   2   3   ⏎\n 0       .\n"
    )
}

fn render(view: &StatusView) -> String {
    let marker = match view.status.tone() {
        StatusTone::Idle => "○",
        StatusTone::Working => "◌",
        StatusTone::Failed => "✗",
        StatusTone::Connected => "●",
    };
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    format!(
        "{marker} {}  (connect: {}, disconnect: {})",
        view.status.label(),
        on_off(view.connect_enabled),
        on_off(view.disconnect_enabled)
    )
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Preferences ───────────────────────────────────────────────────────────
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config_file_path().context("locating the preferences file")?,
    };
    let mut config = load_config_from(&config_path)
        .with_context(|| format!("loading preferences from {}", config_path.display()))?;
    cli.apply_overrides(&mut config);

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `RUST_LOG` wins; otherwise the configured level applies.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.app.log_level)),
        )
        .init();

    if cli.save {
        save_config_to(&config_path, &config)
            .with_context(|| format!("saving preferences to {}", config_path.display()))?;
        info!(path = %config_path.display(), "preferences saved");
    }

    // ── Transports ────────────────────────────────────────────────────────────
    let mut registry = TransportRegistry::with_socket(config.socket.to_socket_config());
    if config.connection.transport.trim().eq_ignore_ascii_case(MOCK_TRANSPORT) {
        registry.register(
            MOCK_TRANSPORT,
            Arc::new(MockTransportFactory::new(MockOpenOutcome::Connect)),
        );
    }

    let presenter: Arc<dyn StatusPresenter> = Arc::new(|view: StatusView| {
        println!("{}", render(&view));
    });
    let coordinator = ConnectionCoordinator::new(registry, presenter);
    let sender = coordinator.key_sender();

    info!(
        transport = %config.connection.transport,
        host = config.connection.host.as_deref().unwrap_or("<none>"),
        "remote numpad starting"
    );
    print!("{}", keypad_layout(cli.backspace));
    println!("{}", render(&coordinator.view()));

    let host = config.connection.host.clone().unwrap_or_default();
    let transport = config.connection.transport.clone();

    // Connect straight away when a host is already chosen.
    if !host.trim().is_empty() {
        if let Err(e) = coordinator.connect(&host, &transport).await {
            warn!("not connecting: {e}");
        }
    }

    // ── Main input loop ───────────────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!("failed to read stdin: {e}");
                        break;
                    }
                };

                match parse_command(&line, cli.backspace) {
                    Ok(None) => {}
                    Ok(Some(Command::Connect)) => {
                        if let Err(e) = coordinator.connect(&host, &transport).await {
                            println!("cannot connect: {e}");
                        }
                    }
                    Ok(Some(Command::Disconnect)) => coordinator.disconnect().await,
                    Ok(Some(Command::Status)) => println!("{}", render(&coordinator.view())),
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Key(key))) => {
                        if !sender.press(key).await {
                            println!("{} not sent", key.face());
                        }
                    }
                    Err(message) => println!("{message}"),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("failed to listen for Ctrl+C signal: {e}");
                }
                info!("received Ctrl+C, shutting down");
                break;
            }
        }
    }

    coordinator.disconnect().await;
    info!("remote numpad stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use numpad_core::ConnectionStatus;

    #[test]
    fn test_cli_defaults_leave_config_untouched() {
        // Arrange
        let cli = Cli::parse_from(["numpad-remote"]);
        let mut config = AppConfig::default();

        // Act
        cli.apply_overrides(&mut config);

        // Assert
        assert_eq!(config, AppConfig::default());
        assert!(!cli.save);
        assert!(!cli.backspace);
    }

    #[test]
    fn test_cli_overrides_apply_to_config() {
        // Arrange
        let cli = Cli::parse_from([
            "numpad-remote",
            "--host",
            "192.168.1.20",
            "--transport",
            "mock",
            "--port",
            "5000",
            "--connect-timeout-ms",
            "750",
        ]);
        let mut config = AppConfig::default();

        // Act
        cli.apply_overrides(&mut config);

        // Assert
        assert_eq!(config.connection.host.as_deref(), Some("192.168.1.20"));
        assert_eq!(config.connection.transport, "mock");
        assert_eq!(config.socket.port, 5000);
        assert_eq!(config.socket.connect_timeout_ms, 750);
    }

    #[test]
    fn test_cli_config_path_and_flags() {
        let cli = Cli::parse_from(["numpad-remote", "--config", "/tmp/np.toml", "--save", "--backspace"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/np.toml")));
        assert!(cli.save);
        assert!(cli.backspace);
    }

    #[test]
    fn test_parse_control_commands() {
        assert_eq!(parse_command("connect", false), Ok(Some(Command::Connect)));
        assert_eq!(parse_command(" Disconnect ", false), Ok(Some(Command::Disconnect)));
        assert_eq!(parse_command("status", false), Ok(Some(Command::Status)));
        assert_eq!(parse_command("quit", false), Ok(Some(Command::Quit)));
        assert_eq!(parse_command("   ", false), Ok(None));
    }

    #[test]
    fn test_parse_keys_by_face_and_name() {
        assert_eq!(parse_command("7", false), Ok(Some(Command::Key(NumpadKey::Digit7))));
        assert_eq!(parse_command("-", false), Ok(Some(Command::Key(NumpadKey::Subtract))));
        assert_eq!(parse_command("enter", false), Ok(Some(Command::Key(NumpadKey::Enter))));
        assert_eq!(parse_command("numlock", false), Ok(Some(Command::Key(NumpadKey::NumLock))));
    }

    #[test]
    fn test_layout_decides_numlock_or_backspace() {
        assert!(parse_command("backspace", false).is_err());
        assert!(parse_command("numlock", true).is_err());
        assert_eq!(
            parse_command("backspace", true),
            Ok(Some(Command::Key(NumpadKey::Backspace)))
        );
    }

    #[test]
    fn test_unknown_input_is_rejected() {
        assert!(parse_command("hello", false).is_err());
    }

    #[test]
    fn test_keypad_layout_shows_selected_corner_key() {
        assert!(keypad_layout(false).contains("Num"));
        assert!(keypad_layout(true).contains('⌫'));
    }

    #[test]
    fn test_render_shows_label_and_controls() {
        let view = StatusView {
            status: ConnectionStatus::CouldNotConnect,
            connect_enabled: false,
            disconnect_enabled: false,
        };
        assert_eq!(
            render(&view),
            "✗ Could not connect  (connect: off, disconnect: off)"
        );
    }
}
