//! Host address validation.
//!
//! Each transport decides what a well-formed address looks like.  Validation
//! is purely syntactic (no DNS lookup, no device scan) and runs before any
//! resource is allocated for an attempt.

use std::net::IpAddr;

/// Maximum length of a DNS host name (RFC 1123).
const MAX_HOSTNAME_LEN: usize = 253;

/// Maximum length of a single DNS label.
const MAX_LABEL_LEN: usize = 63;

/// Transport-specific syntactic check on a host address string.
pub trait HostValidator: Send + Sync {
    /// Returns `true` if `host` is worth attempting a connection to.
    fn is_host_valid(&self, host: &str) -> bool;
}

/// Validator for the socket transport: an IP address or an RFC 1123 host name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SocketHostValidator;

impl HostValidator for SocketHostValidator {
    fn is_host_valid(&self, host: &str) -> bool {
        let host = host.trim();
        if host.is_empty() {
            return false;
        }
        host.parse::<IpAddr>().is_ok() || is_valid_hostname(host)
    }
}

fn is_valid_hostname(host: &str) -> bool {
    // A single trailing dot denotes the DNS root and is allowed.
    let host = host.strip_suffix('.').unwrap_or(host);
    if host.is_empty() || host.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if !labels.iter().all(|l| is_valid_label(l)) {
        return false;
    }

    // An all-numeric last label would make "10.0.0.300" look like a name.
    labels
        .last()
        .map_or(false, |tld| !tld.chars().all(|c| c.is_ascii_digit()))
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

// ── Tests ─────────────────────────────────────────────────────────────────────
