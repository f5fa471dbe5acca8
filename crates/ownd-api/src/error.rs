use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::negotiate::NegotiationFailure;

/// Top-level error type for the `ownd-api` crate.
///
/// Connection-level faults (refused, reset, truncated) are normally handled
/// inside the session runtime by reconnecting; callers only see them once
/// the retry budget is spent or when they drive a single attempt themselves.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// The gateway refused the TCP connection.
    #[error("Connection refused: {0}")]
    ConnectionRefused(#[source] io::Error),

    /// The gateway reset an established connection.
    #[error("Connection reset by gateway")]
    ConnectionReset,

    /// The stream ended before a complete frame arrived.
    #[error("Stream ended in the middle of a frame")]
    Truncated,

    /// A read did not complete in time.
    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// An operation needed an open session.
    #[error("Session is not connected")]
    NotConnected,

    /// The reconnect budget was spent.
    #[error("Gave up after {attempts} failed connection attempts")]
    RetriesExhausted { attempts: u32 },

    /// Any other socket error.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    // ── Protocol ────────────────────────────────────────────────────
    /// The handshake ended without a usable session.
    #[error("Negotiation failed: {0}")]
    Negotiation(NegotiationFailure),

    /// Inbound bytes that can never form a frame.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    // ── Discovery ───────────────────────────────────────────────────
    /// No gateway matched the discovery hint.
    #[error("Gateway discovery failed: {0}")]
    Discovery(String),
}

/// Connection-level faults the session runtime recovers from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionFault {
    Refused,
    Reset,
    Truncated,
}

impl Error {
    /// The recoverable fault this error represents, if any.
    pub fn fault(&self) -> Option<ConnectionFault> {
        match self {
            Self::ConnectionRefused(_) => Some(ConnectionFault::Refused),
            Self::ConnectionReset => Some(ConnectionFault::Reset),
            Self::Truncated => Some(ConnectionFault::Truncated),
            _ => None,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        self.fault().is_some() || matches!(self, Self::Timeout(_))
    }

    /// Returns `true` if the gateway rejected our credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Negotiation(failure) if failure.is_auth_failure())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => Self::ConnectionRefused(err),
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                Self::ConnectionReset
            }
            io::ErrorKind::UnexpectedEof | io::ErrorKind::BrokenPipe => Self::Truncated,
            io::ErrorKind::TimedOut => Self::Timeout(Duration::ZERO),
            _ => Self::Io(err),
        }
    }
}

impl From<NegotiationFailure> for Error {
    fn from(failure: NegotiationFailure) -> Self {
        Self::Negotiation(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_kinds_map_to_faults() {
        let refused: Error = io::Error::from(io::ErrorKind::ConnectionRefused).into();
        assert_eq!(refused.fault(), Some(ConnectionFault::Refused));

        let reset: Error = io::Error::from(io::ErrorKind::ConnectionReset).into();
        assert_eq!(reset.fault(), Some(ConnectionFault::Reset));

        let eof: Error = io::Error::from(io::ErrorKind::UnexpectedEof).into();
        assert_eq!(eof.fault(), Some(ConnectionFault::Truncated));

        let other: Error = io::Error::from(io::ErrorKind::PermissionDenied).into();
        assert!(other.fault().is_none());
        assert!(!other.is_transient());
    }

    #[test]
    fn auth_failures() {
        assert!(Error::Negotiation(NegotiationFailure::PasswordError).is_auth_failure());
        assert!(!Error::Negotiation(NegotiationFailure::NegotiationRefused).is_auth_failure());
        assert!(!Error::ConnectionReset.is_auth_failure());
    }
}
