//! Session-open handshake.
//!
//! ```text
//! client                      gateway
//!   *99*0## / *99*1##  ──▶
//!                      ◀──   *#*1##            (always)
//!                      ◀──   *#*1##            open, no password
//!                            *#<nonce>##       legacy password
//!                            *98*<1|2>##       HMAC
//!                            *#*0##            refused
//! ```
//!
//! Exchanges are strictly sequential; nothing is retried within one
//! handshake. Connection faults surface as [`Error`], authentication
//! results as a [`NegotiationOutcome`].

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use ownd_core::frame::{Parsed, Signal, classify};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;

use crate::auth::{HashAlgorithm, hmac, password};
use crate::codec::FrameCodec;
use crate::error::Error;

// ── Session kind ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionKind {
    Command,
    Event,
    /// One-shot connection check; opens like an event session.
    Test,
}

impl SessionKind {
    /// Frame that opens a session of this kind.
    pub fn open_frame(self) -> &'static str {
        match self {
            Self::Command => Signal::COMMAND_SESSION,
            Self::Event | Self::Test => Signal::EVENT_SESSION,
        }
    }
}

// ── Outcome ─────────────────────────────────────────────────────────

/// Why a handshake ended without a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NegotiationFailure {
    /// The gateway did not acknowledge the session request.
    ConnectionRefused,
    /// The gateway explicitly rejected the session.
    NegotiationRefused,
    /// An unexpected frame arrived mid-handshake.
    NegotiationFailed,
    /// The gateway's HMAC proof did not match ours.
    NegotiationError,
    /// The gateway wants a password and none is configured.
    PasswordRequired,
    /// The gateway rejected the password.
    PasswordError,
    /// HMAC challenge with an unknown hash code.
    UnsupportedAuthentication,
}

impl NegotiationFailure {
    pub fn is_auth_failure(self) -> bool {
        matches!(
            self,
            Self::PasswordRequired | Self::PasswordError | Self::NegotiationError
        )
    }
}

/// How the gateway authenticated the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Authentication {
    Open,
    Password,
    Hmac(#[serde(serialize_with = "serialize_algorithm")] HashAlgorithm),
}

fn serialize_algorithm<S: serde::Serializer>(
    algorithm: &HashAlgorithm,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(algorithm)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum NegotiationOutcome {
    Ready(Authentication),
    Failed(NegotiationFailure),
}

impl NegotiationOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn failure(&self) -> Option<NegotiationFailure> {
        match self {
            Self::Ready(_) => None,
            Self::Failed(failure) => Some(*failure),
        }
    }
}

// ── Handshake ───────────────────────────────────────────────────────

/// Progress callback, so the session can publish `Authenticating`.
pub(crate) trait Progress {
    fn authenticating(&self);
}

impl Progress for () {
    fn authenticating(&self) {}
}

type Outcome = Result<NegotiationOutcome, Error>;

fn failed(failure: NegotiationFailure) -> Outcome {
    Ok(NegotiationOutcome::Failed(failure))
}

pub(crate) async fn send<S>(framed: &mut Framed<S, FrameCodec>, frame: &str) -> Result<(), Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    tracing::trace!(frame, "→");
    framed.send(frame).await
}

pub(crate) async fn recv<S>(framed: &mut Framed<S, FrameCodec>) -> Result<String, Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let frame = framed.next().await.ok_or(Error::Truncated)??;
    tracing::trace!(frame = %frame, "←");
    Ok(frame)
}

async fn recv_within<S>(framed: &mut Framed<S, FrameCodec>, limit: Duration) -> Result<String, Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    tokio::time::timeout(limit, recv(framed))
        .await
        .map_err(|_| Error::Timeout(limit))?
}

/// Signal carried by `frame`, if it is one.
pub(crate) fn signal(frame: &str) -> Option<Signal> {
    match classify(frame) {
        Ok(Parsed::Signal(signal)) => Some(signal),
        _ => None,
    }
}

/// Run the session-open handshake on a fresh connection.
pub(crate) async fn negotiate<S, P>(
    framed: &mut Framed<S, FrameCodec>,
    kind: SessionKind,
    password: Option<&SecretString>,
    timeout: Duration,
    progress: &P,
) -> Outcome
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: Progress,
{
    send(framed, kind.open_frame()).await?;

    let first = recv_within(framed, timeout).await?;
    if signal(&first) != Some(Signal::Ack) {
        tracing::debug!(frame = %first, "session request not acknowledged");
        // The gateway always answers twice; the second frame tells us why.
        return match recv_within(framed, timeout).await.map(|f| signal(&f)) {
            Ok(Some(Signal::Nack)) => failed(NegotiationFailure::NegotiationRefused),
            Ok(_) | Err(Error::Timeout(_) | Error::Truncated) => {
                failed(NegotiationFailure::ConnectionRefused)
            }
            Err(e) => Err(e),
        };
    }

    let second = recv_within(framed, timeout).await?;
    match signal(&second) {
        Some(Signal::Ack) => {
            tracing::debug!("gateway accepted session without authentication");
            Ok(NegotiationOutcome::Ready(Authentication::Open))
        }
        Some(Signal::Nack) => {
            tracing::debug!("gateway refused session");
            failed(NegotiationFailure::NegotiationRefused)
        }
        Some(Signal::Nonce(nonce)) => {
            progress.authenticating();
            legacy(framed, &nonce, password, timeout).await
        }
        Some(Signal::ShaChallenge(code)) => {
            progress.authenticating();
            let Some(algorithm) = HashAlgorithm::from_challenge(code) else {
                tracing::error!(code, "unsupported HMAC algorithm");
                return failed(NegotiationFailure::UnsupportedAuthentication);
            };
            hmac_exchange(framed, algorithm, password, timeout).await
        }
        _ => {
            tracing::warn!(frame = %second, "unexpected frame during negotiation");
            failed(NegotiationFailure::NegotiationFailed)
        }
    }
}

async fn legacy<S>(
    framed: &mut Framed<S, FrameCodec>,
    nonce: &str,
    password: Option<&SecretString>,
    timeout: Duration,
) -> Outcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    tracing::debug!("gateway requested legacy password authentication");
    let Some(password) = password else {
        tracing::error!("gateway requires a password, none configured");
        return failed(NegotiationFailure::PasswordError);
    };
    let Some(numeric) = password::parse_password(password.expose_secret()) else {
        tracing::error!("legacy gateways only accept numeric passwords");
        return failed(NegotiationFailure::PasswordError);
    };

    let digest = password::digest(numeric, nonce);
    send(framed, &format!("*#{digest}##")).await?;

    let reply = recv_within(framed, timeout).await?;
    match signal(&reply) {
        Some(Signal::Ack) => {
            tracing::debug!("password accepted");
            Ok(NegotiationOutcome::Ready(Authentication::Password))
        }
        Some(Signal::Nack) => {
            tracing::error!("gateway rejected the password");
            failed(NegotiationFailure::PasswordError)
        }
        _ => {
            tracing::warn!(frame = %reply, "unexpected reply to password digest");
            failed(NegotiationFailure::NegotiationFailed)
        }
    }
}

async fn hmac_exchange<S>(
    framed: &mut Framed<S, FrameCodec>,
    algorithm: HashAlgorithm,
    password: Option<&SecretString>,
    timeout: Duration,
) -> Outcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    tracing::debug!(%algorithm, "gateway requested HMAC authentication");
    let Some(password) = password else {
        tracing::error!("gateway requires a password, none configured");
        send(framed, Signal::NACK).await?;
        return failed(NegotiationFailure::PasswordRequired);
    };
    let password = password.expose_secret();

    send(framed, Signal::ACK).await?;
    let challenge = recv_within(framed, timeout).await?;
    let Some(Signal::Nonce(ra)) = signal(&challenge) else {
        tracing::warn!(frame = %challenge, "expected HMAC nonce");
        return failed(NegotiationFailure::NegotiationFailed);
    };

    let rb = hmac::client_nonce(algorithm);
    let (Some(client), Some(expected)) = (
        hmac::client_digest(algorithm, &ra, &rb, password),
        hmac::server_digest(algorithm, &ra, &rb, password),
    ) else {
        tracing::warn!(nonce = %ra, "malformed HMAC nonce");
        return failed(NegotiationFailure::NegotiationFailed);
    };
    send(framed, &format!("*#{rb}*{client}##")).await?;

    let reply = match recv_within(framed, timeout).await {
        Ok(reply) => reply,
        Err(Error::Timeout(_) | Error::Truncated) => {
            tracing::error!("no answer to HMAC proof, password likely wrong");
            return failed(NegotiationFailure::PasswordError);
        }
        Err(e) => return Err(e),
    };
    match signal(&reply) {
        Some(Signal::Nonce(proof)) if proof == expected => {
            send(framed, Signal::ACK).await?;
            tracing::debug!(%algorithm, "HMAC authentication succeeded");
            Ok(NegotiationOutcome::Ready(Authentication::Hmac(algorithm)))
        }
        Some(Signal::Nonce(_)) => {
            send(framed, Signal::NACK).await?;
            tracing::error!("gateway HMAC proof does not match");
            failed(NegotiationFailure::NegotiationError)
        }
        Some(Signal::Nack) => {
            tracing::error!("gateway rejected the password");
            failed(NegotiationFailure::PasswordError)
        }
        _ => {
            tracing::warn!(frame = %reply, "unexpected reply to HMAC proof");
            failed(NegotiationFailure::NegotiationFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_names_are_snake_case() {
        assert_eq!(
            NegotiationFailure::UnsupportedAuthentication.to_string(),
            "unsupported_authentication"
        );
        assert_eq!(NegotiationFailure::PasswordRequired.to_string(), "password_required");
    }

    #[test]
    fn open_frames() {
        assert_eq!(SessionKind::Command.open_frame(), "*99*0##");
        assert_eq!(SessionKind::Event.open_frame(), "*99*1##");
        assert_eq!(SessionKind::Test.open_frame(), "*99*1##");
    }

    #[test]
    fn outcome_json() {
        let ready = NegotiationOutcome::Ready(Authentication::Hmac(HashAlgorithm::Sha256));
        assert_eq!(
            serde_json::to_value(ready).expect("serializes"),
            serde_json::json!({"result": "ready", "detail": {"hmac": "SHA-256"}})
        );
        let failed = NegotiationOutcome::Failed(NegotiationFailure::PasswordError);
        assert_eq!(failed.failure(), Some(NegotiationFailure::PasswordError));
        assert!(!failed.is_ready());
    }
}
