//! Event and command sessions with automatic reconnection.
//!
//! A [`Session`] owns one negotiated connection. [`EventSession`] turns the
//! inbound stream into decoded [`OwnMessage`]s; [`CommandSession`] sends
//! frames and waits for the gateway's acknowledgement. Both reconnect on
//! their own when the gateway drops the connection.
//!
//! ```rust,ignore
//! use ownd_api::{EventSession, GatewayEndpoint};
//!
//! let endpoint = GatewayEndpoint::new("192.168.1.35").with_password("12345");
//! let mut events = EventSession::new(endpoint);
//! events.connect().await?;
//! while let Some(msg) = events.get_next().await.transpose() {
//!     println!("{}", msg?.summary());
//! }
//! ```

use std::fmt;

use futures_util::SinkExt;
use ownd_core::command::Command;
use ownd_core::dispatch::Dispatcher;
use ownd_core::frame::{Parsed, Signal, classify};
use ownd_core::{FrameError, OwnMessage};
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::codec::Framed;
use tracing::{Instrument, Span};

use crate::codec::FrameCodec;
use crate::endpoint::GatewayEndpoint;
use crate::error::{ConnectionFault, Error};
use crate::negotiate::{self, NegotiationOutcome, Progress, SessionKind};
use crate::retry::RetryPolicy;
use crate::transport::{Connector, TcpConnector};

// ── SessionState ────────────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Disconnected,
    Connecting,
    Negotiating,
    Authenticating,
    Ready,
    Failed,
}

impl Progress for watch::Sender<SessionState> {
    fn authenticating(&self) {
        self.send_replace(SessionState::Authenticating);
    }
}

// ── Session ─────────────────────────────────────────────────────────

/// One connection to a gateway, of a fixed [`SessionKind`].
pub struct Session<C: Connector = TcpConnector> {
    endpoint: GatewayEndpoint,
    kind: SessionKind,
    connector: C,
    policy: RetryPolicy,
    span: Span,
    framed: Option<Framed<C::Stream, FrameCodec>>,
    state: watch::Sender<SessionState>,
}

impl Session<TcpConnector> {
    pub fn new(endpoint: GatewayEndpoint, kind: SessionKind) -> Self {
        Self::with_connector(endpoint, kind, TcpConnector)
    }
}

impl<C: Connector> Session<C> {
    pub fn with_connector(endpoint: GatewayEndpoint, kind: SessionKind, connector: C) -> Self {
        let span = tracing::info_span!("session", gateway = %endpoint.log_id(), %kind);
        let (state, _) = watch::channel(SessionState::Disconnected);
        let policy = match kind {
            SessionKind::Test => RetryPolicy::test_connection(),
            SessionKind::Command | SessionKind::Event => RetryPolicy::default(),
        };
        Self {
            endpoint,
            kind,
            connector,
            policy,
            span,
            framed: None,
            state,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Span every I/O future of this session runs in.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn endpoint(&self) -> &GatewayEndpoint {
        &self.endpoint
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Subscribe to state changes.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.framed.is_some()
    }

    /// Open and negotiate a connection, retrying refused and truncated
    /// attempts with backoff. A reset waits [`RetryPolicy::reset_delay`]
    /// and does not count against the budget.
    pub async fn connect(&mut self) -> Result<NegotiationOutcome, Error> {
        let span = self.span.clone();
        self.connect_with_retry().instrument(span).await
    }

    async fn connect_with_retry(&mut self) -> Result<NegotiationOutcome, Error> {
        let mut failures: u32 = 0;
        loop {
            let err = match self.connect_once().await {
                Ok(outcome) => return Ok(outcome),
                Err(e) => e,
            };
            match err.fault() {
                Some(ConnectionFault::Reset) => {
                    let delay = self.policy.reset_delay();
                    tracing::warn!(
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Gateway reset the connection, waiting before reconnect"
                    );
                    tokio::time::sleep(delay).await;
                }
                Some(fault) => {
                    failures += 1;
                    tracing::warn!(error = %err, %fault, attempt = failures, "Connection attempt failed");
                    let Some(delay) = self.policy.delay_after(failures) else {
                        tracing::error!(attempts = failures, "Giving up on gateway");
                        self.state.send_replace(SessionState::Failed);
                        return Err(Error::RetriesExhausted { attempts: failures });
                    };
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::error!(error = %err, "Connection failed");
                    self.state.send_replace(SessionState::Failed);
                    return Err(err);
                }
            }
        }
    }

    /// A single connect + negotiate attempt, no retries.
    async fn connect_once(&mut self) -> Result<NegotiationOutcome, Error> {
        self.framed = None;
        let stream = self.open_stream().await?;
        self.negotiate_on(stream).await
    }

    async fn open_stream(&mut self) -> Result<C::Stream, Error> {
        self.state.send_replace(SessionState::Connecting);
        tracing::debug!(endpoint = %self.endpoint, "Connecting");
        Ok(self.connector.connect(&self.endpoint).await?)
    }

    async fn negotiate_on(&mut self, stream: C::Stream) -> Result<NegotiationOutcome, Error> {
        let mut framed = Framed::new(stream, FrameCodec::new());
        self.state.send_replace(SessionState::Negotiating);
        let outcome = negotiate::negotiate(
            &mut framed,
            self.kind,
            self.endpoint.password.as_ref(),
            self.policy.handshake_timeout(),
            &self.state,
        )
        .await;

        match outcome {
            Ok(NegotiationOutcome::Ready(auth)) => {
                tracing::info!(?auth, "Session ready");
                self.framed = Some(framed);
                self.state.send_replace(SessionState::Ready);
                Ok(NegotiationOutcome::Ready(auth))
            }
            Ok(NegotiationOutcome::Failed(failure)) => {
                tracing::error!(%failure, "Negotiation failed");
                self.state.send_replace(SessionState::Failed);
                Ok(NegotiationOutcome::Failed(failure))
            }
            Err(e) => {
                self.state.send_replace(SessionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Drop the current connection and negotiate a new one.
    pub(crate) async fn reconnect(&mut self) -> Result<(), Error> {
        tracing::info!("Reconnecting");
        match self.connect_with_retry().await? {
            NegotiationOutcome::Ready(_) => Ok(()),
            NegotiationOutcome::Failed(failure) => Err(Error::Negotiation(failure)),
        }
    }

    /// Close the connection. Closing an already closed session is a no-op.
    pub async fn close(&mut self) {
        if let Some(mut framed) = self.framed.take() {
            if let Err(e) = framed.close().instrument(self.span.clone()).await {
                tracing::debug!(parent: &self.span, error = %e, "Error while closing connection");
            }
        }
        self.state.send_replace(SessionState::Disconnected);
    }

    /// Connect-only retries for a connection probe: negotiation runs once.
    async fn probe(&mut self) -> Result<NegotiationOutcome, Error> {
        let mut failures: u32 = 0;
        let stream = loop {
            match self.open_stream().await {
                Ok(stream) => break stream,
                Err(e) if e.fault() == Some(ConnectionFault::Refused) => {
                    failures += 1;
                    tracing::warn!(error = %e, attempt = failures, "Gateway refused connection");
                    let Some(delay) = self.policy.delay_after(failures) else {
                        self.state.send_replace(SessionState::Failed);
                        return Err(Error::RetriesExhausted { attempts: failures });
                    };
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        };
        let outcome = self.negotiate_on(stream).await;
        self.close().await;
        outcome
    }
}

impl<C: Connector> fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("kind", &self.kind)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ── Test connection ─────────────────────────────────────────────────

/// Check that a gateway accepts an event session with the configured
/// credentials, then disconnect.
pub async fn test_gateway(endpoint: GatewayEndpoint) -> Result<NegotiationOutcome, Error> {
    test_gateway_with(endpoint, TcpConnector, RetryPolicy::test_connection()).await
}

pub async fn test_gateway_with<C: Connector>(
    endpoint: GatewayEndpoint,
    connector: C,
    policy: RetryPolicy,
) -> Result<NegotiationOutcome, Error> {
    let mut session =
        Session::with_connector(endpoint, SessionKind::Test, connector).with_policy(policy);
    let span = session.span.clone();
    session.probe().instrument(span).await
}

// ── EventSession ────────────────────────────────────────────────────

/// Stream of decoded bus events.
#[derive(Debug)]
pub struct EventSession<C: Connector = TcpConnector> {
    session: Session<C>,
    dispatcher: Dispatcher,
}

impl EventSession<TcpConnector> {
    pub fn new(endpoint: GatewayEndpoint) -> Self {
        Self::with_connector(endpoint, TcpConnector)
    }
}

impl<C: Connector> EventSession<C> {
    pub fn with_connector(endpoint: GatewayEndpoint, connector: C) -> Self {
        Self {
            session: Session::with_connector(endpoint, SessionKind::Event, connector),
            dispatcher: Dispatcher::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.session = self.session.with_policy(policy);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.session = self.session.with_span(span);
        self
    }

    /// Replace the decoder registry.
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub async fn connect(&mut self) -> Result<NegotiationOutcome, Error> {
        self.session.connect().await
    }

    pub async fn close(&mut self) {
        self.session.close().await;
    }

    /// Wait for the next frame and decode it.
    ///
    /// Returns `Ok(None)` when the frame carried nothing to report: a
    /// signaling frame, a frame that failed to decode, or a dropped
    /// connection that was transparently re-established. Errors only when
    /// reconnecting itself fails.
    pub async fn get_next(&mut self) -> Result<Option<OwnMessage>, Error> {
        let span = self.session.span.clone();
        self.next_message().instrument(span).await
    }

    async fn next_message(&mut self) -> Result<Option<OwnMessage>, Error> {
        let Some(framed) = self.session.framed.as_mut() else {
            return Err(Error::NotConnected);
        };
        let next = negotiate::recv(framed).await;

        let raw = match next {
            Ok(raw) => raw,
            Err(e) if e.fault().is_some() || matches!(e, Error::InvalidFrame(_)) => {
                tracing::warn!(error = %e, "Event stream interrupted");
                self.session.reconnect().await?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match self.dispatcher.decode(&raw) {
            Ok(msg) => {
                tracing::debug!(frame = %raw, summary = msg.summary(), "Event");
                Ok(Some(msg))
            }
            Err(FrameError::Signal(signal)) => {
                tracing::debug!(%signal, "Ignoring signaling frame on event session");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(error = %e, frame = %raw, "Dropping undecodable frame");
                Ok(None)
            }
        }
    }
}

// ── CommandSession ──────────────────────────────────────────────────

/// Gateway verdict on one sent frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SendOutcome {
    Acked,
    /// Rejected twice: the frame and its one retransmission.
    Nacked,
}

/// Sends frames and waits for ACK/NACK.
#[derive(Debug)]
pub struct CommandSession<C: Connector = TcpConnector> {
    session: Session<C>,
}

impl CommandSession<TcpConnector> {
    pub fn new(endpoint: GatewayEndpoint) -> Self {
        Self::with_connector(endpoint, TcpConnector)
    }
}

impl<C: Connector> CommandSession<C> {
    pub fn with_connector(endpoint: GatewayEndpoint, connector: C) -> Self {
        Self {
            session: Session::with_connector(endpoint, SessionKind::Command, connector),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.session = self.session.with_policy(policy);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.session = self.session.with_span(span);
        self
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub async fn connect(&mut self) -> Result<NegotiationOutcome, Error> {
        self.session.connect().await
    }

    pub async fn close(&mut self) {
        self.session.close().await;
    }

    /// Send a built [`Command`], logging its summary.
    pub async fn send_command(&mut self, command: &Command) -> Result<SendOutcome, Error> {
        let span = self.session.span.clone();
        self.send_frame(command.frame(), command.summary(), command.is_status_request())
            .instrument(span)
            .await
    }

    /// Send any frame. A NACK triggers exactly one retransmission; a
    /// dropped connection triggers one reconnect and resend.
    pub async fn send(&mut self, message: impl fmt::Display) -> Result<SendOutcome, Error> {
        let frame = message.to_string();
        let status_request =
            matches!(classify(&frame), Ok(Parsed::Message(m)) if m.is_status_request());
        let span = self.session.span.clone();
        self.send_frame(&frame, &frame, status_request)
            .instrument(span)
            .await
    }

    async fn send_frame(
        &mut self,
        frame: &str,
        summary: &str,
        status_request: bool,
    ) -> Result<SendOutcome, Error> {
        let mut reconnected = false;
        let outcome = loop {
            match self.exchange(frame).await {
                Ok(outcome) => break outcome,
                Err(e) if !reconnected && (e.fault().is_some() || matches!(e, Error::NotConnected)) => {
                    tracing::warn!(error = %e, frame, "Command connection lost, resending");
                    reconnected = true;
                    self.session.reconnect().await?;
                }
                Err(e) => return Err(e),
            }
        };

        match outcome {
            SendOutcome::Acked if status_request => tracing::debug!(frame, "{summary}"),
            SendOutcome::Acked => tracing::info!(frame, "{summary}"),
            SendOutcome::Nacked => tracing::error!(frame, "Gateway rejected command"),
        }
        Ok(outcome)
    }

    /// Write `frame` and read until the gateway acknowledges it.
    async fn exchange(&mut self, frame: &str) -> Result<SendOutcome, Error> {
        let framed = self.session.framed.as_mut().ok_or(Error::NotConnected)?;
        negotiate::send(framed, frame).await?;

        let mut retransmitted = false;
        loop {
            let reply = negotiate::recv(framed).await?;
            match negotiate::signal(&reply) {
                Some(Signal::Ack) => return Ok(SendOutcome::Acked),
                Some(Signal::Nack) if !retransmitted => {
                    tracing::debug!(frame, "NACK received, retransmitting");
                    retransmitted = true;
                    negotiate::send(framed, frame).await?;
                }
                Some(Signal::Nack) => return Ok(SendOutcome::Nacked),
                _ => tracing::debug!(reply = %reply, "Reply data, waiting for acknowledgement"),
            }
        }
    }
}
