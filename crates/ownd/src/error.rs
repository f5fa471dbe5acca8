//! CLI error types with miette diagnostics.
//!
//! Maps `ownd_api::Error` and configuration failures into user-facing
//! errors with actionable help text.

use miette::Diagnostic;
use ownd_api::NegotiationFailure;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to gateway at {endpoint}")]
    #[diagnostic(
        code(ownd::connection_failed),
        help(
            "Check that the gateway is powered and reachable, and that this\n\
             host is allowed in its OpenWebNet IP range.\n\
             Try: ownd test --address {endpoint}"
        )
    )]
    ConnectionFailed {
        endpoint: String,
        #[source]
        source: ownd_api::Error,
    },

    #[error("Gateway at {endpoint} did not answer in time")]
    #[diagnostic(code(ownd::timeout))]
    Timeout { endpoint: String },

    // ── Negotiation ──────────────────────────────────────────────────
    #[error("Authentication with {endpoint} failed: {failure}")]
    #[diagnostic(
        code(ownd::auth_failed),
        help(
            "Set the gateway password with --password, the OWND_PASSWORD\n\
             variable, or the profile's `password` / `password_env` keys.\n\
             Legacy gateways only accept numeric passwords."
        )
    )]
    AuthFailed {
        endpoint: String,
        failure: NegotiationFailure,
    },

    #[error("Gateway at {endpoint} refused the session: {failure}")]
    #[diagnostic(code(ownd::negotiation_failed))]
    NegotiationFailed {
        endpoint: String,
        failure: NegotiationFailure,
    },

    // ── Commands ─────────────────────────────────────────────────────
    #[error("Gateway rejected {count} frame(s)")]
    #[diagnostic(
        code(ownd::rejected),
        help("The gateway answered NACK twice. Check the WHERE address and the frame syntax.")
    )]
    Rejected { count: usize },

    #[error("Not a valid OpenWebNet frame: {frame}")]
    #[diagnostic(code(ownd::invalid_frame), help("Frames look like '*1*1*12##'."))]
    InvalidFrame {
        frame: String,
        #[source]
        source: ownd_core::FrameError,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ownd::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No gateway configured")]
    #[diagnostic(
        code(ownd::no_config),
        help(
            "Pass --address, set OWND_ADDRESS, or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ownd::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(ownd::config))]
    Config(#[from] ownd_config::ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(ownd::io))]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(ownd::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NegotiationFailed { .. } | Self::Rejected { .. } => exit_code::REJECTED,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidFrame { .. } | Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// A failed negotiation, split by whether credentials are to blame.
    pub fn negotiation(endpoint: &impl ToString, failure: NegotiationFailure) -> Self {
        let endpoint = endpoint.to_string();
        if failure.is_auth_failure() {
            Self::AuthFailed { endpoint, failure }
        } else {
            Self::NegotiationFailed { endpoint, failure }
        }
    }

    /// Wrap a session error for the gateway at `endpoint`.
    pub fn session(endpoint: &impl ToString, err: ownd_api::Error) -> Self {
        match err {
            ownd_api::Error::Negotiation(failure) => Self::negotiation(endpoint, failure),
            ownd_api::Error::Timeout(_) => Self::Timeout {
                endpoint: endpoint.to_string(),
            },
            source => Self::ConnectionFailed {
                endpoint: endpoint.to_string(),
                source,
            },
        }
    }
}
