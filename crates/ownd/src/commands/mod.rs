//! Command handlers, one module per subcommand.

pub mod config_cmd;
pub mod decode;
pub mod listen;
pub mod send;

use ownd_api::{Authentication, GatewayEndpoint, NegotiationOutcome};

use crate::error::CliError;

/// Turn a session's `connect` result into the authentication it used.
pub(crate) fn ready(
    endpoint: &GatewayEndpoint,
    result: Result<NegotiationOutcome, ownd_api::Error>,
) -> Result<Authentication, CliError> {
    match result.map_err(|e| CliError::session(endpoint, e))? {
        NegotiationOutcome::Ready(auth) => Ok(auth),
        NegotiationOutcome::Failed(failure) => Err(CliError::negotiation(endpoint, failure)),
    }
}

pub(crate) fn describe_auth(auth: Authentication) -> String {
    match auth {
        Authentication::Open => "no password".into(),
        Authentication::Password => "legacy password".into(),
        Authentication::Hmac(algorithm) => format!("HMAC {algorithm}"),
    }
}
