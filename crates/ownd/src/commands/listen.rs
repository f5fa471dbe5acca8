//! `ownd listen`: stream decoded bus events until interrupted.

use ownd_api::{EventSession, GatewayEndpoint, RetryPolicy};
use ownd_core::OwnMessage;

use crate::cli::{GlobalOpts, ListenArgs};
use crate::error::CliError;
use crate::output;

impl ListenArgs {
    fn matches(&self, msg: &OwnMessage) -> bool {
        (self.who.is_empty() || self.who.contains(&msg.who()))
            && (self.where_.is_empty() || self.where_.iter().any(|w| w == msg.where_()))
    }
}

pub async fn handle(
    args: ListenArgs,
    endpoint: GatewayEndpoint,
    policy: RetryPolicy,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut events = EventSession::new(endpoint.clone()).with_policy(policy);
    let auth = super::ready(&endpoint, events.connect().await)?;
    tracing::info!(gateway = %endpoint, auth = %super::describe_auth(auth), "Listening for events");

    let mut seen = 0_usize;
    loop {
        let next = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = events.get_next() => next,
        };
        let Some(msg) = next.map_err(|e| CliError::session(&endpoint, e))? else {
            continue;
        };
        if !args.matches(&msg) {
            continue;
        }

        let line = output::render(global.output, &msg, |m| {
            format!("{:<24} {}", m.entity_id().as_str(), m.summary())
        })?;
        output::print_output(&line, global.quiet)?;

        seen += 1;
        if args.count.is_some_and(|limit| seen >= limit) {
            break;
        }
    }

    events.close().await;
    Ok(())
}
