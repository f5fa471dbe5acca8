//! `ownd send`: write frames over a command session.

use ownd_api::{CommandSession, GatewayEndpoint, RetryPolicy, SendOutcome};
use ownd_core::{FrameError, Parsed, classify};
use serde::Serialize;

use crate::cli::{GlobalOpts, SendArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Sent<'a> {
    frame: &'a str,
    outcome: &'static str,
}

/// Reject anything that is not a bus message before connecting.
fn validate(frames: &[String]) -> Result<(), CliError> {
    for frame in frames {
        match classify(frame) {
            Ok(Parsed::Message(_)) => {}
            Ok(Parsed::Signal(signal)) => {
                return Err(CliError::InvalidFrame {
                    frame: frame.clone(),
                    source: FrameError::Signal(signal),
                });
            }
            Err(e) => {
                return Err(CliError::InvalidFrame {
                    frame: frame.clone(),
                    source: e.into(),
                });
            }
        }
    }
    Ok(())
}

pub async fn handle(
    args: SendArgs,
    endpoint: GatewayEndpoint,
    policy: RetryPolicy,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    validate(&args.frames)?;

    let mut session = CommandSession::new(endpoint.clone()).with_policy(policy);
    super::ready(&endpoint, session.connect().await)?;

    let mut rejected = 0;
    for frame in &args.frames {
        let outcome = match session.send(frame).await {
            Ok(outcome) => outcome,
            Err(e) => {
                session.close().await;
                return Err(CliError::session(&endpoint, e));
            }
        };
        let sent = Sent {
            frame,
            outcome: match outcome {
                SendOutcome::Acked => "acked",
                SendOutcome::Nacked => {
                    rejected += 1;
                    "nacked"
                }
            },
        };
        let line = output::render(global.output, &sent, |s| format!("{:<6} {}", s.outcome, s.frame))?;
        output::print_output(&line, global.quiet)?;
    }

    session.close().await;
    if rejected > 0 {
        return Err(CliError::Rejected { count: rejected });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_accepts_messages_only() {
        assert!(validate(&["*1*1*12##".into(), "*#4*12##".into()]).is_ok());
        assert!(matches!(
            validate(&["*#*1##".into()]),
            Err(CliError::InvalidFrame {
                source: FrameError::Signal(_),
                ..
            })
        ));
        assert!(matches!(
            validate(&["*1*1*12".into()]),
            Err(CliError::InvalidFrame {
                source: FrameError::Classify(_),
                ..
            })
        ));
    }
}
