//! Scenario (WHO 0): scenario launches from a control panel.

use serde::Serialize;

use super::{Payload, require_what};
use crate::dispatch::Decoded;
use crate::error::DecodeError;
use crate::frame::ClassifiedMessage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioEvent {
    pub scenario: u32,
    pub control_panel: String,
}

pub(crate) fn decode(msg: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    let event = ScenarioEvent {
        scenario: require_what(msg)?,
        control_panel: msg.where_().to_owned(),
    };
    let summary = format!(
        "Scenario {} from control panel {} has been launched.",
        event.scenario, event.control_panel
    );
    Ok(Decoded::new(Payload::Scenario(event), Some(summary)))
}
