//! Auxiliary channels (WHO 9).

use serde::Serialize;

use super::{Payload, require_what};
use crate::dispatch::Decoded;
use crate::error::DecodeError;
use crate::frame::ClassifiedMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::FromRepr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum AuxiliaryState {
    Off = 0,
    On = 1,
    Toggle = 2,
    Stop = 3,
    Up = 4,
    Down = 5,
    Enabled = 6,
    Disabled = 7,
    ResetGen = 8,
    ResetBi = 9,
    ResetTri = 10,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuxiliaryEvent {
    pub channel: String,
    pub state_code: u32,
    pub state: Option<AuxiliaryState>,
}

impl AuxiliaryEvent {
    pub fn is_on(&self) -> bool {
        self.state == Some(AuxiliaryState::On)
    }
}

pub(crate) fn decode(msg: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    let state_code = require_what(msg)?;
    let event = AuxiliaryEvent {
        channel: msg.where_().to_owned(),
        state_code,
        state: AuxiliaryState::from_repr(state_code),
    };
    let summary = event
        .state
        .map(|state| format!("Auxiliary channel {} is set to '{state}'.", event.channel));
    Ok(Decoded::new(Payload::Auxiliary(event), summary))
}
