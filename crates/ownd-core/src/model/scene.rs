//! Scenes (WHO 17), as programmed on MH202/F420 scenario modules.

use serde::Serialize;

use super::{Payload, require_what};
use crate::dispatch::Decoded;
use crate::error::DecodeError;
use crate::frame::ClassifiedMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::FromRepr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[repr(u32)]
pub enum SceneState {
    Started = 1,
    Stopped = 2,
    Enabled = 3,
    Disabled = 4,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneEvent {
    pub scene: String,
    pub state_code: u32,
    pub state: Option<SceneState>,
}

impl SceneEvent {
    /// `Some(true)` when started, `Some(false)` when stopped.
    pub fn is_on(&self) -> Option<bool> {
        match self.state? {
            SceneState::Started => Some(true),
            SceneState::Stopped => Some(false),
            SceneState::Enabled | SceneState::Disabled => None,
        }
    }

    pub fn is_enabled(&self) -> Option<bool> {
        match self.state? {
            SceneState::Enabled => Some(true),
            SceneState::Disabled => Some(false),
            SceneState::Started | SceneState::Stopped => None,
        }
    }
}

pub(crate) fn decode(msg: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    let state_code = require_what(msg)?;
    let event = SceneEvent {
        scene: msg.where_().to_owned(),
        state_code,
        state: SceneState::from_repr(state_code),
    };
    let status = event
        .state
        .map_or_else(|| format!("unknown ({state_code})"), |s| s.to_string());
    let summary = format!("Scene {} is {status}.", event.scene);
    Ok(Decoded::new(Payload::Scene(event), Some(summary)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;

    #[test]
    fn scene_lifecycle() {
        let msg = Dispatcher::default().decode("*17*1*4##").expect("decodes");
        assert_eq!(msg.summary(), "Scene 4 is started.");
        let Payload::Scene(event) = msg.payload() else {
            panic!("expected scene");
        };
        assert_eq!(event.is_on(), Some(true));
        assert_eq!(event.is_enabled(), None);

        let msg = Dispatcher::default().decode("*17*4*4##").expect("decodes");
        assert_eq!(msg.summary(), "Scene 4 is disabled.");
    }
}
