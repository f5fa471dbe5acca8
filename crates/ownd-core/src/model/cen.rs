//! Scenario push buttons: CEN (WHO 15) and CEN+ (WHO 25, WHERE `2N`).

use serde::Serialize;

use super::{Payload, interface_text, parse, require_what};
use crate::dispatch::Decoded;
use crate::error::DecodeError;
use crate::frame::ClassifiedMessage;

// ── CEN ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CenAction {
    Pressed,
    Held,
    ReleasedShort,
    ReleasedLong,
    Unknown(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CenEvent {
    pub object: String,
    pub push_button: u32,
    pub action: CenAction,
}

pub(crate) fn decode_cen(msg: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    let push_button = require_what(msg)?;
    let action = match msg.what_params().first() {
        None => CenAction::Pressed,
        Some(raw) => match parse::<u32>(msg, "button state", raw)? {
            3 => CenAction::Held,
            1 => CenAction::ReleasedShort,
            2 => CenAction::ReleasedLong,
            other => CenAction::Unknown(other),
        },
    };
    let event = CenEvent {
        object: msg.where_().to_owned(),
        push_button,
        action,
    };

    let button = format!(
        "Button {push_button} of CEN object {}{}",
        event.object,
        interface_text(msg)
    );
    let summary = match action {
        CenAction::Pressed => Some(format!("{button} has been pressed.")),
        CenAction::Held => Some(format!("{button} is being held pressed.")),
        CenAction::ReleasedShort => Some(format!("{button} has been released after a short press.")),
        CenAction::ReleasedLong => Some(format!("{button} has been released after a long press.")),
        CenAction::Unknown(_) => None,
    };
    Ok(Decoded::new(Payload::Cen(event), summary))
}

// ── CEN+ ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::FromRepr)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum CenPlusAction {
    ShortPressed = 21,
    Held = 22,
    StillHeld = 23,
    Released = 24,
    SlowlyRotatedClockwise = 25,
    QuicklyRotatedClockwise = 26,
    SlowlyRotatedCounterClockwise = 27,
    QuicklyRotatedCounterClockwise = 28,
}

impl CenPlusAction {
    fn describe(self) -> &'static str {
        match self {
            Self::ShortPressed => "has been pressed",
            Self::Held => "is being held pressed",
            Self::StillHeld => "is still being held pressed",
            Self::Released => "has been released",
            Self::SlowlyRotatedClockwise => "has been slowly rotated clockwise",
            Self::QuicklyRotatedClockwise => "has been quickly rotated clockwise",
            Self::SlowlyRotatedCounterClockwise => "has been slowly rotated counter-clockwise",
            Self::QuicklyRotatedCounterClockwise => "has been quickly rotated counter-clockwise",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CenPlusEvent {
    pub object: String,
    pub push_button: u32,
    pub state_code: u32,
    pub action: Option<CenPlusAction>,
}

pub(crate) fn decode_cen_plus(msg: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    let state_code = require_what(msg)?;
    let push_button: u32 = match msg.what_params().first() {
        Some(raw) => parse(msg, "push button", raw)?,
        None => {
            return Err(DecodeError::MissingField {
                who: msg.who(),
                field: "push button",
            });
        }
    };
    let event = CenPlusEvent {
        object: msg.where_().get(1..).unwrap_or_default().to_owned(),
        push_button,
        state_code,
        action: CenPlusAction::from_repr(state_code),
    };
    let summary = event.action.map(|action| {
        format!(
            "Button {push_button} of CEN+ object {} {}",
            event.object,
            action.describe()
        )
    });
    Ok(Decoded::new(Payload::CenPlus(event), summary))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dispatch::Dispatcher;

    #[test]
    fn cen_press_cycle() {
        let dispatcher = Dispatcher::default();

        let pressed = dispatcher.decode("*15*21*25##").expect("decodes");
        assert_eq!(pressed.summary(), "Button 21 of CEN object 25 has been pressed.");

        let held = dispatcher.decode("*15*21#3*25##").expect("decodes");
        let Payload::Cen(event) = held.payload() else {
            panic!("expected cen");
        };
        assert_eq!(event.action, CenAction::Held);

        let released = dispatcher.decode("*15*21#1*25#4#01##").expect("decodes");
        assert_eq!(
            released.summary(),
            "Button 21 of CEN object 25 on interface 01 has been released after a short press."
        );
    }

    #[test]
    fn cen_plus_rotation() {
        let msg = Dispatcher::default().decode("*25*26#3*212##").expect("decodes");
        assert_eq!(
            msg.payload(),
            &Payload::CenPlus(CenPlusEvent {
                object: "12".into(),
                push_button: 3,
                state_code: 26,
                action: Some(CenPlusAction::QuicklyRotatedClockwise),
            })
        );
        assert_eq!(
            msg.summary(),
            "Button 3 of CEN+ object 12 has been quickly rotated clockwise"
        );
    }
}
