//! Dry contacts and IR sensors (WHO 25, WHERE `3N`).

use serde::Serialize;

use super::{Payload, parse, require_what};
use crate::dispatch::Decoded;
use crate::error::DecodeError;
use crate::frame::ClassifiedMessage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DryContactEvent {
    pub sensor: String,
    pub is_on: bool,
    /// Spontaneous detection rather than the reply to a status request.
    pub is_detection: bool,
}

pub(crate) fn decode(msg: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    let what = require_what(msg)?;
    let detection: u32 = match msg.what_params().first() {
        Some(raw) => parse(msg, "detection", raw)?,
        None => {
            return Err(DecodeError::MissingField {
                who: msg.who(),
                field: "detection",
            });
        }
    };
    let event = DryContactEvent {
        sensor: msg.where_().get(1..).unwrap_or_default().to_owned(),
        is_on: what == 31,
        is_detection: detection == 1,
    };
    let verb = if event.is_detection { "detected" } else { "reported" };
    let state = if event.is_on { "ON" } else { "OFF" };
    let summary = format!("Sensor {} {verb} {state}.", event.sensor);
    Ok(Decoded::new(Payload::DryContact(event), Some(summary)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dispatch::Dispatcher;

    #[test]
    fn detection_and_status_reply() {
        let msg = Dispatcher::default().decode("*25*31#1*315##").expect("decodes");
        assert_eq!(msg.summary(), "Sensor 15 detected ON.");
        assert_eq!(
            msg.payload(),
            &Payload::DryContact(DryContactEvent {
                sensor: "15".into(),
                is_on: true,
                is_detection: true,
            })
        );

        let msg = Dispatcher::default().decode("*25*32#0*315##").expect("decodes");
        assert_eq!(msg.summary(), "Sensor 15 reported OFF.");
    }

    #[test]
    fn missing_detection_flag() {
        assert!(Dispatcher::default().decode("*25*31*315##").is_err());
    }
}
