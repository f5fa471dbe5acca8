//! Burglar alarm (WHO 5).
//!
//! WHERE addresses the whole system (`*` or a single digit for the
//! control panel), a zone (`#N`, with 12 and 15 being the `c` and `f`
//! special zones) or a sensor (`ZS...`, first digit zone, rest sensor).

use serde::Serialize;

use super::{Payload, parse, require_what};
use crate::dispatch::Decoded;
use crate::error::DecodeError;
use crate::frame::ClassifiedMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::FromRepr)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum AlarmState {
    #[strum(serialize = "maintenance")]
    Maintenance = 0,
    #[strum(serialize = "activation")]
    Activation = 1,
    #[strum(serialize = "deactivation")]
    Deactivation = 2,
    #[strum(serialize = "delay end")]
    DelayEnd = 3,
    #[strum(serialize = "system battery fault")]
    SystemBatteryFault = 4,
    #[strum(serialize = "battery ok")]
    BatteryOk = 5,
    #[strum(serialize = "no network")]
    NoNetwork = 6,
    #[strum(serialize = "network present")]
    NetworkPresent = 7,
    #[strum(serialize = "engage")]
    Engage = 8,
    #[strum(serialize = "disengage")]
    Disengage = 9,
    #[strum(serialize = "battery unloads")]
    BatteryUnloads = 10,
    #[strum(serialize = "active zone")]
    ActiveZone = 11,
    #[strum(serialize = "technical alarm")]
    TechnicalAlarm = 12,
    #[strum(serialize = "reset technical alarm")]
    ResetTechnicalAlarm = 13,
    #[strum(serialize = "no reception")]
    NoReception = 14,
    #[strum(serialize = "intrusion alarm")]
    IntrusionAlarm = 15,
    #[strum(serialize = "tampering")]
    Tampering = 16,
    #[strum(serialize = "anti-panic alarm")]
    AntiPanicAlarm = 17,
    #[strum(serialize = "non-active zone")]
    NonActiveZone = 18,
    #[strum(serialize = "start programming")]
    StartProgramming = 26,
    #[strum(serialize = "stop programming")]
    StopProgramming = 27,
    #[strum(serialize = "silent alarm")]
    SilentAlarm = 31,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlarmEvent {
    pub state_code: u32,
    pub state: Option<AlarmState>,
    /// The frame concerns the whole system or the control panel.
    pub system: bool,
    pub zone: Option<String>,
    pub sensor: Option<u32>,
}

impl AlarmEvent {
    pub fn is_active(&self) -> bool {
        matches!(self.state, Some(AlarmState::Activation | AlarmState::ActiveZone))
    }

    pub fn is_engaged(&self) -> bool {
        self.state == Some(AlarmState::Engage)
    }

    pub fn is_alarm(&self) -> bool {
        matches!(
            self.state,
            Some(
                AlarmState::TechnicalAlarm
                    | AlarmState::IntrusionAlarm
                    | AlarmState::Tampering
                    | AlarmState::AntiPanicAlarm
                    | AlarmState::SilentAlarm
            )
        )
    }
}

pub(crate) fn decode(msg: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    let state_code = require_what(msg)?;
    let mut event = AlarmEvent {
        state_code,
        state: AlarmState::from_repr(state_code),
        system: false,
        zone: None,
        sensor: None,
    };

    let where_ = msg.where_();
    let subject = if where_ == "*" {
        event.system = true;
        "System is reporting: ".to_owned()
    } else if let Some(zone) = where_.strip_prefix('#') {
        let zone = match zone {
            "12" => "c",
            "15" => "f",
            other => other,
        };
        event.zone = Some(zone.to_owned());
        format!("Zone {zone} is reporting: ")
    } else if where_.len() > 1 {
        let (zone, sensor) = where_.split_at(1);
        let sensor: u32 = parse(msg, "sensor", sensor)?;
        event.zone = Some(zone.to_owned());
        event.sensor = Some(sensor);
        if zone == "0" {
            format!("Device {sensor} in input zone is reporting: ")
        } else {
            format!("Sensor {sensor} in zone {zone} is reporting: ")
        }
    } else {
        event.system = true;
        "Control panel is reporting: ".to_owned()
    };

    let state = event
        .state
        .map_or_else(|| format!("unknown ({state_code})"), |s| s.to_string());
    let summary = format!("{subject}'{state}'.");
    Ok(Decoded::new(Payload::Alarm(event), Some(summary)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dispatch::Dispatcher;

    fn alarm(raw: &str) -> (AlarmEvent, String) {
        let msg = Dispatcher::default().decode(raw).expect("decodes");
        let summary = msg.summary().to_owned();
        match msg.into_payload() {
            Payload::Alarm(event) => (event, summary),
            other => panic!("expected alarm, got {other:?}"),
        }
    }

    #[test]
    fn system_engaged() {
        let (event, summary) = alarm("*5*8**##");
        assert!(event.system);
        assert!(event.is_engaged());
        assert_eq!(summary, "System is reporting: 'engage'.");
    }

    #[test]
    fn special_zone_names() {
        let (event, summary) = alarm("*5*15*#12##");
        assert_eq!(event.zone.as_deref(), Some("c"));
        assert!(event.is_alarm());
        assert_eq!(summary, "Zone c is reporting: 'intrusion alarm'.");
    }

    #[test]
    fn sensor_in_zone() {
        let (event, summary) = alarm("*5*11*34##");
        assert_eq!(event.zone.as_deref(), Some("3"));
        assert_eq!(event.sensor, Some(4));
        assert!(event.is_active());
        assert_eq!(summary, "Sensor 4 in zone 3 is reporting: 'active zone'.");

        let (_, summary) = alarm("*5*16*05##");
        assert_eq!(summary, "Device 5 in input zone is reporting: 'tampering'.");
    }

    #[test]
    fn control_panel_and_unknown_state() {
        let (event, summary) = alarm("*5*40*1##");
        assert!(event.system);
        assert_eq!(event.state, None);
        assert_eq!(summary, "Control panel is reporting: 'unknown (40)'.");
    }
}
