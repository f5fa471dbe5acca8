//! Heating (WHO 4): thermostats, zone probes, valves and actuators.
//!
//! WHERE is a zone number, optionally `#`-prefixed. Values above 99 carry
//! a secondary sensor index in their first digit (`112` is sensor 1 of
//! zone 12). Zone 0 with a WHERE parameter addresses that zone through
//! the central unit.

use serde::Serialize;

use super::{Payload, parse, parse_value, value};
use crate::dispatch::Decoded;
use crate::error::DecodeError;
use crate::frame::ClassifiedMessage;
use crate::identity::EntityId;

const VALVE_ACTIVE: [&str; 5] = ["1", "2", "6", "7", "8"];
const ACTUATOR_ACTIVE: [&str; 6] = ["1", "2", "6", "7", "8", "9"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HeatingReading {
    Mode,
    ModeTarget,
    MainTemperature,
    SecondaryTemperature,
    TargetTemperature,
    LocalOffset,
    LocalTargetTemperature,
    Action,
    MainHumidity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClimateMode {
    Off,
    Heat,
    Cool,
    Auto,
}

impl ClimateMode {
    /// Operating mode encoded by a heating WHAT, if any.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            102 | 103 | 202 | 203 | 302 | 303 => Some(Self::Off),
            0 | 210 | 211 | 215 | 2101..=2103 | 2201..=2216 => Some(Self::Cool),
            1 | 110 | 111 | 115 | 1101..=1103 | 1201..=1216 => Some(Self::Heat),
            310 | 311 | 315 | 13001..=13255 | 23001..=23255 => Some(Self::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatingEvent {
    #[serde(rename = "where")]
    pub where_: String,
    pub zone: u32,
    pub sensor: Option<u32>,
    pub actuator: Option<String>,
    pub reading: Option<HeatingReading>,
    /// Raw WHAT of a mode frame.
    pub mode_code: Option<u32>,
    pub mode: Option<ClimateMode>,
    /// Degrees Celsius.
    pub target_temperature: Option<f64>,
    pub local_offset: Option<i32>,
    pub local_target_temperature: Option<f64>,
    pub main_temperature: Option<f64>,
    pub secondary_temperature: Option<f64>,
    /// Relative humidity percentage.
    pub main_humidity: Option<f64>,
    pub is_active: Option<bool>,
    pub is_heating: Option<bool>,
    pub is_cooling: Option<bool>,
    pub fan_on: Option<bool>,
    pub fan_speed: Option<u32>,
    pub cooling_fan_on: Option<bool>,
    pub cooling_fan_speed: Option<u32>,
}

impl HeatingEvent {
    fn new(where_: &str, zone: u32, sensor: Option<u32>) -> Self {
        Self {
            where_: where_.to_owned(),
            zone,
            sensor,
            actuator: None,
            reading: None,
            mode_code: None,
            mode: None,
            target_temperature: None,
            local_offset: None,
            local_target_temperature: None,
            main_temperature: None,
            secondary_temperature: None,
            main_humidity: None,
            is_active: None,
            is_heating: None,
            is_cooling: None,
            fan_on: None,
            fan_speed: None,
            cooling_fan_on: None,
            cooling_fan_speed: None,
        }
    }

    /// Secondary probe reading as `(sensor, celsius)`.
    pub fn secondary(&self) -> Option<(u32, f64)> {
        Some((self.sensor?, self.secondary_temperature?))
    }

    /// `4-#0` for the central unit, `4-{where}` for a secondary probe,
    /// `4-{zone}` otherwise.
    pub fn entity_id(&self) -> EntityId {
        if self.zone == 0 {
            EntityId::from("4-#0")
        } else if self.sensor.is_some() {
            EntityId::from(format!("4-{}", self.where_))
        } else {
            EntityId::from(format!("4-{}", self.zone))
        }
    }
}

/// `0TTt` is `TT.t` degrees.
fn temperature(msg: &ClassifiedMessage, raw: &str) -> Result<f64, DecodeError> {
    let invalid = || DecodeError::InvalidField {
        who: msg.who(),
        field: "temperature",
        value: raw.to_owned(),
    };
    let whole = raw.get(1..3).ok_or_else(invalid)?;
    let tenths = raw.get(raw.len() - 1..).ok_or_else(invalid)?;
    parse(msg, "temperature", &format!("{whole}.{tenths}"))
}

fn local_offset(msg: &ClassifiedMessage, raw: &str) -> Result<i32, DecodeError> {
    match raw {
        "0" | "00" | "4" | "5" | "6" | "7" | "8" => Ok(0),
        _ => {
            let magnitude: i32 = parse(msg, "local offset", raw.get(1..).unwrap_or_default())?;
            if raw.starts_with('0') {
                Ok(magnitude)
            } else {
                Ok(-magnitude)
            }
        }
    }
}

fn zone_and_sensor(msg: &ClassifiedMessage) -> Result<(u32, Option<u32>), DecodeError> {
    let digits = msg.where_().trim_start_matches('#');
    let mut zone: u32 = parse(msg, "zone", digits)?;
    if zone == 0 {
        if let Some(param) = msg.where_params().first() {
            zone = parse(msg, "zone", param)?;
        }
    }
    if zone > 99 {
        let text = zone.to_string();
        let (sensor, rest) = text.split_at(1);
        return Ok((parse(msg, "zone", rest)?, Some(parse(msg, "sensor", sensor)?)));
    }
    Ok((zone, None))
}

fn valve_state(value: u32) -> Option<&'static str> {
    match value {
        0 => Some("off"),
        1 => Some("on"),
        2 => Some("opened"),
        3 => Some("closed"),
        4 => Some("stopped"),
        _ => None,
    }
}

#[allow(clippy::too_many_lines)]
pub(crate) fn decode(msg: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    let (zone, sensor) = zone_and_sensor(msg)?;
    let mut event = HeatingEvent::new(msg.where_(), zone, sensor);
    let label = format!("Zone {zone}'s");
    let mut summary = None;

    if let Some(code) = msg.what() {
        event.mode_code = Some(code);
        event.mode = ClimateMode::from_code(code);
        let mut text = match (event.mode, code) {
            (Some(mode), _) => {
                event.reading = Some(HeatingReading::Mode);
                format!("{label} mode is set to '{mode}'")
            }
            (None, 20) => format!("{label} remote control is disabled"),
            (None, 21) => format!("{label} remote control is enabled"),
            (None, _) => format!("{label} mode is unknown"),
        };
        match msg.what_params().first() {
            Some(param) if event.mode.is_some() => {
                let target = temperature(msg, param)?;
                event.reading = Some(HeatingReading::ModeTarget);
                event.target_temperature = Some(target);
                text.push_str(&format!(" at {target}°C."));
            }
            _ => text.push('.'),
        }
        summary = Some(text);
    }

    match msg.dimension() {
        Some(0) => {
            let celsius = temperature(msg, value(msg, 0)?)?;
            if let Some(sensor) = sensor {
                event.reading = Some(HeatingReading::SecondaryTemperature);
                event.secondary_temperature = Some(celsius);
                summary = Some(format!(
                    "{label} secondary sensor {sensor} is reporting a temperature of {celsius}°C."
                ));
            } else {
                event.reading = Some(HeatingReading::MainTemperature);
                event.main_temperature = Some(celsius);
                summary = Some(format!(
                    "{label} main sensor is reporting a temperature of {celsius}°C."
                ));
            }
        }
        Some(11) => {
            let fan: u32 = parse_value(msg, 0)?;
            let on = fan < 4;
            event.fan_on = Some(on);
            event.is_active = Some(on);
            summary = Some(match fan {
                0 => format!("{label} fan is on at 'Auto' speed."),
                1..=3 => {
                    event.fan_speed = Some(fan);
                    format!("{label} fan is on at speed {fan}.")
                }
                _ => format!("{label} fan is off."),
            });
        }
        Some(12) => {
            let celsius = temperature(msg, value(msg, 0)?)?;
            event.reading = Some(HeatingReading::LocalTargetTemperature);
            event.local_target_temperature = Some(celsius);
            summary = Some(format!(
                "{label} local target temperature is set to {celsius}°C."
            ));
        }
        Some(13) => {
            let offset = local_offset(msg, value(msg, 0)?)?;
            event.reading = Some(HeatingReading::LocalOffset);
            event.local_offset = Some(offset);
            summary = Some(format!("{label} local offset is set to {offset}°C."));
        }
        Some(14) => {
            let celsius = temperature(msg, value(msg, 0)?)?;
            event.reading = Some(HeatingReading::TargetTemperature);
            event.target_temperature = Some(celsius);
            summary = Some(format!("{label} target temperature is set to {celsius}°C."));
        }
        Some(19) => {
            let cooling_raw = value(msg, 0)?;
            let heating_raw = value(msg, 1)?;
            event.reading = Some(HeatingReading::Action);
            event.is_cooling = Some(VALVE_ACTIVE.contains(&cooling_raw));
            event.is_heating = Some(VALVE_ACTIVE.contains(&heating_raw));
            event.is_active = Some(VALVE_ACTIVE.contains(&cooling_raw) || VALVE_ACTIVE.contains(&heating_raw));

            let cooling: u32 = parse(msg, "cooling valve", cooling_raw)?;
            let mut text = match valve_state(cooling) {
                Some(state) => format!("{label} cooling valve is {state}"),
                None => {
                    let speed = cooling - 5;
                    event.cooling_fan_on = Some(speed > 0);
                    event.is_active = Some(speed > 0);
                    if speed > 0 {
                        event.cooling_fan_speed = Some(speed);
                        format!("{label} cooling fan is on at speed {speed}")
                    } else {
                        format!("{label} cooling fan is off")
                    }
                }
            };

            let heating: u32 = parse(msg, "heating valve", heating_raw)?;
            match valve_state(heating) {
                Some(state) => text.push_str(&format!("; heating valve is {state}.")),
                None => {
                    let speed = heating - 5;
                    event.fan_on = Some(speed > 0);
                    event.is_active = Some(speed > 0);
                    if speed > 0 {
                        event.fan_speed = Some(speed);
                        text.push_str(&format!("; heating fan is on at speed {speed}."));
                    } else {
                        text.push_str("; heating fan is off.");
                    }
                }
            }
            summary = Some(text);
        }
        Some(20) => {
            let raw = value(msg, 0)?;
            let actuator = msg
                .where_params()
                .first()
                .cloned()
                .unwrap_or_else(|| "1".to_owned());
            event.reading = Some(HeatingReading::Action);
            event.is_active = Some(ACTUATOR_ACTIVE.contains(&raw));

            let state: u32 = parse(msg, "actuator state", raw)?;
            summary = Some(match valve_state(state) {
                Some(text) => format!("{label} actuator {actuator} is {text}."),
                None => {
                    let fan = state - 5;
                    event.fan_on = Some(fan > 0);
                    event.is_active = Some(fan > 0);
                    match fan {
                        0 => format!("{label} fan is off."),
                        1..=3 => {
                            event.fan_speed = Some(fan);
                            format!("{label} fan is on at speed {fan}.")
                        }
                        _ => format!("{label} fan is on at 'Auto' speed."),
                    }
                }
            });
            event.actuator = Some(actuator);
        }
        Some(60) => {
            let humidity: f64 = parse_value(msg, 0)?;
            event.reading = Some(HeatingReading::MainHumidity);
            event.main_humidity = Some(humidity);
            summary = Some(format!(
                "{label} main sensor is reporting a humidity of {humidity}%."
            ));
        }
        _ => {}
    }

    Ok(Decoded::new(Payload::Heating(event), summary))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dispatch::Dispatcher;

    fn heating(raw: &str) -> (HeatingEvent, String) {
        let msg = Dispatcher::default().decode(raw).expect("decodes");
        let summary = msg.summary().to_owned();
        match msg.into_payload() {
            Payload::Heating(event) => (event, summary),
            other => panic!("expected heating, got {other:?}"),
        }
    }

    #[test]
    fn main_temperature() {
        let (event, summary) = heating("*#4*12*0*0123##");
        assert_eq!(event.zone, 12);
        assert_eq!(event.sensor, None);
        assert_eq!(event.main_temperature, Some(12.3));
        assert_eq!(event.reading, Some(HeatingReading::MainTemperature));
        assert_eq!(
            summary,
            "Zone 12's main sensor is reporting a temperature of 12.3°C."
        );
        assert_eq!(event.entity_id().as_str(), "4-12");
    }

    #[test]
    fn secondary_temperature() {
        let (event, _) = heating("*#4*112*0*0123##");
        assert_eq!(event.zone, 12);
        assert_eq!(event.sensor, Some(1));
        assert_eq!(event.secondary(), Some((1, 12.3)));
        assert_eq!(event.main_temperature, None);
        assert_eq!(event.entity_id().as_str(), "4-112");
    }

    #[test]
    fn central_unit_addressing() {
        let (event, _) = heating("*#4*#0#3*14*0215*1##");
        assert_eq!(event.zone, 3);
        assert_eq!(event.target_temperature, Some(21.5));

        let (event, _) = heating("*#4*#0*14*0215*1##");
        assert_eq!(event.zone, 0);
        assert_eq!(event.entity_id().as_str(), "4-#0");
    }

    #[test]
    fn mode_with_target() {
        let (event, summary) = heating("*4*110#0215*12##");
        assert_eq!(event.mode, Some(ClimateMode::Heat));
        assert_eq!(event.reading, Some(HeatingReading::ModeTarget));
        assert_eq!(event.target_temperature, Some(21.5));
        assert_eq!(summary, "Zone 12's mode is set to 'heat' at 21.5°C.");
    }

    #[test]
    fn mode_ranges() {
        assert_eq!(ClimateMode::from_code(303), Some(ClimateMode::Off));
        assert_eq!(ClimateMode::from_code(2216), Some(ClimateMode::Cool));
        assert_eq!(ClimateMode::from_code(1101), Some(ClimateMode::Heat));
        assert_eq!(ClimateMode::from_code(23100), Some(ClimateMode::Auto));
        assert_eq!(ClimateMode::from_code(13255), Some(ClimateMode::Auto));
        assert_eq!(ClimateMode::from_code(20), None);
        assert_eq!(ClimateMode::from_code(2217), None);
    }

    #[test]
    fn remote_control_state() {
        let (event, summary) = heating("*4*20*12##");
        assert_eq!(event.mode, None);
        assert_eq!(summary, "Zone 12's remote control is disabled.");
    }

    #[test]
    fn local_offsets() {
        assert_eq!(heating("*#4*12*13*03##").0.local_offset, Some(3));
        assert_eq!(heating("*#4*12*13*12##").0.local_offset, Some(-2));
        assert_eq!(heating("*#4*12*13*4##").0.local_offset, Some(0));
        assert_eq!(heating("*#4*12*13*00##").0.local_offset, Some(0));
    }

    #[test]
    fn valve_status() {
        let (event, summary) = heating("*#4*12*19*0*1##");
        assert_eq!(event.is_cooling, Some(false));
        assert_eq!(event.is_heating, Some(true));
        assert_eq!(event.is_active, Some(true));
        assert_eq!(summary, "Zone 12's cooling valve is off; heating valve is on.");

        let (event, _) = heating("*#4*12*19*0*7##");
        assert_eq!(event.fan_on, Some(true));
        assert_eq!(event.fan_speed, Some(2));
    }

    #[test]
    fn actuator_status() {
        let (event, summary) = heating("*#4*12#2*20*1##");
        assert_eq!(event.actuator.as_deref(), Some("2"));
        assert_eq!(event.is_active, Some(true));
        assert_eq!(summary, "Zone 12's actuator 2 is on.");

        let (event, summary) = heating("*#4*12*20*9##");
        assert_eq!(event.actuator.as_deref(), Some("1"));
        assert_eq!(event.fan_on, Some(true));
        assert_eq!(summary, "Zone 12's fan is on at 'Auto' speed.");
    }

    #[test]
    fn fan_and_humidity() {
        let (event, summary) = heating("*#4*12*11*0##");
        assert_eq!(event.fan_on, Some(true));
        assert_eq!(summary, "Zone 12's fan is on at 'Auto' speed.");

        let (event, _) = heating("*#4*12*60*55##");
        assert_eq!(event.main_humidity, Some(55.0));
    }

    #[test]
    fn short_temperature_is_a_decode_error() {
        assert!(Dispatcher::default().decode("*#4*12*0*1##").is_err());
    }
}
