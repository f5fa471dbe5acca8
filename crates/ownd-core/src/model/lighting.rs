//! Lighting (WHO 1): switches, dimmers, timers and motion sensors.

use std::time::Duration;

use serde::Serialize;

use super::{Payload, clock, interface_text, parse_value, seconds, span};
use crate::dispatch::Decoded;
use crate::error::DecodeError;
use crate::frame::ClassifiedMessage;

/// What a lighting frame reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LightingReading {
    Status,
    Motion,
    PirSensitivity,
    Illuminance,
    MotionTimeout,
}

/// Motion sensor PIR sensitivity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::FromRepr)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PirSensitivity {
    #[strum(serialize = "low")]
    Low = 0,
    #[strum(serialize = "medium")]
    Medium = 1,
    #[strum(serialize = "high")]
    High = 2,
    #[strum(serialize = "very high")]
    VeryHigh = 3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightingEvent {
    pub reading: LightingReading,
    /// WHAT of a status frame, or 0/1 derived from a brightness reply.
    pub state: Option<u32>,
    /// Preset level 2..=10 from a status frame.
    pub brightness_preset: Option<u32>,
    /// Brightness percentage from dimension 1 or 4.
    pub brightness: Option<u32>,
    pub transition: Option<u32>,
    pub timer: Option<Duration>,
    pub blinker: Option<Duration>,
    pub motion: bool,
    pub pir_sensitivity: Option<PirSensitivity>,
    /// Lux.
    pub illuminance: Option<u32>,
    pub motion_timeout: Option<Duration>,
}

impl LightingEvent {
    fn new() -> Self {
        Self {
            reading: LightingReading::Status,
            state: None,
            brightness_preset: None,
            brightness: None,
            transition: None,
            timer: None,
            blinker: None,
            motion: false,
            pir_sensitivity: None,
            illuminance: None,
            motion_timeout: None,
        }
    }

    /// States 1..=31 all leave the light lit.
    pub fn is_on(&self) -> bool {
        self.state.is_some_and(|s| (1..32).contains(&s))
    }
}

/// Fixed timers selected by WHAT 11..=18.
fn timer_for(what: u32) -> Option<Duration> {
    let millis = match what {
        11 => 60_000,
        12 => 120_000,
        13 => 180_000,
        14 => 240_000,
        15 => 300_000,
        16 => 900_000,
        17 => 30_000,
        18 => 500,
        _ => return None,
    };
    Some(Duration::from_millis(millis))
}

fn hms(msg: &ClassifiedMessage) -> Result<Duration, DecodeError> {
    let hours: u64 = parse_value(msg, 0)?;
    let minutes: u64 = parse_value(msg, 1)?;
    let secs: u64 = parse_value(msg, 2)?;
    span(msg, "duration", [0, hours, minutes, secs])
}

pub(crate) fn decode(msg: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    let mut event = LightingEvent::new();
    let light = format!("Light {}{}", msg.where_(), interface_text(msg));
    let sensor = format!("Light/motion sensor {}{}", msg.where_(), interface_text(msg));
    let mut summary = None;

    if let Some(what) = msg.what().filter(|&w| w != 1000) {
        event.state = Some(what);
        summary = match what {
            0 => Some(format!("{light} is switched off.")),
            1 => Some(format!("{light} is switched on.")),
            2..=10 => {
                event.brightness_preset = Some(what);
                Some(format!("{light} is switched on at brightness level {what}."))
            }
            20..=29 => {
                let blinker = Duration::from_millis(500 * u64::from(what - 19));
                event.blinker = Some(blinker);
                Some(format!("{light} is blinking every {}.", seconds(blinker)))
            }
            34 => {
                event.reading = LightingReading::Motion;
                event.motion = true;
                Some(format!("{sensor} detected motion"))
            }
            _ => timer_for(what).map(|timer| {
                event.timer = Some(timer);
                format!("{light} is switched on for {}.", seconds(timer))
            }),
        };
    }

    if let Some(dimension) = msg.dimension() {
        match dimension {
            1 | 4 => {
                let level: u32 = parse_value(msg, 0)?;
                let brightness = level.checked_sub(100).ok_or(DecodeError::InvalidField {
                    who: 1,
                    field: "brightness",
                    value: level.to_string(),
                })?;
                event.brightness = Some(brightness);
                event.transition = Some(parse_value(msg, 1)?);
                if brightness == 0 {
                    event.state = Some(0);
                    summary = Some(format!("{light} is switched off."));
                } else {
                    event.state = Some(1);
                    summary = Some(format!("{light} is switched on at {brightness}%."));
                }
            }
            2 => {
                let timer = hms(msg)?;
                event.timer = Some(timer);
                summary = Some(format!("{light} is switched on for {}.", seconds(timer)));
            }
            5 => {
                let raw: u8 = parse_value(msg, 0)?;
                let level = PirSensitivity::from_repr(raw).ok_or(DecodeError::InvalidField {
                    who: 1,
                    field: "PIR sensitivity",
                    value: raw.to_string(),
                })?;
                event.reading = LightingReading::PirSensitivity;
                event.pir_sensitivity = Some(level);
                summary = Some(format!("{sensor} PIR sensitivity is {level}."));
            }
            6 => {
                let lux: u32 = parse_value(msg, 0)?;
                event.reading = LightingReading::Illuminance;
                event.illuminance = Some(lux);
                summary = Some(format!("{sensor} detected an illuminance value of {lux} lx."));
            }
            7 => {
                let timeout = hms(msg)?;
                event.reading = LightingReading::MotionTimeout;
                event.motion_timeout = Some(timeout);
                summary = Some(format!("{sensor} has timeout set to {}.", clock(timeout)));
            }
            _ if !msg.dimension_values().is_empty() => {
                summary = Some(format!("{sensor} has sent an unknown dimension {dimension}."));
            }
            _ => {}
        }
    }

    Ok(Decoded::new(Payload::Lighting(event), summary))
}
