//! Typed payloads for each WHO family.
//!
//! Every decoder takes a [`ClassifiedMessage`] and produces a
//! [`Decoded`](crate::dispatch::Decoded): the family payload plus a
//! one-line human readable summary. Decoders never panic on odd frames;
//! missing or malformed fields come back as [`DecodeError`].

pub mod alarm;
pub mod automation;
pub mod auxiliary;
pub mod cen;
pub mod dry_contact;
pub mod energy;
pub mod gateway;
pub mod heating;
pub mod lighting;
pub mod scenario;
pub mod scene;

use std::str::FromStr;

use serde::Serialize;

use crate::error::DecodeError;
use crate::frame::ClassifiedMessage;
use crate::identity::EntityId;

pub use alarm::{AlarmEvent, AlarmState};
pub use automation::AutomationEvent;
pub use auxiliary::{AuxiliaryEvent, AuxiliaryState};
pub use cen::{CenAction, CenEvent, CenPlusAction, CenPlusEvent};
pub use dry_contact::DryContactEvent;
pub use energy::{EnergyEvent, EnergyReading};
pub use gateway::{GatewayEvent, GatewayModel, GatewayReading};
pub use heating::{ClimateMode, HeatingEvent, HeatingReading};
pub use lighting::{LightingEvent, LightingReading, PirSensitivity};
pub use scenario::ScenarioEvent;
pub use scene::{SceneEvent, SceneState};

// ── Payload ─────────────────────────────────────────────────────────

/// Closed set of decoded payloads, one variant per supported WHO.
///
/// Frames whose WHO has no decoder keep only their classified fields
/// and come back as [`Payload::Generic`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Scenario(ScenarioEvent),
    Lighting(LightingEvent),
    Automation(AutomationEvent),
    Heating(HeatingEvent),
    Alarm(AlarmEvent),
    Auxiliary(AuxiliaryEvent),
    Gateway(GatewayEvent),
    Cen(CenEvent),
    Scene(SceneEvent),
    Energy(EnergyEvent),
    CenPlus(CenPlusEvent),
    DryContact(DryContactEvent),
    Generic,
}

impl Payload {
    /// Entity this payload reports on. Secondary readings of a device
    /// (motion, illuminance, metering) get their own suffixed entity.
    pub fn entity_id(&self, msg: &ClassifiedMessage) -> EntityId {
        let base = msg.entity_id();
        match self {
            Self::Lighting(event) => match event.reading {
                LightingReading::Motion
                | LightingReading::PirSensitivity
                | LightingReading::MotionTimeout => base.with_suffix("motion"),
                LightingReading::Illuminance => base.with_suffix("illuminance"),
                LightingReading::Status => base,
            },
            Self::Heating(event) => event.entity_id(),
            Self::Energy(event) => match event.reading.and_then(EnergyReading::entity_suffix) {
                Some(suffix) => base.with_suffix(suffix),
                None => base,
            },
            _ => base,
        }
    }
}

// ── Field helpers ───────────────────────────────────────────────────

/// `" on interface X"` when the frame was routed through an interface.
pub(crate) fn interface_text(msg: &ClassifiedMessage) -> String {
    msg.interface()
        .map(|iface| format!(" on interface {iface}"))
        .unwrap_or_default()
}

pub(crate) fn require_what(msg: &ClassifiedMessage) -> Result<u32, DecodeError> {
    msg.what().ok_or(DecodeError::MissingField {
        who: msg.who(),
        field: "what",
    })
}

pub(crate) fn value<'m>(msg: &'m ClassifiedMessage, index: usize) -> Result<&'m str, DecodeError> {
    msg.dimension_values()
        .get(index)
        .map(String::as_str)
        .ok_or(DecodeError::MissingField {
            who: msg.who(),
            field: "dimension value",
        })
}

pub(crate) fn parse<T: FromStr>(
    msg: &ClassifiedMessage,
    field: &'static str,
    raw: &str,
) -> Result<T, DecodeError> {
    raw.parse().map_err(|_| DecodeError::InvalidField {
        who: msg.who(),
        field,
        value: raw.to_owned(),
    })
}

pub(crate) fn parse_value<T: FromStr>(
    msg: &ClassifiedMessage,
    index: usize,
) -> Result<T, DecodeError> {
    parse(msg, "dimension value", value(msg, index)?)
}

pub(crate) fn parse_param<T: FromStr>(
    msg: &ClassifiedMessage,
    field: &'static str,
    params: &[String],
    index: usize,
) -> Result<T, DecodeError> {
    let raw = params.get(index).ok_or(DecodeError::MissingField {
        who: msg.who(),
        field,
    })?;
    parse(msg, field, raw)
}

/// `days`, `hours`, `minutes` and `seconds` dimension values as one span.
/// Values too large for a `Duration` are an invalid field.
pub(crate) fn span(
    msg: &ClassifiedMessage,
    field: &'static str,
    [days, hours, minutes, seconds]: [u64; 4],
) -> Result<std::time::Duration, DecodeError> {
    days.checked_mul(86_400)
        .and_then(|total| total.checked_add(hours.checked_mul(3600)?))
        .and_then(|total| total.checked_add(minutes.checked_mul(60)?))
        .and_then(|total| total.checked_add(seconds))
        .map(std::time::Duration::from_secs)
        .ok_or_else(|| DecodeError::InvalidField {
            who: msg.who(),
            field,
            value: format!("{days}d {hours}h {minutes}m {seconds}s"),
        })
}

/// Seconds rendered the way summaries show them: `60s`, `0.5s`.
pub(crate) fn seconds(duration: std::time::Duration) -> String {
    format!("{}s", duration.as_secs_f64())
}

/// `H:MM:SS`
pub(crate) fn clock(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
