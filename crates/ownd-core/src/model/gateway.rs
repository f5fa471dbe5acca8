//! Gateway management (WHO 13): clock, network settings and versions.

use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::Serialize;

use super::{Payload, clock, parse, parse_value, span, value};
use crate::dispatch::Decoded;
use crate::error::DecodeError;
use crate::frame::ClassifiedMessage;

/// Gateway hardware reported by dimension 15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayModel {
    MhServer,
    Mh200,
    F452,
    F452V,
    MhServer2,
    H4684,
    F454,
    Unknown(u32),
}

impl GatewayModel {
    pub fn from_code(code: u32) -> Self {
        match code {
            2 => Self::MhServer,
            4 => Self::Mh200,
            6 => Self::F452,
            7 => Self::F452V,
            11 => Self::MhServer2,
            13 => Self::H4684,
            200 => Self::F454,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for GatewayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MhServer => f.write_str("MHServer"),
            Self::Mh200 => f.write_str("MH200"),
            Self::F452 => f.write_str("F452"),
            Self::F452V => f.write_str("F452V"),
            Self::MhServer2 => f.write_str("MHServer2"),
            Self::H4684 => f.write_str("H4684"),
            Self::F454 => f.write_str("F454"),
            Self::Unknown(code) => write!(f, "Unknown ({code})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayReading {
    Time {
        time: NaiveTime,
        /// Absent when the gateway omits its timezone.
        utc_offset_hours: Option<i32>,
    },
    Date(NaiveDate),
    IpAddress(Ipv4Addr),
    Netmask(Ipv4Addr),
    MacAddress(String),
    Model(GatewayModel),
    Firmware(String),
    Uptime(Duration),
    DateTime(DateTime<FixedOffset>),
    Kernel(String),
    Distribution(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GatewayEvent {
    pub reading: Option<GatewayReading>,
}

fn invalid_date(msg: &ClassifiedMessage) -> DecodeError {
    DecodeError::InvalidDate {
        who: msg.who(),
        frame: msg.raw().to_owned(),
    }
}

/// `0HH` is `+HH`, `1HH` is `-HH`, empty means UTC.
fn utc_offset(msg: &ClassifiedMessage, raw: &str) -> Result<Option<i32>, DecodeError> {
    let Some(sign) = raw.chars().next() else {
        return Ok(None);
    };
    let hours: i32 = parse(msg, "timezone", &raw[1..])?;
    Ok(Some(if sign == '0' { hours } else { -hours }))
}

fn offset_text(hours: Option<i32>) -> String {
    hours.map_or_else(String::new, |h| format!("{h:+03}:00"))
}

fn time_of_day(msg: &ClassifiedMessage) -> Result<NaiveTime, DecodeError> {
    NaiveTime::from_hms_opt(
        parse_value(msg, 0)?,
        parse_value(msg, 1)?,
        parse_value(msg, 2)?,
    )
    .ok_or_else(|| invalid_date(msg))
}

fn ipv4(msg: &ClassifiedMessage) -> Result<Ipv4Addr, DecodeError> {
    Ok(Ipv4Addr::new(
        parse_value(msg, 0)?,
        parse_value(msg, 1)?,
        parse_value(msg, 2)?,
        parse_value(msg, 3)?,
    ))
}

fn dotted(msg: &ClassifiedMessage) -> Result<String, DecodeError> {
    Ok(format!("{}.{}.{}", value(msg, 0)?, value(msg, 1)?, value(msg, 2)?))
}

pub(crate) fn decode(msg: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    let (reading, summary) = match msg.dimension() {
        Some(0) => {
            let time = time_of_day(msg)?;
            let offset = utc_offset(msg, value(msg, 3).unwrap_or_default())?;
            let text = format!(
                "Gateway's internal time is: {} UTC {}.",
                time.format("%H:%M:%S"),
                offset_text(offset)
            );
            (
                GatewayReading::Time {
                    time,
                    utc_offset_hours: offset,
                },
                text,
            )
        }
        Some(1) => {
            let date = NaiveDate::from_ymd_opt(
                parse_value(msg, 3)?,
                parse_value(msg, 2)?,
                parse_value(msg, 1)?,
            )
            .ok_or_else(|| invalid_date(msg))?;
            (
                GatewayReading::Date(date),
                format!("Gateway's internal date is: {date}."),
            )
        }
        Some(10) => {
            let ip = ipv4(msg)?;
            (
                GatewayReading::IpAddress(ip),
                format!("Gateway's IP address is: {ip}."),
            )
        }
        Some(11) => {
            let mask = ipv4(msg)?;
            (
                GatewayReading::Netmask(mask),
                format!("Gateway's netmask is: {mask}."),
            )
        }
        Some(12) => {
            let octets = (0..6)
                .map(|i| parse_value::<u8>(msg, i).map(|b| format!("{b:02x}")))
                .collect::<Result<Vec<_>, _>>()?;
            let mac = octets.join(":");
            let text = format!("Gateway's MAC address is: {mac}.");
            (GatewayReading::MacAddress(mac), text)
        }
        Some(15) => {
            let model = GatewayModel::from_code(parse_value(msg, 0)?);
            (
                GatewayReading::Model(model),
                format!("Gateway device type is: {model}."),
            )
        }
        Some(16) => {
            let version = dotted(msg)?;
            let text = format!("Gateway's firmware version is: {version}.");
            (GatewayReading::Firmware(version), text)
        }
        Some(19) => {
            let days: u64 = parse_value(msg, 0)?;
            let hours: u64 = parse_value(msg, 1)?;
            let minutes: u64 = parse_value(msg, 2)?;
            let seconds: u64 = parse_value(msg, 3)?;
            let rest = span(msg, "uptime", [0, hours, minutes, seconds])?;
            let uptime = span(msg, "uptime", [days, hours, minutes, seconds])?;
            (
                GatewayReading::Uptime(uptime),
                format!("Gateway's uptime is: {days} days, {}.", clock(rest)),
            )
        }
        Some(22) => {
            let time = time_of_day(msg)?;
            let offset = utc_offset(msg, value(msg, 3).unwrap_or_default())?;
            let date = NaiveDate::from_ymd_opt(
                parse_value(msg, 7)?,
                parse_value(msg, 6)?,
                parse_value(msg, 5)?,
            )
            .ok_or_else(|| invalid_date(msg))?;
            let zone = offset
                .unwrap_or(0)
                .checked_mul(3600)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| invalid_date(msg))?;
            let when = zone
                .from_local_datetime(&date.and_time(time))
                .single()
                .ok_or_else(|| invalid_date(msg))?;
            (
                GatewayReading::DateTime(when),
                format!("Gateway's internal datetime is: {when}."),
            )
        }
        Some(23) => {
            let version = dotted(msg)?;
            let text = format!("Gateway's kernel version is: {version}.");
            (GatewayReading::Kernel(version), text)
        }
        Some(24) => {
            let version = dotted(msg)?;
            let text = format!("Gateway's distribution version is: {version}.");
            (GatewayReading::Distribution(version), text)
        }
        _ => return Ok(Decoded::new(Payload::Gateway(GatewayEvent::default()), None)),
    };

    Ok(Decoded::new(
        Payload::Gateway(GatewayEvent {
            reading: Some(reading),
        }),
        Some(summary),
    ))
}
