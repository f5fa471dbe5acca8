//! Heating (WHO 4) commands.
//!
//! Zones are addressed as `#N` through the central unit, or as plain `N`
//! on standalone thermostats. A central-unit local address `#0#N` is sent
//! unchanged.

use super::Command;
use crate::model::ClimateMode;

pub fn status(where_: &str) -> Command {
    Command::new(
        format!("*#4*{where_}##"),
        format!("Requesting climate status update for {where_}."),
    )
}

pub fn get_temperature(where_: &str) -> Command {
    Command::new(
        format!("*#4*{where_}*0##"),
        format!("Requesting temperature of {where_}."),
    )
}

/// Resolve the zone address and its display name.
fn zone_address(where_: &str, standalone: bool) -> Option<(String, String)> {
    if let Some(zone) = where_.strip_prefix("#0#") {
        let zone: u32 = zone.parse().ok()?;
        return Some((where_.to_owned(), format!("zone {zone}")));
    }
    let zone: u32 = where_.rsplit('#').next()?.parse().ok()?;
    let name = if zone > 0 {
        format!("zone {zone}")
    } else {
        "general".to_owned()
    };
    let address = if standalone && zone > 0 {
        zone.to_string()
    } else {
        format!("#{zone}")
    };
    Some((address, name))
}

/// Only `off` and `auto` can be selected remotely; other modes, or an
/// unparseable zone, yield `None`.
pub fn set_mode(where_: &str, mode: ClimateMode, standalone: bool) -> Option<Command> {
    let (zone, name) = zone_address(where_, standalone)?;
    let code = match mode {
        ClimateMode::Off => 303,
        ClimateMode::Auto => 311,
        ClimateMode::Heat | ClimateMode::Cool => return None,
    };
    Some(Command::new(
        format!("*4*{code}*{zone}##"),
        format!("Setting {name} mode to '{mode}'."),
    ))
}

pub fn turn_off(where_: &str, standalone: bool) -> Option<Command> {
    set_mode(where_, ClimateMode::Off, standalone)
}

/// Target temperature, rounded to half a degree and clamped to 5..=40 °C.
pub fn set_temperature(
    where_: &str,
    celsius: f64,
    mode: ClimateMode,
    standalone: bool,
) -> Option<Command> {
    let (zone, name) = zone_address(where_, standalone)?;
    let mode_code = match mode {
        ClimateMode::Heat => 1,
        ClimateMode::Cool => 2,
        ClimateMode::Auto => 3,
        ClimateMode::Off => return None,
    };
    let celsius = ((celsius * 2.0).round_ties_even() / 2.0).clamp(5.0, 40.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let tenths = (celsius * 10.0) as u32;
    Some(Command::new(
        format!("*#4*{zone}*#14*{tenths:04}*{mode_code}##"),
        format!("Setting {name} to {celsius:.1}°C in mode '{mode}'."),
    ))
}
