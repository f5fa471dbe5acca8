//! Lighting (WHO 1) commands.

use super::{Command, describe_where};

pub fn status(where_: &str) -> Command {
    let (base, iface) = describe_where(where_);
    Command::new(
        format!("*#1*{where_}##"),
        format!("Requesting light or switch {base}{iface} status."),
    )
}

pub fn get_brightness(where_: &str) -> Command {
    let (base, iface) = describe_where(where_);
    Command::new(
        format!("*#1*{where_}*1##"),
        format!("Requesting light {base}{iface} brightness."),
    )
}

pub fn get_pir_sensitivity(where_: &str) -> Command {
    let (base, iface) = describe_where(where_);
    Command::new(
        format!("*#1*{where_}*5##"),
        format!("Requesting light/motion sensor {base}{iface} PIR sensitivity."),
    )
}

pub fn get_illuminance(where_: &str) -> Command {
    let (base, iface) = describe_where(where_);
    Command::new(
        format!("*#1*{where_}*6##"),
        format!("Requesting light/motion sensor {base}{iface} illuminance."),
    )
}

pub fn get_motion_timeout(where_: &str) -> Command {
    let (base, iface) = describe_where(where_);
    Command::new(
        format!("*#1*{where_}*7##"),
        format!("Requesting light/motion sensor {base}{iface} motion timeout."),
    )
}

/// Blink every `frequency` seconds, rounded to half a second within
/// 0.5..=5. Anything outside that range blinks every 0.5 s.
pub fn flash(where_: &str, frequency: Option<f64>) -> Command {
    let frequency = match frequency {
        Some(f) if (0.5..=5.0).contains(&f) => (f * 2.0).round_ties_even() / 2.0,
        _ => 0.5,
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let what = (frequency / 0.5) as u32 + 19;
    let (base, iface) = describe_where(where_);
    Command::new(
        format!("*1*{what}*{where_}##"),
        format!("Flashing light {base}{iface} every {frequency}s."),
    )
}

pub fn switch_on(where_: &str, transition: Option<u8>) -> Command {
    let (base, iface) = describe_where(where_);
    match transition {
        Some(speed) => Command::new(
            format!("*1*1#{speed}*{where_}##"),
            format!("Switching ON light {base}{iface} with transition speed {speed}."),
        ),
        None => Command::new(
            format!("*1*1*{where_}##"),
            format!("Switching ON light or switch {base}{iface}."),
        ),
    }
}

pub fn switch_off(where_: &str, transition: Option<u8>) -> Command {
    let (base, iface) = describe_where(where_);
    match transition {
        Some(speed) => Command::new(
            format!("*1*0#{speed}*{where_}##"),
            format!("Switching OFF light {base}{iface} with transition speed {speed}."),
        ),
        None => Command::new(
            format!("*1*0*{where_}##"),
            format!("Switching OFF light or switch {base}{iface}."),
        ),
    }
}

/// Dim to `level` percent (capped at 100) at the given transition speed.
pub fn set_brightness(where_: &str, level: u8, transition: u8) -> Command {
    let level = level.min(100);
    let (base, iface) = describe_where(where_);
    let summary = if transition > 0 {
        format!("Setting light {base}{iface} brightness to {level}% with transition speed {transition}.")
    } else {
        format!("Setting light {base}{iface} brightness to {level}%.")
    };
    Command::new(
        format!("*#1*{where_}*#1*{}*{transition}##", u32::from(level) + 100),
        summary,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn switching() {
        assert_eq!(switch_on("12", None).frame(), "*1*1*12##");
        assert_eq!(switch_off("12", None).frame(), "*1*0*12##");
        let slow = switch_on("12#4#01", Some(3));
        assert_eq!(slow.frame(), "*1*1#3*12#4#01##");
        assert_eq!(
            slow.summary(),
            "Switching ON light 12 on interface 01 with transition speed 3."
        );
    }

    #[test]
    fn brightness() {
        let cmd = set_brightness("12", 30, 0);
        assert_eq!(cmd.frame(), "*#1*12*#1*130*0##");
        assert_eq!(cmd.summary(), "Setting light 12 brightness to 30%.");
        assert_eq!(set_brightness("12", 150, 2).frame(), "*#1*12*#1*200*2##");
    }

    #[test]
    fn flashing() {
        assert_eq!(flash("12", None).frame(), "*1*20*12##");
        assert_eq!(flash("12", Some(1.0)).frame(), "*1*21*12##");
        assert_eq!(flash("12", Some(5.0)).frame(), "*1*29*12##");
        assert_eq!(flash("12", Some(9.0)).frame(), "*1*20*12##");
        assert_eq!(flash("12", Some(1.2)).summary(), "Flashing light 12 every 1s.");
    }

    #[test]
    fn requests() {
        assert!(status("12").is_status_request());
        assert_eq!(get_brightness("12").frame(), "*#1*12*1##");
        assert_eq!(get_pir_sensitivity("45").frame(), "*#1*45*5##");
        assert_eq!(get_illuminance("45").frame(), "*#1*45*6##");
        assert_eq!(get_motion_timeout("45").frame(), "*#1*45*7##");
    }
}
