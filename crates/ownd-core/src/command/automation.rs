//! Automation (WHO 2) commands.

use super::{Command, describe_where};

pub fn status(where_: &str) -> Command {
    let (base, iface) = describe_where(where_);
    Command::new(
        format!("*#2*{where_}##"),
        format!("Requesting shutter {base}{iface} status."),
    )
}

pub fn raise(where_: &str) -> Command {
    let (base, iface) = describe_where(where_);
    Command::new(format!("*2*1*{where_}##"), format!("Raising shutter {base}{iface}."))
}

pub fn lower(where_: &str) -> Command {
    let (base, iface) = describe_where(where_);
    Command::new(format!("*2*2*{where_}##"), format!("Lowering shutter {base}{iface}."))
}

pub fn stop(where_: &str) -> Command {
    let (base, iface) = describe_where(where_);
    Command::new(format!("*2*0*{where_}##"), format!("Stopping shutter {base}{iface}."))
}

/// Move to `level` percent open, capped at 100.
pub fn set_level(where_: &str, level: u8) -> Command {
    let level = level.min(100);
    let (base, iface) = describe_where(where_);
    Command::new(
        format!("*#2*{where_}*#11#001*{level}##"),
        format!("Setting shutter {base}{iface} position to {level}%."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutter_frames() {
        assert_eq!(status("12").frame(), "*#2*12##");
        assert_eq!(raise("12").frame(), "*2*1*12##");
        assert_eq!(lower("12").frame(), "*2*2*12##");
        assert_eq!(stop("12#4#02").summary(), "Stopping shutter 12 on interface 02.");
        assert_eq!(set_level("12", 40).frame(), "*#2*12*#11#001*40##");
    }
}
