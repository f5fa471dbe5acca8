//! Scenario (WHO 0) and scene (WHO 17) commands.

use super::Command;

/// Launch `scenario` on the scenario controller at `where_`.
pub fn activate_scenario(where_: &str, scenario: u32) -> Command {
    Command::new(
        format!("*0*{scenario}*{where_}##"),
        format!("Activating scenario {scenario} on controller {where_}."),
    )
}

pub fn status(where_: &str) -> Command {
    Command::new(format!("*#17*{where_}##"), format!("Requesting scene {where_} status."))
}

pub fn start(where_: &str) -> Command {
    Command::new(format!("*17*1*{where_}##"), format!("Starting scene {where_}."))
}

pub fn stop(where_: &str) -> Command {
    Command::new(format!("*17*2*{where_}##"), format!("Stopping scene {where_}."))
}

pub fn enable(where_: &str) -> Command {
    Command::new(format!("*17*3*{where_}##"), format!("Enabling scene {where_}."))
}

pub fn disable(where_: &str) -> Command {
    Command::new(format!("*17*4*{where_}##"), format!("Disabling scene {where_}."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_and_scene_frames() {
        assert_eq!(activate_scenario("21", 3).frame(), "*0*3*21##");
        assert_eq!(status("4").frame(), "*#17*4##");
        assert_eq!(start("4").frame(), "*17*1*4##");
        assert_eq!(stop("4").frame(), "*17*2*4##");
        assert_eq!(enable("4").frame(), "*17*3*4##");
        assert_eq!(disable("4").frame(), "*17*4*4##");
    }
}
