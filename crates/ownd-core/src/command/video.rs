//! Video door entry (WHO 7) commands.

use super::Command;

/// Switch on camera `camera`: either a short id (`0..100`, addressed as
/// `40NN`) or a full `4000..5000` address.
pub fn receive_video(camera: u32) -> Option<Command> {
    let where_ = match camera {
        0..100 => format!("40{camera:02}"),
        4000..5000 => camera.to_string(),
        _ => return None,
    };
    Some(Command::new(
        format!("*7*0*{where_}##"),
        format!("Opening video stream for camera {where_}."),
    ))
}

pub fn close_video() -> Command {
    Command::new("*7*9**##", "Closing video stream.")
}
