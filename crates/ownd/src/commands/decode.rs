//! `ownd decode`: classify and decode frames without a gateway.

use std::io::BufRead;

use ownd_core::{Dispatcher, FrameError, Signal};
use serde::Serialize;

use crate::cli::{DecodeArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct SignalFrame<'a> {
    raw: &'a str,
    signal: Signal,
}

/// One frame per line; blank lines are skipped.
fn read_frames(input: impl BufRead) -> Result<Vec<String>, CliError> {
    let mut frames = Vec::new();
    for line in input.lines() {
        let line = line?;
        let frame = line.trim();
        if !frame.is_empty() {
            frames.push(frame.to_owned());
        }
    }
    Ok(frames)
}

pub fn handle(args: DecodeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let frames = if args.frames.is_empty() {
        read_frames(std::io::stdin().lock())?
    } else {
        args.frames
    };

    let dispatcher = Dispatcher::default();
    for frame in &frames {
        let line = match dispatcher.decode(frame) {
            Ok(msg) => output::render(global.output, &msg, |m| {
                format!("{:<24} {}", m.entity_id().as_str(), m.summary())
            })?,
            Err(FrameError::Signal(signal)) => {
                let item = SignalFrame { raw: frame, signal };
                output::render(global.output, &item, |s| format!("{:<24} {:?}", "signal", s.signal))?
            }
            Err(source) => {
                return Err(CliError::InvalidFrame {
                    frame: frame.clone(),
                    source,
                });
            }
        };
        output::print_output(&line, global.quiet)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdin_frames_skip_blank_lines() {
        let input = "*1*1*12##\n\n  *#*1##  \n";
        let frames = read_frames(input.as_bytes()).expect("reads");
        assert_eq!(frames, vec!["*1*1*12##", "*#*1##"]);
    }
}
