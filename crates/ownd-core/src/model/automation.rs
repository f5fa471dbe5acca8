//! Automation (WHO 2): shutters and covers.

use serde::Serialize;

use super::{Payload, interface_text, parse_value};
use crate::dispatch::Decoded;
use crate::error::DecodeError;
use crate::frame::ClassifiedMessage;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutomationEvent {
    pub state: Option<u32>,
    /// Percentage open, from dimension 10.
    pub position: Option<u32>,
    pub priority: Option<u32>,
    pub info: Option<u32>,
    pub is_opening: Option<bool>,
    pub is_closing: Option<bool>,
    pub is_closed: Option<bool>,
}

pub(crate) fn decode(msg: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    let mut event = AutomationEvent::default();
    let cover = format!("Cover {}{}", msg.where_(), interface_text(msg));

    if let Some(what) = msg.what().filter(|&w| w != 1000) {
        event.state = Some(what);
    }
    if msg.dimension() == Some(10) {
        event.state = Some(parse_value(msg, 0)?);
        event.position = Some(parse_value(msg, 1)?);
        event.priority = Some(parse_value(msg, 2)?);
        event.info = Some(parse_value(msg, 3)?);
    }

    let from = event
        .position
        .map(|p| format!(" from initial position {p}"))
        .unwrap_or_default();

    let summary = match event.state {
        Some(0) => {
            event.is_opening = Some(false);
            event.is_closing = Some(false);
            Some(format!("{cover} stopped."))
        }
        Some(10) => {
            event.is_opening = Some(false);
            event.is_closing = Some(false);
            match event.position {
                Some(0) => {
                    event.is_closed = Some(true);
                    Some(format!("{cover} is closed."))
                }
                Some(position) => {
                    event.is_closed = Some(false);
                    Some(format!("{cover} is opened at {position}%."))
                }
                None => None,
            }
        }
        Some(1) => {
            event.is_opening = Some(true);
            event.is_closing = Some(false);
            Some(format!("{cover} is opening."))
        }
        Some(11 | 13) => {
            event.is_opening = Some(true);
            event.is_closing = Some(false);
            event.is_closed = Some(false);
            Some(format!("{cover} is opening{from}."))
        }
        Some(2) => {
            event.is_opening = Some(false);
            event.is_closing = Some(true);
            Some(format!("{cover} is closing."))
        }
        Some(12 | 14) => {
            event.is_opening = Some(false);
            event.is_closing = Some(true);
            event.is_closed = Some(false);
            Some(format!("{cover} is closing{from}."))
        }
        _ => None,
    };

    Ok(Decoded::new(Payload::Automation(event), summary))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dispatch::Dispatcher;

    fn automation(raw: &str) -> (AutomationEvent, String) {
        let msg = Dispatcher::default().decode(raw).expect("decodes");
        let summary = msg.summary().to_owned();
        match msg.into_payload() {
            Payload::Automation(event) => (event, summary),
            other => panic!("expected automation, got {other:?}"),
        }
    }

    #[test]
    fn stopped_cover() {
        let (event, summary) = automation("*2*0*12##");
        assert_eq!(event.is_opening, Some(false));
        assert_eq!(event.is_closing, Some(false));
        assert_eq!(summary, "Cover 12 stopped.");
    }

    #[test]
    fn closed_position_reply() {
        let (event, summary) = automation("*#2*12*10*10*0*001*0##");
        assert_eq!(event.is_opening, Some(false));
        assert_eq!(event.is_closing, Some(false));
        assert_eq!(event.is_closed, Some(true));
        assert_eq!(event.priority, Some(1));
        assert_eq!(summary, "Cover 12 is closed.");
    }

    #[test]
    fn opened_position_reply() {
        let (event, summary) = automation("*#2*12*10*10*45*001*0##");
        assert_eq!(event.position, Some(45));
        assert_eq!(event.is_closed, Some(false));
        assert_eq!(summary, "Cover 12 is opened at 45%.");
    }

    #[test]
    fn advanced_opening_is_not_closed() {
        let (event, summary) = automation("*2*11#10#001*12##");
        assert_eq!(event.state, Some(11));
        assert_eq!(event.is_opening, Some(true));
        assert_eq!(event.is_closed, Some(false));
        assert_eq!(summary, "Cover 12 is opening.");
    }

    #[test]
    fn closing_cover() {
        let (event, _) = automation("*2*2*12##");
        assert_eq!(event.is_closing, Some(true));
        assert_eq!(event.is_opening, Some(false));
        assert_eq!(event.is_closed, None);
    }

    #[test]
    fn command_translation_has_no_state() {
        let (event, _) = automation("*2*1000#1*12##");
        assert_eq!(event.state, None);
        assert_eq!(event.is_opening, None);
    }
}
