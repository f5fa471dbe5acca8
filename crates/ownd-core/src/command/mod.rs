//! Builders for the frames a client sends.
//!
//! Every builder returns a [`Command`]: the wire frame plus a summary of
//! what it asks the bus to do. Builders that can refuse their input
//! (out-of-range dates, unsupported modes) return `Option<Command>`.
//!
//! ```
//! use ownd_core::command::lighting;
//!
//! let cmd = lighting::switch_on("12", None);
//! assert_eq!(cmd.frame(), "*1*1*12##");
//! assert_eq!(cmd.summary(), "Switching ON light or switch 12.");
//! ```

pub mod automation;
pub mod energy;
pub mod gateway;
pub mod heating;
pub mod lighting;
pub mod scene;
pub mod sensor;
pub mod video;

use std::fmt;

use serde::Serialize;

use crate::frame::{Parsed, classify};

/// An outgoing frame with its human readable summary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Command {
    frame: String,
    summary: String,
}

impl Command {
    pub fn new(frame: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            frame: frame.into(),
            summary: summary.into(),
        }
    }

    pub fn frame(&self) -> &str {
        &self.frame
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Status and dimension requests only ask for a reply.
    pub fn is_status_request(&self) -> bool {
        matches!(classify(&self.frame), Ok(Parsed::Message(m)) if m.is_status_request())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.frame)
    }
}

impl AsRef<str> for Command {
    fn as_ref(&self) -> &str {
        &self.frame
    }
}

/// Split `12#4#01` into `("12", " on interface 01")` for summaries.
pub(crate) fn describe_where(where_: &str) -> (&str, String) {
    let mut parts = where_.split('#');
    let base = parts.next().unwrap_or_default();
    match (parts.next(), parts.next()) {
        (Some("4"), Some(iface)) if !base.is_empty() => (base, format!(" on interface {iface}")),
        _ if where_.starts_with('#') => (where_, String::new()),
        _ => (base, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn where_description() {
        assert_eq!(describe_where("12"), ("12", String::new()));
        assert_eq!(describe_where("12#4#01"), ("12", " on interface 01".to_owned()));
        assert_eq!(describe_where("#5"), ("#5", String::new()));
    }

    #[test]
    fn request_detection() {
        assert!(Command::new("*#1*12##", "").is_status_request());
        assert!(Command::new("*#18*51*113##", "").is_status_request());
        assert!(!Command::new("*1*1*12##", "").is_status_request());
        assert!(!Command::new("*#1*12*#1*130*0##", "").is_status_request());
    }
}
