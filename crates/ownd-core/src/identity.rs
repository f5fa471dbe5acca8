// ── Entity identity ──
//
// Every addressable device on the bus gets a stable string identifier
// built from WHO and WHERE. Frames routed through an interface module
// carry the interface so that equal WHERE values on different buses
// stay distinct.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::ClassifiedMessage;

/// Stable identifier of a bus entity, e.g. `1-12` or `1-12#4#01`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// `"{who}-{where}"`, or `"{who}-{where}#4#{iface}"` when routed
    /// through an interface.
    pub fn for_message(msg: &ClassifiedMessage) -> Self {
        match msg.interface() {
            Some(iface) => Self(format!("{}-{}#4#{iface}", msg.who(), msg.where_())),
            None => Self(format!("{}-{}", msg.who(), msg.where_())),
        }
    }

    /// Derived entity for a secondary reading of the same device,
    /// e.g. `1-12-motion` or `18-51-power`.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}-{suffix}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Parsed, classify};

    fn id(raw: &str) -> EntityId {
        match classify(raw) {
            Ok(Parsed::Message(m)) => m.entity_id(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn plain_entity_id() {
        assert_eq!(id("*1*1*12##").as_str(), "1-12");
        assert_eq!(id("*#18*51*113*1000##").as_str(), "18-51");
    }

    #[test]
    fn interface_entity_id() {
        assert_eq!(id("*1*1*12#4#01##").as_str(), "1-12#4#01");
        assert_eq!(id("*2*0*5#4#02##").to_string(), "2-5#4#02");
    }

    #[test]
    fn suffixes_extend_the_base_id() {
        assert_eq!(id("*1*1*12##").with_suffix("motion").as_str(), "1-12-motion");
    }
}
