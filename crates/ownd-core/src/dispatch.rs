//! Routes classified frames to their family decoder.
//!
//! The [`Dispatcher`] is a registry keyed by WHO. The default registry
//! knows every family this crate decodes; callers may register their own
//! decoder for a WHO to extend or override it. Unknown WHO values decode
//! to [`Payload::Generic`] and keep their raw frame as summary.
//!
//! ```
//! use ownd_core::dispatch::Dispatcher;
//! use ownd_core::model::Payload;
//!
//! let dispatcher = Dispatcher::default();
//! let msg = dispatcher.decode("*1*1*12##")?;
//! assert!(matches!(msg.payload(), Payload::Lighting(_)));
//! assert_eq!(msg.summary(), "Light 12 is switched on.");
//! # Ok::<(), ownd_core::FrameError>(())
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::{DecodeError, FrameError};
use crate::frame::{ClassifiedMessage, Parsed, classify};
use crate::identity::EntityId;
use crate::model::{
    Payload, alarm, automation, auxiliary, cen, dry_contact, energy, gateway, heating, lighting,
    scenario, scene,
};

// ── Decoded ─────────────────────────────────────────────────────────

/// Output of a family decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub payload: Payload,
    /// `None` keeps the raw frame as summary.
    pub summary: Option<String>,
}

impl Decoded {
    pub fn new(payload: Payload, summary: Option<String>) -> Self {
        Self { payload, summary }
    }
}

/// A family decoder.
pub type Decoder = fn(&ClassifiedMessage) -> Result<Decoded, DecodeError>;

// ── OwnMessage ──────────────────────────────────────────────────────

/// A decoded bus message: classified fields, typed payload and a one-line
/// human readable summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnMessage {
    #[serde(flatten)]
    frame: ClassifiedMessage,
    payload: Payload,
    summary: String,
}

impl OwnMessage {
    pub fn frame(&self) -> &ClassifiedMessage {
        &self.frame
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn who(&self) -> u32 {
        self.frame.who()
    }

    pub fn where_(&self) -> &str {
        self.frame.where_()
    }

    /// Entity the payload reports on, including any reading suffix.
    pub fn entity_id(&self) -> EntityId {
        self.payload.entity_id(&self.frame)
    }
}

impl fmt::Display for OwnMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.frame.raw())
    }
}

// ── Dispatcher ──────────────────────────────────────────────────────

/// WHO-keyed decoder registry.
#[derive(Clone)]
pub struct Dispatcher {
    decoders: HashMap<u32, Decoder>,
}

impl Dispatcher {
    /// A registry with no decoders: every frame becomes generic.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register `decoder` for `who`, returning the one it replaces.
    pub fn register(&mut self, who: u32, decoder: Decoder) -> Option<Decoder> {
        self.decoders.insert(who, decoder)
    }

    pub fn handles(&self, who: u32) -> bool {
        self.decoders.contains_key(&who)
    }

    /// Decode an already classified frame.
    pub fn dispatch(&self, frame: ClassifiedMessage) -> Result<OwnMessage, DecodeError> {
        let decoded = match self.decoders.get(&frame.who()) {
            Some(decoder) => decoder(&frame)?,
            None => Decoded::new(Payload::Generic, None),
        };
        let summary = decoded.summary.unwrap_or_else(|| frame.raw().to_owned());
        Ok(OwnMessage {
            frame,
            payload: decoded.payload,
            summary,
        })
    }

    /// Classify and decode a raw frame.
    pub fn decode(&self, raw: &str) -> Result<OwnMessage, FrameError> {
        match classify(raw)? {
            Parsed::Message(frame) => Ok(self.dispatch(frame)?),
            Parsed::Signal(signal) => Err(FrameError::Signal(signal)),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        let mut dispatcher = Self::empty();
        dispatcher.register(0, scenario::decode);
        dispatcher.register(1, lighting::decode);
        dispatcher.register(2, automation::decode);
        dispatcher.register(4, heating::decode);
        dispatcher.register(5, alarm::decode);
        dispatcher.register(9, auxiliary::decode);
        dispatcher.register(13, gateway::decode);
        dispatcher.register(15, cen::decode_cen);
        dispatcher.register(17, scene::decode);
        dispatcher.register(18, energy::decode);
        dispatcher.register(25, decode_who_25);
        dispatcher
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut whos: Vec<_> = self.decoders.keys().copied().collect();
        whos.sort_unstable();
        f.debug_struct("Dispatcher").field("who", &whos).finish()
    }
}

/// WHO 25 multiplexes CEN+ buttons (`2N`) and dry contacts (`3N`).
fn decode_who_25(frame: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    match frame.where_().as_bytes().first() {
        Some(b'2') => cen::decode_cen_plus(frame),
        Some(b'3') => dry_contact::decode(frame),
        _ => Ok(Decoded::new(Payload::Generic, None)),
    }
}
