//! OpenWebNet frame grammar.
//!
//! Every frame on the wire is ASCII, starts with `*` and ends with `##`.
//! Fields are separated by `*`, parameters are appended to a field with `#`.
//! [`classify`] recognises the handshake signals first and then the five
//! message shapes, in this order:
//!
//! | Shape                 | Form                                           | Family  |
//! |-----------------------|------------------------------------------------|---------|
//! | status                | `*WHO*WHAT[#P]*WHERE[#P]##`                    | event   |
//! | status request        | `*#WHO*WHERE[#P]##`                            | request |
//! | dimension writing     | `*#WHO*[WHERE][#P]*#DIM[#P]*V1*...*Vn##`       | command |
//! | dimension request     | `*#WHO*[WHERE][#P]*DIM##`                      | request |
//! | dimension reply       | `*#WHO*[WHERE][#P]*DIM[#P]*V1*...*Vn##`        | event   |
//!
//! A status frame whose WHAT is `1000` is a command translation rather
//! than an event.
//!
//! ```
//! use ownd_core::frame::{classify, Family, Parsed};
//!
//! let Parsed::Message(msg) = classify("*1*1*12##")? else { unreachable!() };
//! assert_eq!(msg.family(), Family::Event);
//! assert_eq!(msg.who(), 1);
//! assert_eq!(msg.where_(), "12");
//! # Ok::<(), ownd_core::ClassifyError>(())
//! ```

use std::fmt;

use serde::Serialize;

use crate::error::ClassifyError;
use crate::identity::EntityId;

/// Frame terminator.
pub const TERMINATOR: &str = "##";

/// WHAT value marking a status frame as a command translation.
const COMMAND_TRANSLATION: u32 = 1000;

// ── Signals ─────────────────────────────────────────────────────────

/// Handshake and acknowledgement frames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "signal", content = "value", rename_all = "snake_case")]
pub enum Signal {
    /// `*#*1##`
    Ack,
    /// `*#*0##`
    Nack,
    /// `*99*0##`, sent by the client to open a command session.
    CommandSession,
    /// `*99*1##`, sent by the client to open an event session.
    EventSession,
    /// `*#<digits>##`: a legacy nonce, or one side of the HMAC exchange.
    Nonce(String),
    /// `*98*<digit>##`: the gateway asks for HMAC authentication.
    /// The digit selects the hash (`1` for SHA-1, `2` for SHA-256).
    ShaChallenge(u8),
}

impl Signal {
    pub const ACK: &'static str = "*#*1##";
    pub const NACK: &'static str = "*#*0##";
    pub const COMMAND_SESSION: &'static str = "*99*0##";
    pub const EVENT_SESSION: &'static str = "*99*1##";

    /// Wire form of the signal.
    pub fn to_frame(&self) -> String {
        match self {
            Self::Ack => Self::ACK.to_owned(),
            Self::Nack => Self::NACK.to_owned(),
            Self::CommandSession => Self::COMMAND_SESSION.to_owned(),
            Self::EventSession => Self::EVENT_SESSION.to_owned(),
            Self::Nonce(digits) => format!("*#{digits}##"),
            Self::ShaChallenge(code) => format!("*98*{code}##"),
        }
    }

    fn parse(frame: &str) -> Option<Self> {
        match frame {
            Self::ACK => return Some(Self::Ack),
            Self::NACK => return Some(Self::Nack),
            Self::COMMAND_SESSION => return Some(Self::CommandSession),
            Self::EVENT_SESSION => return Some(Self::EventSession),
            _ => {}
        }

        let mut cursor = Cursor::new(frame);
        if cursor.eat_str("*98*") {
            let code = cursor.digits()?;
            cursor.finish()?;
            return match code.as_bytes() {
                [d] => Some(Self::ShaChallenge(d - b'0')),
                _ => None,
            };
        }

        let mut cursor = Cursor::new(frame);
        if cursor.eat_str("*#") {
            let digits = cursor.digits()?;
            cursor.finish()?;
            return Some(Self::Nonce(digits.to_owned()));
        }
        None
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_frame())
    }
}

// ── Family / Shape ──────────────────────────────────────────────────

/// Role of a frame in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Family {
    Signaling,
    Event,
    Command,
    Request,
    CommandTranslation,
}

/// Grammar rule that matched a non-signaling frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Shape {
    Status,
    StatusRequest,
    DimensionWriting,
    DimensionRequest,
    DimensionReply,
}

// ── ClassifiedMessage ───────────────────────────────────────────────

/// A non-signaling frame split into its fields.
///
/// Immutable once built; only [`classify`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedMessage {
    raw: String,
    family: Family,
    shape: Shape,
    who: u32,
    #[serde(rename = "where")]
    where_: String,
    where_params: Vec<String>,
    what: Option<u32>,
    what_params: Vec<String>,
    dimension: Option<u32>,
    dimension_params: Vec<String>,
    dimension_values: Vec<String>,
}

impl ClassifiedMessage {
    /// The frame exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn who(&self) -> u32 {
        self.who
    }

    /// The WHERE field: digits, `#`-prefixed digits, `*`, or empty for
    /// dimension frames addressed to the gateway itself.
    pub fn where_(&self) -> &str {
        &self.where_
    }

    pub fn where_params(&self) -> &[String] {
        &self.where_params
    }

    /// Only status frames carry a WHAT.
    pub fn what(&self) -> Option<u32> {
        self.what
    }

    pub fn what_params(&self) -> &[String] {
        &self.what_params
    }

    /// Only dimension frames carry a DIM.
    pub fn dimension(&self) -> Option<u32> {
        self.dimension
    }

    pub fn dimension_params(&self) -> &[String] {
        &self.dimension_params
    }

    pub fn dimension_values(&self) -> &[String] {
        &self.dimension_values
    }

    pub fn is_status_request(&self) -> bool {
        self.family == Family::Request
    }

    /// Bus interface for frames addressed through an interface module.
    ///
    /// Lighting, automation and CEN frames use `WHERE#4#<iface>`.
    pub fn interface(&self) -> Option<&str> {
        if !matches!(self.who, 1 | 2 | 15) {
            return None;
        }
        match self.where_params.as_slice() {
            [first, iface, ..] if first == "4" => Some(iface.as_str()),
            _ => None,
        }
    }

    /// General address: every actuator of the family (lighting/automation).
    pub fn is_general(&self) -> bool {
        matches!(self.who, 1 | 2) && self.where_ == "0"
    }

    pub fn is_group(&self) -> bool {
        self.where_.starts_with('#')
    }

    pub fn group(&self) -> Option<u32> {
        self.where_.strip_prefix('#')?.parse().ok()
    }

    /// Area addresses are `00`, `100` or a single digit `1`..=`9`.
    pub fn is_area(&self) -> bool {
        match self.where_.as_str() {
            "00" | "100" => true,
            w => w.len() == 1 && matches!(w.as_bytes()[0], b'1'..=b'9'),
        }
    }

    pub fn area(&self) -> Option<u32> {
        if !self.is_area() {
            return None;
        }
        if self.where_ == "100" {
            Some(10)
        } else {
            self.where_.parse().ok()
        }
    }

    /// Stable identifier of the addressed entity.
    pub fn entity_id(&self) -> EntityId {
        EntityId::for_message(self)
    }
}

impl fmt::Display for ClassifiedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ── Parsed ──────────────────────────────────────────────────────────

/// Result of classifying one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Parsed {
    Signal(Signal),
    Message(ClassifiedMessage),
}

impl Parsed {
    pub fn family(&self) -> Family {
        match self {
            Self::Signal(_) => Family::Signaling,
            Self::Message(m) => m.family(),
        }
    }

    pub fn as_signal(&self) -> Option<&Signal> {
        match self {
            Self::Signal(s) => Some(s),
            Self::Message(_) => None,
        }
    }
}

/// Classify a single raw frame.
pub fn classify(raw: &str) -> Result<Parsed, ClassifyError> {
    if !raw.starts_with('*') || !raw.ends_with(TERMINATOR) || raw.len() < 4 {
        return Err(ClassifyError::Unterminated {
            frame: raw.to_owned(),
        });
    }
    if let Some(found) = raw.chars().find(|c| !matches!(c, '0'..='9' | '*' | '#')) {
        return Err(ClassifyError::InvalidCharacter {
            frame: raw.to_owned(),
            found,
        });
    }

    if let Some(signal) = Signal::parse(raw) {
        return Ok(Parsed::Signal(signal));
    }

    let fields = parse_status(raw)
        .or_else(|| parse_status_request(raw))
        .or_else(|| parse_dimension(raw))
        .ok_or_else(|| ClassifyError::UnknownShape {
            frame: raw.to_owned(),
        })?;

    Ok(Parsed::Message(fields.into_message(raw)))
}

// ── Grammar ─────────────────────────────────────────────────────────

struct Fields {
    shape: Shape,
    who: u32,
    where_: String,
    where_params: Vec<String>,
    what: Option<u32>,
    what_params: Vec<String>,
    dimension: Option<u32>,
    dimension_params: Vec<String>,
    dimension_values: Vec<String>,
}

impl Fields {
    fn new(shape: Shape, who: u32, where_: String, where_params: Vec<String>) -> Self {
        Self {
            shape,
            who,
            where_,
            where_params,
            what: None,
            what_params: Vec::new(),
            dimension: None,
            dimension_params: Vec::new(),
            dimension_values: Vec::new(),
        }
    }

    fn into_message(self, raw: &str) -> ClassifiedMessage {
        let family = match self.shape {
            Shape::Status if self.what == Some(COMMAND_TRANSLATION) => Family::CommandTranslation,
            Shape::Status | Shape::DimensionReply => Family::Event,
            Shape::StatusRequest | Shape::DimensionRequest => Family::Request,
            Shape::DimensionWriting => Family::Command,
        };
        ClassifiedMessage {
            raw: raw.to_owned(),
            family,
            shape: self.shape,
            who: self.who,
            where_: self.where_,
            where_params: self.where_params,
            what: self.what,
            what_params: self.what_params,
            dimension: self.dimension,
            dimension_params: self.dimension_params,
            dimension_values: self.dimension_values,
        }
    }
}

/// `*WHO*WHAT[#P]*(WHERE|*)[#P]##`
fn parse_status(raw: &str) -> Option<Fields> {
    let mut c = Cursor::new(raw);
    c.expect(b'*')?;
    let who = c.number()?;
    c.expect(b'*')?;
    let what = c.number()?;
    let what_params = c.params();
    c.expect(b'*')?;
    let where_ = if c.eat(b'*') {
        "*".to_owned()
    } else {
        c.location()?
    };
    let where_params = c.params();
    c.finish()?;

    let mut fields = Fields::new(Shape::Status, who, where_, where_params);
    fields.what = Some(what);
    fields.what_params = what_params;
    Some(fields)
}

/// `*#WHO*WHERE[#P]##`
fn parse_status_request(raw: &str) -> Option<Fields> {
    let mut c = Cursor::new(raw);
    c.expect_str("*#")?;
    let who = c.number()?;
    c.expect(b'*')?;
    let where_ = c.location()?;
    let where_params = c.params();
    c.finish()?;
    Some(Fields::new(Shape::StatusRequest, who, where_, where_params))
}

/// The three dimension shapes share the `*#WHO*[WHERE][#P]*` prefix and
/// are told apart by what follows it.
fn parse_dimension(raw: &str) -> Option<Fields> {
    let mut c = Cursor::new(raw);
    c.expect_str("*#")?;
    let who = c.number()?;
    c.expect(b'*')?;
    let where_ = c.optional_location();
    let where_params = c.params();
    c.expect(b'*')?;

    let writing = c.eat(b'#');
    let dimension = c.number()?;
    let dimension_params = c.params();

    if !writing && dimension_params.is_empty() && c.finish().is_some() {
        let mut fields = Fields::new(Shape::DimensionRequest, who, where_, where_params);
        fields.dimension = Some(dimension);
        return Some(fields);
    }

    let dimension_values = c.values()?;
    c.finish()?;

    let shape = if writing {
        Shape::DimensionWriting
    } else {
        Shape::DimensionReply
    };
    let mut fields = Fields::new(shape, who, where_, where_params);
    fields.dimension = Some(dimension);
    fields.dimension_params = dimension_params;
    fields.dimension_values = dimension_values;
    Some(fields)
}

/// Byte cursor over an ASCII frame. Every method either consumes what it
/// matched or leaves the position untouched.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos + offset).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek_at(0) == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.text[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        self.eat(byte).then_some(())
    }

    fn expect_str(&mut self, s: &str) -> Option<()> {
        self.eat_str(s).then_some(())
    }

    /// Zero or more ASCII digits.
    fn digits0(&mut self) -> &'a str {
        let text = self.text;
        let start = self.pos;
        while self.peek_at(0).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        &text[start..self.pos]
    }

    /// One or more ASCII digits.
    fn digits(&mut self) -> Option<&'a str> {
        let digits = self.digits0();
        (!digits.is_empty()).then_some(digits)
    }

    fn number(&mut self) -> Option<u32> {
        self.digits()?.parse().ok()
    }

    /// `#?\d+`
    fn location(&mut self) -> Option<String> {
        let start = self.pos;
        let hashed = self.eat(b'#');
        match self.digits() {
            Some(digits) if hashed => Some(format!("#{digits}")),
            Some(digits) => Some(digits.to_owned()),
            None => {
                self.pos = start;
                None
            }
        }
    }

    fn optional_location(&mut self) -> String {
        self.location().unwrap_or_default()
    }

    /// `(#\d+)*`
    fn params(&mut self) -> Vec<String> {
        let mut params = Vec::new();
        while self.peek_at(0) == Some(b'#') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            params.push(self.digits0().to_owned());
        }
        params
    }

    /// `(\*\d*)+`
    fn values(&mut self) -> Option<Vec<String>> {
        let mut values = Vec::new();
        while self.eat(b'*') {
            values.push(self.digits0().to_owned());
        }
        (!values.is_empty()).then_some(values)
    }

    /// Consume the terminator and require end of input.
    fn finish(&mut self) -> Option<()> {
        (self.text.get(self.pos..) == Some(TERMINATOR)).then(|| {
            self.pos = self.text.len();
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn message(raw: &str) -> ClassifiedMessage {
        match classify(raw) {
            Ok(Parsed::Message(m)) => m,
            other => panic!("expected a message for {raw}, got {other:?}"),
        }
    }

    #[test]
    fn signals_are_recognised_before_messages() {
        assert_eq!(classify("*#*1##"), Ok(Parsed::Signal(Signal::Ack)));
        assert_eq!(classify("*#*0##"), Ok(Parsed::Signal(Signal::Nack)));
        assert_eq!(classify("*99*0##"), Ok(Parsed::Signal(Signal::CommandSession)));
        assert_eq!(classify("*99*1##"), Ok(Parsed::Signal(Signal::EventSession)));
        assert_eq!(classify("*98*2##"), Ok(Parsed::Signal(Signal::ShaChallenge(2))));
        assert_eq!(
            classify("*#603356072##"),
            Ok(Parsed::Signal(Signal::Nonce("603356072".into())))
        );
    }

    #[test]
    fn signal_wire_forms() {
        assert_eq!(Signal::Ack.to_string(), "*#*1##");
        assert_eq!(Signal::Nonce("42".into()).to_frame(), "*#42##");
        assert_eq!(Signal::ShaChallenge(1).to_frame(), "*98*1##");
    }

    #[test]
    fn status_frame_fields() {
        let m = message("*1*1*12##");
        assert_eq!(m.family(), Family::Event);
        assert_eq!(m.shape(), Shape::Status);
        assert_eq!(m.who(), 1);
        assert_eq!(m.what(), Some(1));
        assert_eq!(m.where_(), "12");
        assert!(m.where_params().is_empty());
        assert_eq!(m.dimension(), None);
    }

    #[test]
    fn status_frame_with_params_and_interface() {
        let m = message("*2*11#10#001*12#4#01##");
        assert_eq!(m.what(), Some(11));
        assert_eq!(m.what_params(), ["10", "001"]);
        assert_eq!(m.where_(), "12");
        assert_eq!(m.where_params(), ["4", "01"]);
        assert_eq!(m.interface(), Some("01"));
    }

    #[test]
    fn status_frame_with_star_where() {
        let m = message("*5*1**##");
        assert_eq!(m.who(), 5);
        assert_eq!(m.where_(), "*");
    }

    #[test]
    fn what_1000_is_a_command_translation() {
        let m = message("*1*1000#1*12##");
        assert_eq!(m.family(), Family::CommandTranslation);
    }

    #[test]
    fn status_request_shape() {
        let m = message("*#1*12##");
        assert_eq!(m.family(), Family::Request);
        assert_eq!(m.shape(), Shape::StatusRequest);
        assert!(m.is_status_request());
        assert_eq!(m.what(), None);
    }

    #[test]
    fn dimension_request_shape() {
        let m = message("*#18*51*113##");
        assert_eq!(m.shape(), Shape::DimensionRequest);
        assert_eq!(m.family(), Family::Request);
        assert_eq!(m.dimension(), Some(113));
        assert!(m.dimension_values().is_empty());
    }

    #[test]
    fn dimension_reply_shape() {
        let m = message("*#1*12*2*1*20*35##");
        assert_eq!(m.shape(), Shape::DimensionReply);
        assert_eq!(m.family(), Family::Event);
        assert_eq!(m.dimension(), Some(2));
        assert_eq!(m.dimension_values(), ["1", "20", "35"]);
    }

    #[test]
    fn dimension_reply_with_dimension_params() {
        let m = message("*#18*51*511#7#15*12*210##");
        assert_eq!(m.dimension(), Some(511));
        assert_eq!(m.dimension_params(), ["7", "15"]);
        assert_eq!(m.dimension_values(), ["12", "210"]);
    }

    #[test]
    fn dimension_writing_with_empty_where_and_empty_value() {
        let m = message("*#13**#0*10*20*30*001*##");
        assert_eq!(m.family(), Family::Command);
        assert_eq!(m.shape(), Shape::DimensionWriting);
        assert_eq!(m.where_(), "");
        assert_eq!(m.dimension(), Some(0));
        assert_eq!(m.dimension_values(), ["10", "20", "30", "001", ""]);
    }

    #[test]
    fn hashed_where_with_params() {
        let m = message("*#4*#0#1*0*0215##");
        assert_eq!(m.where_(), "#0");
        assert_eq!(m.where_params(), ["1"]);
        assert!(m.is_group());
    }

    #[test]
    fn addressing_predicates() {
        assert!(message("*1*1*0##").is_general());
        assert!(!message("*4*1*0##").is_general());
        assert_eq!(message("*1*1*#5##").group(), Some(5));
        assert_eq!(message("*1*1*100##").area(), Some(10));
        assert_eq!(message("*1*1*00##").area(), Some(0));
        assert_eq!(message("*1*1*7##").area(), Some(7));
        assert_eq!(message("*1*1*17##").area(), None);
        assert!(!message("*1*1*0##").is_area());
    }

    #[test]
    fn interface_only_for_interface_families() {
        assert_eq!(message("*4*1*12#4#01##").interface(), None);
        assert_eq!(message("*1*1*12#4##").interface(), None);
        assert_eq!(message("*15*1*12#4#02##").interface(), Some("02"));
    }

    #[test]
    fn rejects_malformed_frames() {
        assert!(matches!(
            classify("*1*1*12"),
            Err(ClassifyError::Unterminated { .. })
        ));
        assert!(matches!(
            classify("1*1*12##"),
            Err(ClassifyError::Unterminated { .. })
        ));
        assert!(matches!(
            classify("*1*a*12##"),
            Err(ClassifyError::InvalidCharacter { found: 'a', .. })
        ));
        assert!(matches!(
            classify("*1*1##"),
            Err(ClassifyError::UnknownShape { .. })
        ));
        assert!(matches!(
            classify("*#1*12*#1##"),
            Err(ClassifyError::UnknownShape { .. })
        ));
        assert!(matches!(classify("##"), Err(ClassifyError::Unterminated { .. })));
    }

    #[test]
    fn display_is_the_raw_frame() {
        assert_eq!(message("*#1*12##").to_string(), "*#1*12##");
    }
}
