use thiserror::Error;

/// A raw frame that matches none of the known OpenWebNet shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// Frames must start with `*` and end with `##`.
    #[error("frame `{frame}` is not delimited by `*` ... `##`")]
    Unterminated { frame: String },

    /// Only digits, `*` and `#` are allowed between the delimiters.
    #[error("frame `{frame}` contains an invalid character {found:?}")]
    InvalidCharacter { frame: String, found: char },

    /// Delimited and well-formed characters, but no grammar rule matched.
    #[error("frame `{frame}` does not match any known message shape")]
    UnknownShape { frame: String },
}

/// A classified frame whose WHO-specific fields could not be interpreted.
///
/// These are never fatal: the event stream logs them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A field the family decoder needs was absent from the frame.
    #[error("WHO {who}: missing {field}")]
    MissingField { who: u32, field: &'static str },

    /// A field was present but not in the expected numeric form.
    #[error("WHO {who}: invalid {field} `{value}`")]
    InvalidField {
        who: u32,
        field: &'static str,
        value: String,
    },

    /// A date or time assembled from the frame does not exist.
    #[error("WHO {who}: invalid date or time in `{frame}`")]
    InvalidDate { who: u32, frame: String },
}

/// Failure to turn a raw frame into a decoded message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Handshake and acknowledgement frames carry no payload.
    #[error("`{0}` is a signaling frame")]
    Signal(crate::frame::Signal),
}
