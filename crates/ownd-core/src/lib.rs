// ownd-core: OpenWebNet frame grammar, typed message decoding and command builders.
//
// Pure data layer: nothing here touches the network. `ownd-api` feeds raw
// frames in and sends the frames built by `command` out.

pub mod command;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod identity;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::Command;
pub use dispatch::{Decoded, Dispatcher, OwnMessage};
pub use error::{ClassifyError, DecodeError, FrameError};
pub use frame::{ClassifiedMessage, Family, Parsed, Shape, Signal, classify};
pub use identity::EntityId;
pub use model::Payload;
