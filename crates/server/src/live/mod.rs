//! Live tracking channel: per-connection push loop and its client protocol.

pub mod protocol;
pub mod session;

pub use protocol::{parse_filter_update, ClientMessageError};
pub use session::{CloseReason, LiveSession, SessionPhase};
