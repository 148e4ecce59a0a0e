pub mod encoding;
pub mod conns;
pub mod config;
pub mod crypto;
pub mod logging;
pub mod messages;

pub use crypto::ShaHash;
pub use messages::{AckType, Message, MsgAcknowledgement};
