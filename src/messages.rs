use std::any::Any;
use std::fmt::Debug;
use std::io::{Error, Read, Write};
use std::sync::Arc;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use crate::conns::ConnError;

pub mod ack;

pub use ack::{AckType, MsgAcknowledgement, ACK_PAYLOAD_LEN};

pub const PROTOCOL_VERSION: u32 = 70002;

/// Length of the NUL-padded command field of a frame header.
pub const COMMAND_SIZE: usize = 12;

/// Generic ceiling for application messages that don't declare a tighter bound.
pub const MAX_APP_MSG_PAYLOAD: u32 = 10 * 1024;

/// Hard ceiling for any frame payload, regardless of message type.
pub const MAX_MESSAGE_PAYLOAD: u32 = 32 * 1024 * 1024;

pub const CMD_ACKNOWLEDGEMENT: &str = "ack";

/// The uniform interface every wire message implements. The transport layer
/// only sees this trait: it picks the message by command string, bounds the
/// payload with `max_payload_length` and hands the bytes to `decode`.
pub trait Message : Send + Sync + Debug {
    fn decode(&mut self, r: &mut dyn Read, pver: u32) -> Result<(), Error>;
    fn encode(&self, w: &mut dyn Write, pver: u32) -> Result<(), Error>;
    fn command(&self) -> &'static str;
    fn max_payload_length(&self, pver: u32) -> u32;
    fn as_any(&self) -> &dyn Any;
}

type MessageFactory = fn() -> Box<dyn Message>;

pub struct MessageRegistry {
    factories: DashMap<&'static str, MessageFactory>
}

impl MessageRegistry {
    pub fn new() -> Self {
        MessageRegistry {
            factories: DashMap::new()
        }
    }

    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(CMD_ACKNOWLEDGEMENT, new_acknowledgement);
        registry
    }

    /// Registers `factory` for `command`, replacing any previous registration.
    pub fn register(&self, command: &'static str, factory: MessageFactory) {
        self.factories.insert(command, factory);
    }

    pub fn is_registered(&self, command: &str) -> bool {
        self.factories.contains_key(command)
    }

    pub fn make_empty_message(&self, command: &str) -> Result<Box<dyn Message>, ConnError> {
        match self.factories.get(command) {
            Some(factory) => Ok((*factory.value())()),
            None => Err(ConnError::UnknownCommand(command.to_string()))
        }
    }
}

fn new_acknowledgement() -> Box<dyn Message> {
    Box::new(MsgAcknowledgement::default())
}

impl Default for MessageRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

pub static DEFAULT_REGISTRY: Lazy<Arc<MessageRegistry>> =
    Lazy::new(|| Arc::new(MessageRegistry::with_defaults()));
