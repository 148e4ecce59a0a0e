use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::encoding;
use crate::logging::{ConsoleLogger, FileLogger, Logger};
use crate::messages::{MAX_MESSAGE_PAYLOAD, PROTOCOL_VERSION};

pub const MAIN_NET_MAGIC: u32 = 0xd9b4bef9;
pub const TEST_NET_MAGIC: u32 = 0x0709110b;

pub trait IsConfiguration {
    fn is_for_testing(&self) -> bool;
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WireConfig {
    pub network_magic: u32,
    pub protocol_version: u32,
    pub max_message_payload: u32,
    pub log_file_path: Option<String>,
    pub for_testing: bool
}

impl Default for WireConfig {
    fn default() -> Self {
        WireConfig {
            network_magic: MAIN_NET_MAGIC,
            protocol_version: PROTOCOL_VERSION,
            max_message_payload: MAX_MESSAGE_PAYLOAD,
            log_file_path: None,
            for_testing: false
        }
    }
}

impl WireConfig {
    pub fn for_test_net() -> Self {
        WireConfig {
            network_magic: TEST_NET_MAGIC,
            for_testing: true,
            ..WireConfig::default()
        }
    }

    pub fn from_json(data: &[u8]) -> Result<Self, Error> {
        encoding::deserialize_json_to::<WireConfig>(data)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }

    /// The frame payload ceiling, never above the protocol-wide maximum.
    pub fn payload_ceiling(&self) -> u32 {
        self.max_message_payload.min(MAX_MESSAGE_PAYLOAD)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let data = encoding::serialize_to_bytes_json(self)?;
        std::fs::write(path, data)
    }

    pub fn logger(&self) -> Arc<dyn Logger> {
        match &self.log_file_path {
            Some(path) => Arc::new(FileLogger::new(path.clone())) as Arc<dyn Logger>,
            None => Arc::new(ConsoleLogger {}) as Arc<dyn Logger>
        }
    }
}

impl IsConfiguration for WireConfig {
    fn is_for_testing(&self) -> bool {
        self.for_testing
    }
}
