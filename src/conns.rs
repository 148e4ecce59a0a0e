use std::fmt;
use std::io::Error;
use crate::crypto::double_sha256;
use crate::messages::COMMAND_SIZE;

pub mod framing;
pub mod streams;

/// Magic, command, payload length and checksum.
pub const HEADER_SIZE: usize = 4 + COMMAND_SIZE + 4 + 4;

#[derive(Debug)]
pub enum ConnError {
    IO(Error),
    ReadError(Option<String>),
    WriteError(Option<String>),
    WrongNetwork { expected: u32, actual: u32 },
    UnknownCommand(String),
    MalformedData(String),
    PayloadTooLarge { command: String, length: u32, max: u32 },
    ChecksumMismatch { expected: [u8; 4], actual: [u8; 4] }
}

impl From<Error> for ConnError {
    fn from(err: Error) -> Self {
        ConnError::IO(err)
    }
}

impl fmt::Display for ConnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnError::IO(err) => write!(f, "I/O error: {}", err),
            ConnError::ReadError(Some(msg)) => write!(f, "read error: {}", msg),
            ConnError::ReadError(None) => write!(f, "read error"),
            ConnError::WriteError(Some(msg)) => write!(f, "write error: {}", msg),
            ConnError::WriteError(None) => write!(f, "write error"),
            ConnError::WrongNetwork { expected, actual } =>
                write!(f, "message from wrong network: expected {:#010x}, got {:#010x}", expected, actual),
            ConnError::UnknownCommand(cmd) => write!(f, "unknown command \"{}\"", cmd),
            ConnError::MalformedData(msg) => write!(f, "malformed data: {}", msg),
            ConnError::PayloadTooLarge { command, length, max } =>
                write!(f, "payload of {} bytes for \"{}\" exceeds maximum of {}", length, command, max),
            ConnError::ChecksumMismatch { expected, actual } =>
                write!(f, "payload checksum {:02x?} does not match header checksum {:02x?}", actual, expected)
        }
    }
}

/// The fixed 24-byte header in front of every message payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub magic: u32,
    pub command: String,
    pub length: u32,
    pub checksum: [u8; 4]
}

impl MessageHeader {
    pub fn for_payload(magic: u32, command: &str, payload: &[u8]) -> Self {
        MessageHeader {
            magic,
            command: command.to_string(),
            length: payload.len() as u32,
            checksum: checksum(payload)
        }
    }

    pub fn to_bytes(&self) -> Result<[u8; HEADER_SIZE], ConnError> {
        let command = self.command.as_bytes();
        if command.len() > COMMAND_SIZE || !self.command.is_ascii() {
            return Err(ConnError::MalformedData(
                format!("command \"{}\" is not {} ASCII bytes or fewer", self.command, COMMAND_SIZE)));
        }

        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..4 + command.len()].copy_from_slice(command);
        buf[16..20].copy_from_slice(&self.length.to_le_bytes());
        buf[20..24].copy_from_slice(&self.checksum);
        Ok(buf)
    }

    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, ConnError> {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buf[0..4]);
        let mut length = [0u8; 4];
        length.copy_from_slice(&buf[16..20]);
        let mut checksum = [0u8; 4];
        checksum.copy_from_slice(&buf[20..24]);

        Ok(MessageHeader {
            magic: u32::from_le_bytes(magic),
            command: parse_command(&buf[4..4 + COMMAND_SIZE])?,
            length: u32::from_le_bytes(length),
            checksum
        })
    }
}

/// Commands are ASCII, right-padded with NUL bytes; nothing may follow the padding.
fn parse_command(field: &[u8]) -> Result<String, ConnError> {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());
    if field[end..].iter().any(|b| *b != 0) || !field[..end].is_ascii() {
        return Err(ConnError::MalformedData("command field is not NUL-padded ASCII".to_string()));
    }

    Ok(String::from_utf8_lossy(&field[..end]).into_owned())
}

pub fn checksum(payload: &[u8]) -> [u8; 4] {
    let hash = double_sha256(payload);
    let mut sum = [0u8; 4];
    sum.copy_from_slice(&hash.as_bytes()[0..4]);
    sum
}
