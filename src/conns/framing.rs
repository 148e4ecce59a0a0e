use std::io::{Read, Write};
use crate::conns::{checksum, ConnError, MessageHeader, HEADER_SIZE};
use crate::messages::{Message, MessageRegistry, MAX_MESSAGE_PAYLOAD};

/// Encodes `msg` into a header-prefixed frame.
pub fn frame_message(msg: &dyn Message, pver: u32, magic: u32) -> Result<Vec<u8>, ConnError> {
    let mut payload = Vec::new();
    msg.encode(&mut payload, pver)?;

    let length = payload.len() as u32;
    let max = msg.max_payload_length(pver).min(MAX_MESSAGE_PAYLOAD);
    if payload.len() > max as usize {
        return Err(ConnError::PayloadTooLarge { command: msg.command().to_string(), length, max });
    }

    let header = MessageHeader::for_payload(magic, msg.command(), &payload);
    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&header.to_bytes()?);
    frame.extend_from_slice(&payload);
    Ok(frame)
}

pub fn write_message<W: Write + ?Sized>(w: &mut W, msg: &dyn Message, pver: u32, magic: u32)
    -> Result<usize, ConnError> {
    let frame = frame_message(msg, pver, magic)?;
    w.write_all(&frame)?;
    Ok(frame.len())
}

/// Validates a parsed header against the expected network and the payload
/// bounds, and returns an empty message ready to decode the payload into.
/// Runs before any payload byte is read.
pub fn check_header(header: &MessageHeader,
                    pver: u32,
                    magic: u32,
                    max_payload: u32,
                    registry: &MessageRegistry) -> Result<Box<dyn Message>, ConnError> {
    if header.magic != magic {
        return Err(ConnError::WrongNetwork { expected: magic, actual: header.magic });
    }

    let msg = registry.make_empty_message(&header.command)?;

    let max = msg.max_payload_length(pver).min(max_payload).min(MAX_MESSAGE_PAYLOAD);
    if header.length > max {
        return Err(ConnError::PayloadTooLarge {
            command: header.command.clone(),
            length: header.length,
            max
        });
    }

    Ok(msg)
}

/// Verifies the checksum and decodes `payload` into `msg`.
pub fn decode_payload(header: &MessageHeader,
                      mut msg: Box<dyn Message>,
                      payload: &[u8],
                      pver: u32) -> Result<Box<dyn Message>, ConnError> {
    let actual = checksum(payload);
    if actual != header.checksum {
        return Err(ConnError::ChecksumMismatch { expected: header.checksum, actual });
    }

    let mut reader = payload;
    msg.decode(&mut reader, pver)?;
    Ok(msg)
}

pub fn read_message<R: Read + ?Sized>(r: &mut R,
                                      pver: u32,
                                      magic: u32,
                                      registry: &MessageRegistry) -> Result<Box<dyn Message>, ConnError> {
    let mut header_bytes = [0u8; HEADER_SIZE];
    r.read_exact(&mut header_bytes)?;
    let header = MessageHeader::from_bytes(&header_bytes)?;

    let msg = check_header(&header, pver, magic, MAX_MESSAGE_PAYLOAD, registry)?;

    let mut payload = vec![0u8; header.length as usize];
    r.read_exact(&mut payload)?;
    decode_payload(&header, msg, &payload, pver)
}
