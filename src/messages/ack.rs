use std::any::Any;
use std::io::{Error, Read, Write};
use strum_macros::{Display, EnumCount, EnumIter, FromRepr};
use crate::crypto::{self, ShaHash, HASH_SIZE};
use crate::encoding::WireElement;
use crate::messages::{Message, CMD_ACKNOWLEDGEMENT, PROTOCOL_VERSION};

pub const SIGNATURE_SIZE: usize = 64;

/// Encoded size of an acknowledgement: height, chain id, index,
/// affirmation, serial hash and signature.
pub const ACK_PAYLOAD_LEN: u32 = (8 + HASH_SIZE + 4 + HASH_SIZE + HASH_SIZE + SIGNATURE_SIZE) as u32;

/// Kinds of acknowledgement. The discriminants are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount, FromRepr)]
#[repr(u8)]
pub enum AckType {
    CommitEntry = 0,
    RevealEntry,
    CommitChain,
    RevealChain,
    FactoidTx,
    EndMinute1,
    EndMinute2,
    EndMinute3,
    EndMinute4,
    EndMinute5,
    EndMinute6,
    EndMinute7,
    EndMinute8,
    EndMinute9,
    EndMinute10
}

impl AckType {
    /// Marker closing minute `minute` (1 to 10) of a block period.
    pub fn end_of_minute(minute: u8) -> Option<AckType> {
        match minute {
            1..=10 => AckType::from_repr(AckType::EndMinute1 as u8 + minute - 1),
            _ => None
        }
    }

    pub fn is_end_of_minute(&self) -> bool {
        self.minute().is_some()
    }

    pub fn minute(&self) -> Option<u8> {
        let tag = *self as u8;
        let first = AckType::EndMinute1 as u8;
        (tag >= first).then(|| tag - first + 1)
    }
}

impl From<AckType> for u8 {
    fn from(ack_type: AckType) -> u8 {
        ack_type as u8
    }
}

/// One node's acknowledgement of a ledger event.
///
/// `ack_type` is not part of the 172-byte wire layout: peers carry it out of
/// band, so `decode` never touches it and two acknowledgements differing only
/// in `ack_type` share the same identity hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgAcknowledgement {
    pub height: u64,
    pub chain_id: ShaHash,
    pub index: u32,
    pub ack_type: u8,
    pub affirmation: ShaHash,
    pub serial_hash: [u8; HASH_SIZE],
    pub signature: [u8; SIGNATURE_SIZE]
}

impl MsgAcknowledgement {
    /// Builds an acknowledgement with the chain id, serial hash and signature
    /// zeroed; the caller fills them in before sending. `ack_type` is taken
    /// as-is, see `kind` for the checked view.
    pub fn new(height: u64, index: u32, affirmation: ShaHash, ack_type: u8) -> Self {
        MsgAcknowledgement {
            height,
            index,
            affirmation,
            ack_type,
            ..MsgAcknowledgement::default()
        }
    }

    pub fn kind(&self) -> Option<AckType> {
        AckType::from_repr(self.ack_type)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::with_capacity(ACK_PAYLOAD_LEN as usize);
        self.encode(&mut buf, PROTOCOL_VERSION)?;
        Ok(buf)
    }

    /// Identity hash: SHA-256 over the message's own encoding. Computed fresh
    /// on every call.
    pub fn sha(&self) -> Result<ShaHash, Error> {
        let buf = self.to_bytes()?;
        Ok(crypto::sha256(&buf))
    }
}

impl Default for MsgAcknowledgement {
    fn default() -> Self {
        MsgAcknowledgement {
            height: 0,
            chain_id: ShaHash::default(),
            index: 0,
            ack_type: 0,
            affirmation: ShaHash::default(),
            serial_hash: [0u8; HASH_SIZE],
            signature: [0u8; SIGNATURE_SIZE]
        }
    }
}

impl Message for MsgAcknowledgement {
    fn decode(&mut self, r: &mut dyn Read, _pver: u32) -> Result<(), Error> {
        self.height.read_element(r)?;
        self.chain_id.read_element(r)?;
        self.index.read_element(r)?;
        self.affirmation.read_element(r)?;
        self.serial_hash.read_element(r)?;
        self.signature.read_element(r)
    }

    fn encode(&self, w: &mut dyn Write, _pver: u32) -> Result<(), Error> {
        self.height.write_element(w)?;
        self.chain_id.write_element(w)?;
        self.index.write_element(w)?;
        self.affirmation.write_element(w)?;
        self.serial_hash.write_element(w)?;
        self.signature.write_element(w)
    }

    fn command(&self) -> &'static str {
        CMD_ACKNOWLEDGEMENT
    }

    fn max_payload_length(&self, _pver: u32) -> u32 {
        ACK_PAYLOAD_LEN
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
