use std::fmt;
use ring::digest;

pub const HASH_SIZE: usize = 32;

/// Fixed-width 32-byte hash. Used as a value type everywhere a message
/// refers to a chain or an affirmed object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShaHash([u8; HASH_SIZE]);

impl ShaHash {
    pub fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        ShaHash(bytes)
    }

    /// Overwrites the hash with `bytes`, which must be exactly `HASH_SIZE` long.
    pub fn set_bytes(&mut self, bytes: &[u8]) -> Result<(), HashError> {
        if bytes.len() != HASH_SIZE {
            return Err(HashError::InvalidLength {
                expected: HASH_SIZE,
                actual: bytes.len()
            });
        }

        self.0.copy_from_slice(bytes);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8; HASH_SIZE] {
        &mut self.0
    }
}

impl TryFrom<&[u8]> for ShaHash {
    type Error = HashError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let mut hash = ShaHash::default();
        hash.set_bytes(bytes)?;
        Ok(hash)
    }
}

impl fmt::Display for ShaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ShaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShaHash({})", self)
    }
}

#[derive(Debug, PartialEq)]
pub enum HashError {
    InvalidLength { expected: usize, actual: usize }
}

pub fn sha256(data: &[u8]) -> ShaHash {
    let digest = digest::digest(&digest::SHA256, data);
    let mut hash = ShaHash::default();
    hash.as_bytes_mut().copy_from_slice(digest.as_ref());
    hash
}

pub fn double_sha256(data: &[u8]) -> ShaHash {
    let first = sha256(data);
    sha256(first.as_bytes())
}
