use std::io::{Error, ErrorKind, Read, Write};
use crate::crypto::ShaHash;

/// A fixed-width value that can be read from and written to the wire.
///
/// Integers are little-endian; byte arrays and hashes are written raw.
/// Reads fill the receiver in place, so a failed read can leave it
/// partially overwritten.
pub trait WireElement {
    fn read_element<R: Read + ?Sized>(&mut self, r: &mut R) -> Result<(), Error>;
    fn write_element<W: Write + ?Sized>(&self, w: &mut W) -> Result<(), Error>;
}

impl WireElement for u8 {
    fn read_element<R: Read + ?Sized>(&mut self, r: &mut R) -> Result<(), Error> {
        let mut buf = [0u8; 1];
        r.read_exact(&mut buf)?;
        *self = buf[0];
        Ok(())
    }

    fn write_element<W: Write + ?Sized>(&self, w: &mut W) -> Result<(), Error> {
        w.write_all(&[*self])
    }
}

impl WireElement for u32 {
    fn read_element<R: Read + ?Sized>(&mut self, r: &mut R) -> Result<(), Error> {
        let mut buf = [0u8; 4];
        r.read_exact(&mut buf)?;
        *self = u32::from_le_bytes(buf);
        Ok(())
    }

    fn write_element<W: Write + ?Sized>(&self, w: &mut W) -> Result<(), Error> {
        w.write_all(&self.to_le_bytes())
    }
}

impl WireElement for u64 {
    fn read_element<R: Read + ?Sized>(&mut self, r: &mut R) -> Result<(), Error> {
        let mut buf = [0u8; 8];
        r.read_exact(&mut buf)?;
        *self = u64::from_le_bytes(buf);
        Ok(())
    }

    fn write_element<W: Write + ?Sized>(&self, w: &mut W) -> Result<(), Error> {
        w.write_all(&self.to_le_bytes())
    }
}

impl<const N: usize> WireElement for [u8; N] {
    fn read_element<R: Read + ?Sized>(&mut self, r: &mut R) -> Result<(), Error> {
        r.read_exact(self)
    }

    fn write_element<W: Write + ?Sized>(&self, w: &mut W) -> Result<(), Error> {
        w.write_all(self)
    }
}

impl WireElement for ShaHash {
    fn read_element<R: Read + ?Sized>(&mut self, r: &mut R) -> Result<(), Error> {
        self.as_bytes_mut().read_element(r)
    }

    fn write_element<W: Write + ?Sized>(&self, w: &mut W) -> Result<(), Error> {
        self.as_bytes().write_element(w)
    }
}

pub fn serialize_to_bytes_json<T>(obj: &T) -> Result<Vec<u8>, Error>
    where T: serde::Serialize
{
    match serde_json::to_vec(obj) {
        Ok(r) => Ok(r),
        Err(e) => Err(Error::new(ErrorKind::InvalidData, e))
    }
}

pub fn deserialize_json_to<'a, T>(read: &'a [u8]) -> Result<T, Error>
    where T: serde::Deserialize<'a>
{
    match serde_json::from_slice::<'a, T>(read) {
        Ok(r) => Ok(r),
        Err(e) => Err(Error::new(ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::HASH_SIZE;

    #[test]
    fn integers_are_written_little_endian() {
        let mut buf = Vec::new();
        0x0102_0304u32.write_element(&mut buf).unwrap();
        0x0A0B_0C0D_0E0F_1011u64.write_element(&mut buf).unwrap();

        assert_eq!(buf, vec![0x04, 0x03, 0x02, 0x01,
                             0x11, 0x10, 0x0F, 0x0E, 0x0D, 0x0C, 0x0B, 0x0A]);
    }

    #[test]
    fn integers_read_back_from_their_encoding() {
        let mut buf = Vec::new();
        u64::MAX.write_element(&mut buf).unwrap();
        77u32.write_element(&mut buf).unwrap();
        200u8.write_element(&mut buf).unwrap();

        let mut reader = buf.as_slice();
        let (mut a, mut b, mut c) = (0u64, 0u32, 0u8);
        a.read_element(&mut reader).unwrap();
        b.read_element(&mut reader).unwrap();
        c.read_element(&mut reader).unwrap();

        assert_eq!((a, b, c), (u64::MAX, 77, 200));
        assert!(reader.is_empty());
    }

    #[test]
    fn hash_is_written_raw() {
        let hash = ShaHash::from_bytes([0xAB; HASH_SIZE]);
        let mut buf = Vec::new();
        hash.write_element(&mut buf).unwrap();
        assert_eq!(buf, vec![0xAB; HASH_SIZE]);
    }

    #[test]
    fn short_read_returns_unexpected_eof() {
        let mut value = 0u64;
        let mut reader: &[u8] = &[1, 2, 3];

        let err = value.read_element(&mut reader).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn array_read_short_returns_unexpected_eof() {
        let mut sig = [0u8; 64];
        let mut reader: &[u8] = &[5u8; 63];

        let err = sig.read_element(&mut reader).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn deserialize_json_to_maps_bad_input_to_invalid_data() {
        let result = deserialize_json_to::<Vec<u32>>(b"{not json");
        assert!(result.is_err_and(|err| err.kind() == ErrorKind::InvalidData));
    }

    #[test]
    fn json_helpers_round_trip_a_value() {
        let bytes = serialize_to_bytes_json(&vec![1u32, 2, 3]).unwrap();
        let back: Vec<u32> = deserialize_json_to(&bytes).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
