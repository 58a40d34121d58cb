//! Primitive EBML codec
//!
//! Reads the numeric and text encodings used by EBML from the current
//! position of a [`ByteSource`]:
//! - self-describing variable-length unsigned integers (VINTs)
//! - big-endian fixed-width unsigned integers of 0..=8 bytes
//! - big-endian i16
//! - big-endian IEEE-754 f32/f64
//! - fixed-length byte buffers and strings
//!
//! Every fixed-length read advances by exactly the requested number of bytes
//! or fails with [`MatroskaError::Truncated`].

use bytes::Bytes;

use crate::error::{MatroskaError, Result};
use crate::source::ByteSource;

/// Maximum VINT length in bytes
pub const MAX_VINT_LENGTH: usize = 8;

/// Text encoding of a string element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Ascii,
    Utf8,
}

/// Cursor-based reader over a byte source
pub struct EbmlReader<S> {
    source: S,
}

impl<S: ByteSource> EbmlReader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Current absolute position
    pub fn position(&self) -> u64 {
        self.source.position()
    }

    /// Total stream length
    pub fn length(&self) -> u64 {
        self.source.length()
    }

    /// Bytes left between the cursor and the end of the stream
    pub fn remaining(&self) -> u64 {
        self.length().saturating_sub(self.position())
    }

    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.source.seek_to(offset)?;
        Ok(())
    }

    /// Skip `count` bytes forward
    pub fn skip(&mut self, count: u64) -> Result<()> {
        let delta = i64::try_from(count).unwrap_or(i64::MAX);
        self.source.seek_by(delta)?;
        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Read until `buf` is full or the source is exhausted
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.source.read_into(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let offset = self.position();
        let got = self.fill(buf)?;
        if got < buf.len() {
            return Err(MatroskaError::Truncated {
                offset,
                wanted: buf.len() as u64,
                got: got as u64,
            });
        }
        Ok(())
    }

    /// Read a variable-length unsigned integer.
    ///
    /// The position of the highest set bit of the first byte gives the total
    /// length. With `keep_marker` the length-marker bit stays in the value
    /// (element ids); without it the bit is cleared (sizes, track numbers).
    ///
    /// Returns `None` when no marker bit is set in the first byte or the
    /// stream ends before the integer is complete.
    pub fn read_var_uint(&mut self, keep_marker: bool) -> Result<Option<u64>> {
        let mut first = [0u8; 1];
        if self.fill(&mut first)? == 0 {
            return Ok(None);
        }

        let first = first[0];
        if first == 0 {
            tracing::trace!(offset = self.position() - 1, "invalid VINT marker byte");
            return Ok(None);
        }

        let length = first.leading_zeros() as usize + 1;
        let mut data = [0u8; MAX_VINT_LENGTH];
        data[0] = if keep_marker {
            first
        } else {
            first & (0xFF_u32 >> length) as u8
        };

        if length > 1 && self.fill(&mut data[1..length])? < length - 1 {
            tracing::trace!(length, "stream ended inside VINT");
            return Ok(None);
        }

        Ok(Some(big_endian_to_u64(&data[..length])))
    }

    /// Read a big-endian unsigned integer of `length` bytes (0..=8)
    pub fn read_fixed_uint(&mut self, length: u64) -> Result<u64> {
        if length > 8 {
            return Err(MatroskaError::IntegerTooWide(length));
        }
        let mut data = [0u8; 8];
        let data = &mut data[..length as usize];
        self.read_exact(data)?;
        Ok(big_endian_to_u64(data))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut data = [0u8; 1];
        self.read_exact(&mut data)?;
        Ok(data[0])
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let mut data = [0u8; 2];
        self.read_exact(&mut data)?;
        Ok(i16::from_be_bytes(data))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let mut data = [0u8; 4];
        self.read_exact(&mut data)?;
        Ok(f32::from_bits(u32::from_be_bytes(data)))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let mut data = [0u8; 8];
        self.read_exact(&mut data)?;
        Ok(f64::from_bits(u64::from_be_bytes(data)))
    }

    /// Read `length` raw bytes.
    ///
    /// Lengths larger than what is left in the stream fail before any buffer
    /// is allocated, so a corrupt size field cannot trigger a huge allocation.
    pub fn read_bytes(&mut self, length: u64) -> Result<Bytes> {
        let remaining = self.remaining();
        if length > remaining {
            return Err(MatroskaError::Truncated {
                offset: self.position(),
                wanted: length,
                got: remaining,
            });
        }
        let mut buffer = vec![0u8; length as usize];
        self.read_exact(&mut buffer)?;
        Ok(Bytes::from(buffer))
    }

    /// Read a fixed-length string, dropping trailing NUL padding
    pub fn read_string(&mut self, length: u64, encoding: TextEncoding) -> Result<String> {
        let data = self.read_bytes(length)?;
        let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let data = &data[..end];

        Ok(match encoding {
            TextEncoding::Utf8 => String::from_utf8_lossy(data).into_owned(),
            TextEncoding::Ascii => data
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { '?' })
                .collect(),
        })
    }
}

/// Assemble big-endian bytes into a u64
fn big_endian_to_u64(data: &[u8]) -> u64 {
    data.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SeekableSource;
    use crate::tests::fixtures::encode_var_uint;
    use std::io::Cursor;

    fn reader(data: Vec<u8>) -> EbmlReader<SeekableSource<Cursor<Vec<u8>>>> {
        EbmlReader::new(SeekableSource::new(Cursor::new(data)).unwrap())
    }

    #[test]
    fn test_var_uint_roundtrip_all_lengths() {
        for length in 1..=8usize {
            let max = (1u64 << (7 * length)) - 1;
            for value in [0, 1, max / 2, max] {
                let encoded = encode_var_uint(value, length);
                assert_eq!(encoded.len(), length);

                let mut r = reader(encoded.clone());
                assert_eq!(r.read_var_uint(false).unwrap(), Some(value));
                assert_eq!(r.position(), length as u64);

                // Marker kept: the value carries the marker bit of the first byte
                let marker = 1u64 << (8 * length - length);
                let mut r = reader(encoded);
                assert_eq!(r.read_var_uint(true).unwrap(), Some(value | marker));
            }
        }
    }

    #[test]
    fn test_var_uint_element_id_keeps_marker() {
        let mut r = reader(vec![0x1A, 0x45, 0xDF, 0xA3]);
        assert_eq!(r.read_var_uint(true).unwrap(), Some(0x1A45_DFA3));

        let mut r = reader(vec![0x1A, 0x45, 0xDF, 0xA3]);
        assert_eq!(r.read_var_uint(false).unwrap(), Some(0x0A45_DFA3));
    }

    #[test]
    fn test_var_uint_invalid_and_eof() {
        assert_eq!(reader(vec![0x00, 0x81]).read_var_uint(false).unwrap(), None);
        assert_eq!(reader(vec![]).read_var_uint(true).unwrap(), None);
        // 2-byte VINT with only the first byte present
        assert_eq!(reader(vec![0x40]).read_var_uint(false).unwrap(), None);
    }

    #[test]
    fn test_fixed_uint() {
        let mut r = reader(vec![0x0F, 0x42, 0x40, 0xFF]);
        assert_eq!(r.read_fixed_uint(3).unwrap(), 1_000_000);
        assert_eq!(r.read_fixed_uint(0).unwrap(), 0);
        assert_eq!(r.read_fixed_uint(1).unwrap(), 0xFF);
    }

    #[test]
    fn test_fixed_uint_too_wide() {
        let mut r = reader(vec![0; 16]);
        assert!(matches!(
            r.read_fixed_uint(9),
            Err(MatroskaError::IntegerTooWide(9))
        ));
    }

    #[test]
    fn test_short_read_is_truncated_error() {
        let mut r = reader(vec![0x01, 0x02]);
        match r.read_fixed_uint(4) {
            Err(MatroskaError::Truncated { offset, wanted, got }) => {
                assert_eq!(offset, 0);
                assert_eq!(wanted, 4);
                assert_eq!(got, 2);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_read_bytes_refuses_oversized_length() {
        let mut r = reader(vec![1, 2, 3]);
        assert!(matches!(
            r.read_bytes(u64::MAX),
            Err(MatroskaError::Truncated { got: 3, .. })
        ));
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_read_i16() {
        let mut r = reader(vec![0xFF, 0x9C, 0x00, 0x64]);
        assert_eq!(r.read_i16().unwrap(), -100);
        assert_eq!(r.read_i16().unwrap(), 100);
    }

    #[test]
    fn test_read_floats_big_endian() {
        let mut data = 5000.0f32.to_be_bytes().to_vec();
        data.extend_from_slice(&1234.5f64.to_be_bytes());
        let mut r = reader(data);
        assert_eq!(r.read_f32().unwrap(), 5000.0);
        assert_eq!(r.read_f64().unwrap(), 1234.5);
    }

    #[test]
    fn test_read_string() {
        let mut r = reader(b"eng\0\0".to_vec());
        assert_eq!(r.read_string(5, TextEncoding::Ascii).unwrap(), "eng");

        let mut r = reader("Français".as_bytes().to_vec());
        let len = "Français".len() as u64;
        assert_eq!(r.read_string(len, TextEncoding::Utf8).unwrap(), "Français");

        let mut r = reader(vec![b'a', 0xE9, b'b']);
        assert_eq!(r.read_string(3, TextEncoding::Ascii).unwrap(), "a?b");
    }
}
