//! Block and SimpleBlock header decoding
//!
//! Both element types share one payload layout:
//! ```text
//! VINT   track number (marker stripped)
//! i16_be timecode relative to the cluster
//! u8     flags (bits 1-2 select the lacing mode)
//! [u8]   frame count - 1            (laced blocks only)
//! [u8; frame count]                 (fixed-size lacing only)
//! ...    payload up to the element end
//! ```
//! Laced payloads are returned whole. Xiph and EBML frame-size headers are
//! not consumed, so a multi-frame block comes back as one opaque payload.

use crate::ebml::{EbmlReader, Element};
use crate::error::Result;
use crate::source::ByteSource;

/// Lacing mode of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lacing {
    None,
    Xiph,
    FixedSize,
    Ebml,
}

impl Lacing {
    /// Classify a flags byte by bits 1-2, ignoring every other bit
    pub fn from_flags(flags: u8) -> Self {
        match (flags >> 1) & 0b11 {
            0b00 => Lacing::None,
            0b01 => Lacing::Xiph,
            0b10 => Lacing::FixedSize,
            _ => Lacing::Ebml,
        }
    }
}

/// Decoded block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub track_number: u64,
    pub relative_timecode: i16,
    pub flags: u8,
    pub lacing: Lacing,
    /// 1 for unlaced blocks
    pub frame_count: u32,
}

/// Read the header of the block whose payload starts at the cursor.
///
/// Leaves the cursor on the first payload byte. Returns `None` when the
/// header cannot be read within the block's declared size.
pub fn read_block_header<S: ByteSource>(
    reader: &mut EbmlReader<S>,
    block: &Element,
) -> Result<Option<BlockHeader>> {
    let end = block.payload_end();

    let Some(track_number) = reader.read_var_uint(false)? else {
        return Ok(None);
    };
    if reader.position().saturating_add(3) > end {
        tracing::debug!("Block at {} too short for its header", block.payload_start);
        return Ok(None);
    }

    let relative_timecode = reader.read_i16()?;
    let flags = reader.read_u8()?;
    let lacing = Lacing::from_flags(flags);

    let mut frame_count = 1;
    if lacing != Lacing::None {
        if reader.position() >= end {
            return Ok(None);
        }
        frame_count = reader.read_u8()? as u32 + 1;
        tracing::trace!("{:?} lacing, {} frames", lacing, frame_count);

        if lacing == Lacing::FixedSize {
            if reader.position() + frame_count as u64 > end {
                return Ok(None);
            }
            reader.skip(frame_count as u64)?;
        }
    }

    Ok(Some(BlockHeader {
        track_number,
        relative_timecode,
        flags,
        lacing,
        frame_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SeekableSource;
    use crate::tests::fixtures::{block_payload, element};
    use std::io::Cursor;

    fn decode(data: Vec<u8>) -> (Option<BlockHeader>, u64, u64) {
        let mut reader = EbmlReader::new(SeekableSource::new(Cursor::new(data)).unwrap());
        let block = reader.read_element().unwrap().unwrap();
        let header = read_block_header(&mut reader, &block).unwrap();
        (header, reader.position(), block.payload_end())
    }

    #[test]
    fn test_lacing_flag_table() {
        for other_bits in [0x00u8, 0x01, 0x08, 0x80, 0xF9] {
            assert_eq!(Lacing::from_flags(other_bits), Lacing::None);
            assert_eq!(Lacing::from_flags(other_bits | 0b010), Lacing::Xiph);
            assert_eq!(Lacing::from_flags(other_bits | 0b100), Lacing::FixedSize);
            assert_eq!(Lacing::from_flags(other_bits | 0b110), Lacing::Ebml);
        }
    }

    #[test]
    fn test_unlaced_header() {
        let (header, pos, end) = decode(element(0xA3, &block_payload(1, 100, 0x80, b"Hi")));
        let header = header.unwrap();
        assert_eq!(header.track_number, 1);
        assert_eq!(header.relative_timecode, 100);
        assert_eq!(header.lacing, Lacing::None);
        assert_eq!(header.frame_count, 1);
        assert_eq!(end - pos, 2);
    }

    #[test]
    fn test_negative_relative_timecode() {
        let (header, _, _) = decode(element(0xA1, &block_payload(2, -20, 0, b"x")));
        assert_eq!(header.unwrap().relative_timecode, -20);
    }

    #[test]
    fn test_xiph_lacing_consumes_only_count() {
        // count byte 1 => 2 frames, rest is left as payload
        let mut payload = block_payload(1, 0, 0b010, &[]);
        payload.extend([0x01, 0x03, b'a', b'b', b'c', b'd', b'e']);
        let (header, pos, end) = decode(element(0xA3, &payload));
        let header = header.unwrap();
        assert_eq!(header.lacing, Lacing::Xiph);
        assert_eq!(header.frame_count, 2);
        assert_eq!(end - pos, 6);
    }

    #[test]
    fn test_fixed_lacing_consumes_frame_count_bytes() {
        let mut payload = block_payload(1, 0, 0b100, &[]);
        payload.extend([0x02, 0xAA, 0xBB, 0xCC, b'p', b'q']);
        let (header, pos, end) = decode(element(0xA3, &payload));
        let header = header.unwrap();
        assert_eq!(header.lacing, Lacing::FixedSize);
        assert_eq!(header.frame_count, 3);
        assert_eq!(end - pos, 2);
    }

    #[test]
    fn test_ebml_lacing_consumes_only_count() {
        let mut payload = block_payload(1, 0, 0b110, &[]);
        payload.extend([0x00, b'z']);
        let (header, pos, end) = decode(element(0xA3, &payload));
        assert_eq!(header.unwrap().frame_count, 1);
        assert_eq!(end - pos, 1);
    }

    #[test]
    fn test_header_longer_than_block() {
        // Track number and half a timecode only
        let (header, _, _) = decode(element(0xA3, &[0x81, 0x00]));
        assert!(header.is_none());

        // Fixed lacing claiming more frame bytes than present
        let mut payload = block_payload(1, 0, 0b100, &[]);
        payload.extend([0x05, 0x01]);
        let (header, _, _) = decode(element(0xA3, &payload));
        assert!(header.is_none());
    }
}
