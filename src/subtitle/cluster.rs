//! Cluster traversal and subtitle payload assembly

use crate::ebml::{walk_children, EbmlReader, Element, ElementTag, Flow};
use crate::error::Result;
use crate::session::DecodeSession;
use crate::source::ByteSource;
use crate::types::SubtitleSequence;

use super::block::{read_block_header, BlockHeader};

/// Walk a Cluster, appending the blocks of `session.rip_track` as sequences.
///
/// Clusters are skipped when the session is not ripping a track.
pub fn analyze_cluster<S: ByteSource>(
    reader: &mut EbmlReader<S>,
    cluster: &Element,
    session: &mut DecodeSession,
) -> Result<()> {
    let Some(track_number) = session.rip_track else {
        return Ok(());
    };
    let mut cluster_tick = 0i64;

    walk_children(reader, cluster.payload_end(), |reader, child| {
        match child.tag {
            ElementTag::Timecode => {
                let Some(tick) = reader.read_uint_element(child)? else {
                    return Ok(Flow::Stop);
                };
                cluster_tick = saturate_i64(tick);
            }
            ElementTag::SimpleBlock => {
                if let Some(seq) = read_simple_block(reader, child, track_number, cluster_tick)? {
                    session.sequences.push(seq);
                }
            }
            ElementTag::BlockGroup => {
                if let Some(seq) = read_block_group(reader, child, track_number, cluster_tick)? {
                    session.sequences.push(seq);
                }
            }
            _ => {}
        }
        Ok(Flow::Continue)
    })
}

/// Find the timeline tick of the first block of `track_number` in a cluster.
///
/// Payload bytes are never read.
pub fn find_track_start<S: ByteSource>(
    reader: &mut EbmlReader<S>,
    cluster: &Element,
    track_number: u64,
) -> Result<Option<i64>> {
    let mut cluster_tick = 0i64;
    let mut start = None;

    walk_children(reader, cluster.payload_end(), |reader, child| {
        let header = match child.tag {
            ElementTag::Timecode => {
                let Some(tick) = reader.read_uint_element(child)? else {
                    return Ok(Flow::Stop);
                };
                cluster_tick = saturate_i64(tick);
                None
            }
            ElementTag::SimpleBlock => read_block_header(reader, child)?,
            ElementTag::BlockGroup => match first_block(reader, child)? {
                Some(block) => read_block_header(reader, &block)?,
                None => None,
            },
            _ => None,
        };

        match header {
            Some(header) if header.track_number == track_number => {
                start = Some(cluster_tick.saturating_add(header.relative_timecode as i64));
                Ok(Flow::Stop)
            }
            _ => Ok(Flow::Continue),
        }
    })?;

    Ok(start)
}

/// SimpleBlock: the cue has no duration at this layer, so it ends where it starts
fn read_simple_block<S: ByteSource>(
    reader: &mut EbmlReader<S>,
    block: &Element,
    track_number: u64,
    cluster_tick: i64,
) -> Result<Option<SubtitleSequence>> {
    let Some(header) = matching_header(reader, block, track_number)? else {
        return Ok(None);
    };

    let data = reader.read_bytes(block.payload_end() - reader.position())?;
    let start = cluster_tick.saturating_add(header.relative_timecode as i64);

    Ok(Some(SubtitleSequence::new(data, start, start)))
}

/// BlockGroup: decode the first child if it is a Block, then take the end
/// time from a BlockDuration sibling right after it
fn read_block_group<S: ByteSource>(
    reader: &mut EbmlReader<S>,
    group: &Element,
    track_number: u64,
    cluster_tick: i64,
) -> Result<Option<SubtitleSequence>> {
    let Some(block) = first_block(reader, group)? else {
        return Ok(None);
    };
    let Some(header) = matching_header(reader, &block, track_number)? else {
        return Ok(None);
    };

    let payload_len = block.payload_end() - reader.position();
    if payload_len == 0 {
        return Ok(None);
    }
    let data = reader.read_bytes(payload_len)?;
    let start = cluster_tick.saturating_add(header.relative_timecode as i64);

    reader.seek_to(block.payload_end())?;
    let mut duration = 0i64;
    if reader.position() < group.payload_end() {
        if let Some(next) = reader.read_element()? {
            if next.tag == ElementTag::BlockDuration && next.payload_end() <= group.payload_end() {
                duration = reader.read_uint_element(&next)?.map_or(0, saturate_i64);
            }
        }
    }

    Ok(Some(SubtitleSequence::new(data, start, start.saturating_add(duration))))
}

/// Read the first child of a BlockGroup if it is a Block inside the group
fn first_block<S: ByteSource>(reader: &mut EbmlReader<S>, group: &Element) -> Result<Option<Element>> {
    if reader.position() >= group.payload_end() {
        return Ok(None);
    }
    match reader.read_element()? {
        Some(block) if block.tag == ElementTag::Block && block.payload_end() <= group.payload_end() => {
            Ok(Some(block))
        }
        _ => Ok(None),
    }
}

fn matching_header<S: ByteSource>(
    reader: &mut EbmlReader<S>,
    block: &Element,
    track_number: u64,
) -> Result<Option<BlockHeader>> {
    Ok(read_block_header(reader, block)?.filter(|h| h.track_number == track_number))
}

fn saturate_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SeekableSource;
    use crate::tests::fixtures::{block_payload, element, uint_element};
    use std::io::Cursor;

    fn rip(cluster_children: &[Vec<u8>], track: u64) -> Vec<SubtitleSequence> {
        let payload: Vec<u8> = cluster_children.iter().flatten().copied().collect();
        let data = element(0x1F43_B675, &payload);
        let mut reader = EbmlReader::new(SeekableSource::new(Cursor::new(data)).unwrap());
        let cluster = reader.read_element().unwrap().unwrap();
        let mut session = DecodeSession::for_track(track);
        analyze_cluster(&mut reader, &cluster, &mut session).unwrap();
        session.sequences
    }

    #[test]
    fn test_simple_block_zero_length_cue() {
        let sequences = rip(
            &[
                uint_element(0xE7, 2000),
                element(0xA3, &block_payload(1, 150, 0x80, b"line")),
            ],
            1,
        );

        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences[0].start_ms, 2150);
        assert_eq!(sequences[0].end_ms, 2150);
        assert_eq!(&sequences[0].data[..], b"line");
    }

    #[test]
    fn test_block_group_with_duration() {
        let group = element(
            0xA0,
            &[
                element(0xA1, &block_payload(3, -10, 0, b"cue")),
                uint_element(0x9B, 1500),
            ]
            .concat(),
        );
        let sequences = rip(&[uint_element(0xE7, 1000), group], 3);

        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences[0].start_ms, 990);
        assert_eq!(sequences[0].end_ms, 2490);
        assert_eq!(sequences[0].text(), "cue");
    }

    #[test]
    fn test_block_group_without_duration() {
        let group = element(
            0xA0,
            &[
                element(0xA1, &block_payload(3, 5, 0, b"cue")),
                uint_element(0xFB, 0), // ReferenceBlock
            ]
            .concat(),
        );
        let sequences = rip(&[group], 3);
        assert_eq!(sequences[0].start_ms, 5);
        assert_eq!(sequences[0].end_ms, 5);
    }

    #[test]
    fn test_empty_block_payload_not_recorded() {
        let group = element(0xA0, &element(0xA1, &block_payload(3, 0, 0, b"")));
        assert!(rip(&[group], 3).is_empty());

        // An empty SimpleBlock is still a cue
        let sequences = rip(&[element(0xA3, &block_payload(3, 7, 0, b""))], 3);
        assert_eq!(sequences.len(), 1);
        assert!(sequences[0].data.is_empty());
    }

    #[test]
    fn test_other_tracks_ignored() {
        let sequences = rip(
            &[
                element(0xA3, &block_payload(1, 0, 0, b"video")),
                element(0xA3, &block_payload(2, 10, 0, b"sub")),
                element(0xA3, &block_payload(1, 20, 0, b"video")),
            ],
            2,
        );
        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences[0].start_ms, 10);
    }

    #[test]
    fn test_fixed_lacing_payload_after_frame_bytes() {
        let mut payload = block_payload(4, 0, 0b100, &[]);
        payload.extend([0x01, 0xEE, 0xEE]);
        payload.extend(b"text");
        let sequences = rip(&[element(0xA3, &payload)], 4);
        assert_eq!(&sequences[0].data[..], b"text");
    }

    #[test]
    fn test_cluster_skipped_without_rip_track() {
        let payload = element(0xA3, &block_payload(1, 0, 0, b"x"));
        let data = element(0x1F43_B675, &payload);
        let mut reader = EbmlReader::new(SeekableSource::new(Cursor::new(data)).unwrap());
        let cluster = reader.read_element().unwrap().unwrap();
        let mut session = DecodeSession::new();
        analyze_cluster(&mut reader, &cluster, &mut session).unwrap();
        assert!(session.sequences.is_empty());
    }

    #[test]
    fn test_find_track_start() {
        let payload = [
            uint_element(0xE7, 500),
            element(0xA3, &block_payload(1, 0, 0, b"v")),
            element(
                0xA0,
                &element(0xA1, &block_payload(2, 40, 0, b"s")),
            ),
            element(0xA3, &block_payload(2, 90, 0, b"s")),
        ]
        .concat();
        let data = element(0x1F43_B675, &payload);
        let mut reader = EbmlReader::new(SeekableSource::new(Cursor::new(data)).unwrap());
        let cluster = reader.read_element().unwrap().unwrap();

        assert_eq!(find_track_start(&mut reader, &cluster, 2).unwrap(), Some(540));
    }
}
