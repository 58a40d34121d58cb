//! Track table analysis

use crate::ebml::{walk_children, EbmlReader, Element, ElementTag, Flow, TextEncoding};
use crate::error::Result;
use crate::session::DecodeSession;
use crate::source::ByteSource;
use crate::types::{SubtitleTrackInfo, TrackInfo, TrackKind, NOT_ENCODED};

/// Walk a Tracks element, replacing the session's track lists
pub fn analyze_tracks<S: ByteSource>(
    reader: &mut EbmlReader<S>,
    tracks: &Element,
    session: &mut DecodeSession,
) -> Result<()> {
    session.tracks.clear();
    session.subtitle_tracks.clear();

    walk_children(reader, tracks.payload_end(), |reader, child| {
        if child.tag == ElementTag::TrackEntry {
            analyze_track_entry(reader, child, session)?;
        }
        Ok(Flow::Continue)
    })?;

    tracing::debug!(
        "Found {} tracks ({} subtitle)",
        session.tracks.len(),
        session.subtitle_tracks.len()
    );

    Ok(())
}

/// Content encoding ids of one track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContentEncodingIds {
    compression_algorithm: i32,
    encoding_type: i32,
}

impl Default for ContentEncodingIds {
    fn default() -> Self {
        Self {
            compression_algorithm: NOT_ENCODED,
            encoding_type: NOT_ENCODED,
        }
    }
}

/// Walk one TrackEntry and append its records to the session
pub fn analyze_track_entry<S: ByteSource>(
    reader: &mut EbmlReader<S>,
    entry: &Element,
    session: &mut DecodeSession,
) -> Result<()> {
    let mut track = TrackInfo::default();
    let mut encoding = ContentEncodingIds::default();

    walk_children(reader, entry.payload_end(), |reader, child| {
        let size = child.payload_size;
        match child.tag {
            ElementTag::DefaultDuration => {
                let Some(duration) = reader.read_uint_element(child)? else {
                    return Ok(Flow::Stop);
                };
                track.default_duration_ns = duration;
            }
            ElementTag::Video => {
                let (width, height) = analyze_video(reader, child)?;
                track.pixel_width = width.or(track.pixel_width);
                track.pixel_height = height.or(track.pixel_height);
                track.mark(TrackKind::Video);
            }
            ElementTag::Audio => track.mark(TrackKind::Audio),
            ElementTag::TrackNumber => {
                let Some(number) = reader.read_uint_element(child)? else {
                    return Ok(Flow::Stop);
                };
                track.track_number = number;
            }
            ElementTag::Name => {
                track.name = reader.read_string(size, TextEncoding::Utf8)?;
            }
            ElementTag::Language => {
                track.language = reader.read_string(size, TextEncoding::Ascii)?;
            }
            ElementTag::CodecId => {
                track.codec_id = reader.read_string(size, TextEncoding::Ascii)?;
            }
            ElementTag::TrackType if size > 0 => {
                let value = reader.read_u8()?;
                match TrackKind::from_track_type(value) {
                    Some(kind) => track.mark(kind),
                    None => tracing::debug!("Unclassified track type {}", value),
                }
            }
            ElementTag::CodecPrivate => {
                track.codec_private = reader.read_bytes(size)?;
            }
            ElementTag::ContentEncodings => {
                encoding = ContentEncodingIds {
                    compression_algorithm: 0,
                    encoding_type: 0,
                };
                if reader.position() < child.payload_end() {
                    if let Some(first) = reader.read_element()? {
                        if first.tag == ElementTag::ContentEncoding
                            && first.payload_end() <= child.payload_end()
                        {
                            analyze_content_encoding(reader, &first, &mut encoding)?;
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(Flow::Continue)
    })?;

    tracing::debug!(
        "Track {}: codec={}, language={:?}, video={}, audio={}, subtitle={}",
        track.track_number,
        track.codec_id,
        track.language,
        track.is_video,
        track.is_audio,
        track.is_subtitle
    );

    if track.is_video {
        if track.default_duration_ns > 0 {
            session.frame_rate = 1.0 / (track.default_duration_ns as f64 / 1_000_000_000.0);
        }
        if let Some(width) = track.pixel_width {
            session.pixel_width = width;
        }
        if let Some(height) = track.pixel_height {
            session.pixel_height = height;
        }
        session.video_codec_id = Some(track.codec_id.clone());
    } else if track.is_subtitle {
        session.subtitle_tracks.push(SubtitleTrackInfo {
            track_number: track.track_number,
            name: track.name.clone(),
            language: track.language.clone(),
            codec_id: track.codec_id.clone(),
            codec_private: track.codec_private.clone(),
            content_compression_algorithm: encoding.compression_algorithm,
            content_encoding_type: encoding.encoding_type,
        });
    }

    session.tracks.push(track);

    Ok(())
}

/// Walk a Video element, returning the pixel dimensions it declares
fn analyze_video<S: ByteSource>(
    reader: &mut EbmlReader<S>,
    video: &Element,
) -> Result<(Option<u32>, Option<u32>)> {
    let mut width = None;
    let mut height = None;

    walk_children(reader, video.payload_end(), |reader, child| {
        let slot = match child.tag {
            ElementTag::PixelWidth => &mut width,
            ElementTag::PixelHeight => &mut height,
            _ => return Ok(Flow::Continue),
        };
        match reader.read_uint_element(child)? {
            Some(value) => {
                *slot = Some(saturate_u32(value));
                Ok(Flow::Continue)
            }
            None => Ok(Flow::Stop),
        }
    })?;

    Ok((width, height))
}

/// Walk a ContentEncoding element
fn analyze_content_encoding<S: ByteSource>(
    reader: &mut EbmlReader<S>,
    content_encoding: &Element,
    ids: &mut ContentEncodingIds,
) -> Result<()> {
    walk_children(reader, content_encoding.payload_end(), |reader, child| {
        match child.tag {
            ElementTag::ContentEncodingOrder
            | ElementTag::ContentEncodingScope
            | ElementTag::ContentEncodingType => {
                let Some(value) = reader.read_uint_element(child)? else {
                    return Ok(Flow::Stop);
                };
                if child.tag == ElementTag::ContentEncodingType {
                    ids.encoding_type = saturate_i32(value);
                } else {
                    tracing::debug!("{:?}: {}", child.tag, value);
                }
            }
            ElementTag::ContentCompression => {
                walk_children(reader, child.payload_end(), |reader, comp| {
                    match comp.tag {
                        ElementTag::ContentCompAlgo => {
                            let Some(algorithm) = reader.read_uint_element(comp)? else {
                                return Ok(Flow::Stop);
                            };
                            ids.compression_algorithm = saturate_i32(algorithm);
                        }
                        ElementTag::ContentCompSettings => {
                            let settings = reader.read_bytes(comp.payload_size)?;
                            tracing::debug!("ContentCompSettings: {} bytes", settings.len());
                        }
                        _ => {}
                    }
                    Ok(Flow::Continue)
                })?;
            }
            _ => {}
        }
        Ok(Flow::Continue)
    })
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn saturate_i32(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
