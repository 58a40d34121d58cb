//! Segment information analysis

use crate::ebml::{walk_children, EbmlReader, Element, ElementTag, Flow};
use crate::error::Result;
use crate::session::DecodeSession;
use crate::source::ByteSource;

/// Walk an Info element, recording the timecode scale and duration
pub fn analyze_segment_info<S: ByteSource>(
    reader: &mut EbmlReader<S>,
    info: &Element,
    session: &mut DecodeSession,
) -> Result<()> {
    let mut duration = 0.0;

    walk_children(reader, info.payload_end(), |reader, child| {
        match child.tag {
            ElementTag::TimecodeScale => {
                let Some(scale) = reader.read_uint_element(child)? else {
                    return Ok(Flow::Stop);
                };
                session.timecode_scale = scale;
            }
            ElementTag::Duration => {
                if let Some(value) = read_float(reader, child)? {
                    duration = value;
                }
            }
            _ => {}
        }
        Ok(Flow::Continue)
    })?;

    if let Some(ms) = duration_to_ms(session.timecode_scale, duration) {
        session.duration_ms = ms;
    }

    tracing::debug!(
        "Segment info: timecode_scale={}, duration_ms={:.3}",
        session.timecode_scale,
        session.duration_ms
    );

    Ok(())
}

/// Convert a Duration value (in ticks) to milliseconds.
///
/// With no usable scale the raw value is taken to be milliseconds already.
pub fn duration_to_ms(timecode_scale: u64, duration: f64) -> Option<f64> {
    if duration <= 0.0 {
        return None;
    }
    if timecode_scale > 0 {
        Some(duration / timecode_scale as f64 * 1_000_000.0)
    } else {
        Some(duration)
    }
}

/// Read a float element, choosing the width from the declared size
fn read_float<S: ByteSource>(reader: &mut EbmlReader<S>, element: &Element) -> Result<Option<f64>> {
    match element.payload_size {
        0 => Ok(Some(0.0)),
        4 => Ok(Some(reader.read_f32()? as f64)),
        8 => Ok(Some(reader.read_f64()?)),
        size => {
            tracing::warn!("Ignoring float element {:?} with size {}", element.tag, size);
            Ok(None)
        }
    }
}
