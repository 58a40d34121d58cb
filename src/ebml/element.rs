//! Element headers and the bounded child walker

use crate::error::Result;
use crate::source::ByteSource;

use super::reader::EbmlReader;
use super::tag::ElementTag;

/// Header of one EBML element, anchored in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub tag: ElementTag,
    /// Absolute offset of the first payload byte
    pub payload_start: u64,
    /// Declared payload length
    pub payload_size: u64,
}

impl Element {
    /// Absolute offset one past the last payload byte
    pub fn payload_end(&self) -> u64 {
        self.payload_start.saturating_add(self.payload_size)
    }
}

/// Whether a walk should keep going after a child was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

impl<S: ByteSource> EbmlReader<S> {
    /// Decode the element header at the current position.
    ///
    /// `None` means no header could be formed (end of stream or a bad VINT);
    /// walkers treat that as the end of their span.
    pub fn read_element(&mut self) -> Result<Option<Element>> {
        let Some(id) = self.read_var_uint(true)? else {
            return Ok(None);
        };
        let Some(size) = self.read_var_uint(false)? else {
            return Ok(None);
        };

        Ok(Some(Element {
            tag: ElementTag::from_id(id),
            payload_start: self.position(),
            payload_size: size,
        }))
    }

    /// Read the payload of an unsigned integer element.
    ///
    /// `None` when the element declares more than 8 bytes; the caller ends
    /// its walk there and keeps what it has so far.
    pub fn read_uint_element(&mut self, element: &Element) -> Result<Option<u64>> {
        if element.payload_size > 8 {
            tracing::warn!(
                "Integer element {:?} at {} declares {} bytes",
                element.tag,
                element.payload_start,
                element.payload_size
            );
            return Ok(None);
        }
        Ok(Some(self.read_fixed_uint(element.payload_size)?))
    }
}

/// Walk the children of a span ending at `span_end`.
///
/// The reader must sit at the first child. Each child is handed to `handle`,
/// after which the cursor is moved to the child's end no matter how much of
/// the payload the handler consumed. A child that claims to extend past
/// `span_end` ends the walk.
pub fn walk_children<S, F>(reader: &mut EbmlReader<S>, span_end: u64, mut handle: F) -> Result<()>
where
    S: ByteSource,
    F: FnMut(&mut EbmlReader<S>, &Element) -> Result<Flow>,
{
    while reader.position() < span_end {
        let Some(child) = reader.read_element()? else {
            break;
        };

        if child.payload_end() > span_end {
            tracing::warn!(
                "Element {:?} at {} overruns its parent (ends at {}, parent ends at {})",
                child.tag,
                child.payload_start,
                child.payload_end(),
                span_end
            );
            break;
        }

        let flow = handle(reader, &child)?;
        if reader.position() != child.payload_end() {
            reader.seek_to(child.payload_end())?;
        }

        if flow == Flow::Stop {
            break;
        }
    }

    Ok(())
}
