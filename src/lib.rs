//! Matroska/WebM subtitle extraction
//!
//! Decodes the EBML structure of a Matroska container from a random-access
//! byte source and extracts track metadata, video summary scalars and the
//! raw cues of subtitle tracks. Only the elements needed for that are
//! interpreted; everything else is skipped by its declared size.

pub mod api;
pub mod ebml;
pub mod error;
pub mod index;
pub mod session;
pub mod source;
pub mod subtitle;
pub mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use api::MatroskaFile;
pub use error::{MatroskaError, Result};
pub use session::ticks_to_ms;
pub use source::{open_file, ByteSource, FileSource, SeekableSource};
pub use types::{
    MediaSummary, SubtitleSequence, SubtitleTrackInfo, TrackInfo, TrackKind, NOT_ENCODED,
};
