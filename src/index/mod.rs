//! Header section analysis
//!
//! This module extracts metadata from the sections that precede the clusters:
//! - Segment information (timecode scale, duration)
//! - Track table (track entries, video geometry, content encodings)

pub mod info;
pub mod tracks;

pub use info::analyze_segment_info;
pub use tracks::analyze_tracks;
