//! Public data types produced by the decoder

use std::borrow::Cow;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Content compression / encoding id of a track that has no ContentEncodings
pub const NOT_ENCODED: i32 = -1;

/// Track kind as declared by the TrackType element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
}

impl TrackKind {
    /// Map a TrackType byte. Other values leave a track unclassified.
    pub fn from_track_type(value: u8) -> Option<Self> {
        match value {
            1 => Some(TrackKind::Video),
            2 => Some(TrackKind::Audio),
            17 => Some(TrackKind::Subtitle),
            _ => None,
        }
    }
}

/// One entry of the track table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub track_number: u64,
    pub name: String,
    pub language: String,
    pub codec_id: String,
    pub codec_private: Bytes,
    /// Kind flags are independent; a malformed entry may set several
    pub is_video: bool,
    pub is_audio: bool,
    pub is_subtitle: bool,
    /// Default frame duration in nanoseconds, 0 if absent
    pub default_duration_ns: u64,
    pub pixel_width: Option<u32>,
    pub pixel_height: Option<u32>,
}

impl TrackInfo {
    /// Codec private data decoded as (lossy) UTF-8
    pub fn codec_private_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.codec_private)
    }

    /// Set the flag matching `kind`, leaving the others untouched
    pub fn mark(&mut self, kind: TrackKind) {
        match kind {
            TrackKind::Video => self.is_video = true,
            TrackKind::Audio => self.is_audio = true,
            TrackKind::Subtitle => self.is_subtitle = true,
        }
    }
}

/// Subtitle-specific view of a track entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrackInfo {
    pub track_number: u64,
    pub name: String,
    pub language: String,
    pub codec_id: String,
    pub codec_private: Bytes,
    /// -1: no ContentEncodings, 0: present but undeclared, >0: algorithm code
    pub content_compression_algorithm: i32,
    /// Same convention as `content_compression_algorithm`
    pub content_encoding_type: i32,
}

impl SubtitleTrackInfo {
    pub fn codec_private_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.codec_private)
    }

    /// True when the track declares a compression algorithm
    pub fn is_compressed(&self) -> bool {
        self.content_compression_algorithm > 0
    }
}

/// A single subtitle cue with timing and raw payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSequence {
    pub data: Bytes,
    /// Start time in timeline ticks (milliseconds at the default scale)
    pub start_ms: i64,
    /// End time in timeline ticks
    pub end_ms: i64,
}

impl SubtitleSequence {
    pub fn new(data: Bytes, start_ms: i64, end_ms: i64) -> Self {
        Self {
            data,
            start_ms,
            end_ms,
        }
    }

    /// Payload as text, with the `\N` escape turned into a line break
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).replace("\\N", "\n")
    }

    /// Get the duration in milliseconds
    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// Video and duration scalars of a container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaSummary {
    pub frame_rate: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub duration_ms: f64,
    pub video_codec_id: Option<String>,
    /// Nanoseconds per timeline tick
    pub timecode_scale: u64,
}
