//! Per-query decode state
//!
//! Every query builds a fresh [`DecodeSession`] and threads it by reference
//! through the section walkers. Nothing survives between queries.

use crate::types::{MediaSummary, SubtitleSequence, SubtitleTrackInfo, TrackInfo};

/// Timeline tick length used when the Info section does not declare one
pub const DEFAULT_TIMECODE_SCALE: u64 = 1_000_000;

/// Convert timeline ticks to milliseconds for a scale in nanoseconds per tick
pub fn ticks_to_ms(ticks: i64, timecode_scale: u64) -> i64 {
    let scaled = ticks as i128 * timecode_scale as i128 / 1_000_000;
    scaled.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Accumulated outputs of one pass over a segment
#[derive(Debug, Clone)]
pub struct DecodeSession {
    /// Nanoseconds per timeline tick
    pub timecode_scale: u64,
    pub duration_ms: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub frame_rate: f64,
    pub video_codec_id: Option<String>,
    pub tracks: Vec<TrackInfo>,
    pub subtitle_tracks: Vec<SubtitleTrackInfo>,
    /// Track whose blocks are collected into `sequences`, if any
    pub rip_track: Option<u64>,
    pub sequences: Vec<SubtitleSequence>,
}

impl Default for DecodeSession {
    fn default() -> Self {
        Self {
            timecode_scale: DEFAULT_TIMECODE_SCALE,
            duration_ms: 0.0,
            pixel_width: 0,
            pixel_height: 0,
            frame_rate: 0.0,
            video_codec_id: None,
            tracks: Vec::new(),
            subtitle_tracks: Vec::new(),
            rip_track: None,
            sequences: Vec::new(),
        }
    }
}

impl DecodeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session that collects the blocks of one track
    pub fn for_track(track_number: u64) -> Self {
        Self {
            rip_track: Some(track_number),
            ..Self::default()
        }
    }

    /// Convert a timeline tick count to milliseconds using the session scale
    pub fn ticks_to_ms(&self, ticks: i64) -> i64 {
        ticks_to_ms(ticks, self.timecode_scale)
    }

    pub fn summary(&self) -> MediaSummary {
        MediaSummary {
            frame_rate: self.frame_rate,
            pixel_width: self.pixel_width,
            pixel_height: self.pixel_height,
            duration_ms: self.duration_ms,
            video_codec_id: self.video_codec_id.clone(),
            timecode_scale: self.timecode_scale,
        }
    }
}
