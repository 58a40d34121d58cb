//! Cue and metadata rendering for the CLI

use std::io::{self, Write};

use serde::Serialize;

use matroska_subtitles::{ticks_to_ms, MediaSummary, SubtitleSequence, SubtitleTrackInfo, TrackInfo};

use crate::config::OutputFormat;

/// A ripped cue with times converted to milliseconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cue {
    pub index: usize,
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
}

/// Convert ripped sequences to cues using the container's tick length
pub fn to_cues(sequences: &[SubtitleSequence], timecode_scale: u64) -> Vec<Cue> {
    sequences
        .iter()
        .enumerate()
        .map(|(i, seq)| Cue {
            index: i + 1,
            start_ms: ticks_to_ms(seq.start_ms, timecode_scale),
            end_ms: ticks_to_ms(seq.end_ms, timecode_scale),
            text: seq.text(),
        })
        .collect()
}

/// Format milliseconds as an SRT timestamp (HH:MM:SS,mmm)
pub fn srt_timestamp(ms: i64) -> String {
    let ms = ms.max(0);
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

pub fn write_cues<W: Write>(out: &mut W, cues: &[Cue], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Srt => {
            for cue in cues {
                writeln!(out, "{}", cue.index)?;
                writeln!(
                    out,
                    "{} --> {}",
                    srt_timestamp(cue.start_ms),
                    srt_timestamp(cue.end_ms)
                )?;
                writeln!(out, "{}", cue.text)?;
                writeln!(out)?;
            }
        }
        OutputFormat::Text => {
            for cue in cues {
                writeln!(
                    out,
                    "[{} - {}] {}",
                    cue.start_ms,
                    cue.end_ms,
                    cue.text.replace('\n', " | ")
                )?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, cues)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Overview<'a> {
    summary: &'a MediaSummary,
    tracks: &'a [TrackInfo],
    subtitle_tracks: &'a [SubtitleTrackInfo],
}

/// Print the media summary and track lists
pub fn write_overview<W: Write>(
    out: &mut W,
    summary: &MediaSummary,
    tracks: &[TrackInfo],
    subtitle_tracks: &[SubtitleTrackInfo],
    format: OutputFormat,
) -> io::Result<()> {
    if format == OutputFormat::Json {
        let overview = Overview {
            summary,
            tracks,
            subtitle_tracks,
        };
        serde_json::to_writer_pretty(&mut *out, &overview)?;
        return writeln!(out);
    }

    writeln!(
        out,
        "Video: {}x{} @ {:.3} fps, codec {}",
        summary.pixel_width,
        summary.pixel_height,
        summary.frame_rate,
        summary.video_codec_id.as_deref().unwrap_or("-")
    )?;
    writeln!(out, "Duration: {:.0} ms", summary.duration_ms)?;
    writeln!(out, "Tracks:")?;
    for track in tracks {
        let kind = if track.is_subtitle {
            "subtitle"
        } else if track.is_video {
            "video"
        } else if track.is_audio {
            "audio"
        } else {
            "other"
        };
        writeln!(
            out,
            "  #{} {:<8} {:<20} lang={} name={:?}",
            track.track_number, kind, track.codec_id, track.language, track.name
        )?;
    }
    for track in subtitle_tracks {
        if track.is_compressed() {
            writeln!(
                out,
                "  note: subtitle track #{} is compressed (algorithm {})",
                track.track_number, track.content_compression_algorithm
            )?;
        }
    }
    Ok(())
}
