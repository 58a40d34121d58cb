//! Public query surface
//!
//! [`MatroskaFile`] validates the container framing once when opened and
//! then answers each query with a single forward pass over the segment's
//! direct children. Every query starts from the segment payload again; no
//! results are cached between calls.

use std::path::Path;

use crate::ebml::{walk_children, EbmlReader, Element, ElementTag, Flow};
use crate::error::Result;
use crate::index::{analyze_segment_info, analyze_tracks};
use crate::session::DecodeSession;
use crate::source::{open_file, ByteSource, FileSource};
use crate::subtitle::{analyze_cluster, find_track_start};
use crate::types::{MediaSummary, SubtitleSequence, SubtitleTrackInfo, TrackInfo};

/// How far a pass over the segment goes and what it does with clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Info and Tracks only, stop after the first Tracks element
    Headers,
    /// Every top-level child, decoding clusters for the session's rip track
    Rip,
    /// Stop at the first cluster holding a block of the given track
    TrackStart(u64),
}

/// A Matroska/WebM container opened for subtitle extraction
pub struct MatroskaFile<S> {
    reader: EbmlReader<S>,
    /// `None` when the stream does not start with an EBML header and a Segment
    segment: Option<Element>,
}

impl MatroskaFile<FileSource> {
    /// Open a file read-only
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening {:?}", path);
        Self::open(open_file(path)?)
    }
}

impl<S: ByteSource> MatroskaFile<S> {
    /// Take ownership of a source and check its framing.
    ///
    /// Only I/O faults fail here. A stream that is not Matroska yields an
    /// invalid container whose queries all return empty results.
    pub fn open(source: S) -> Result<Self> {
        let mut reader = EbmlReader::new(source);
        reader.seek_to(0)?;
        let segment = read_framing(&mut reader)?;

        match &segment {
            Some(segment) => tracing::debug!(
                "Segment payload at {}, {} bytes declared",
                segment.payload_start,
                segment.payload_size
            ),
            None => tracing::info!("Stream is not a Matroska container"),
        }

        Ok(Self { reader, segment })
    }

    /// Whether the stream starts with an EBML header followed by a Segment
    pub fn is_valid(&self) -> bool {
        self.segment.is_some()
    }

    pub fn stream_length(&self) -> u64 {
        self.reader.length()
    }

    /// Release the byte source
    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }

    /// All entries of the first track table
    pub fn track_list(&mut self) -> Result<Vec<TrackInfo>> {
        Ok(self.read_headers()?.tracks)
    }

    /// Subtitle tracks of the first track table
    pub fn subtitle_track_list(&mut self) -> Result<Vec<SubtitleTrackInfo>> {
        Ok(self.read_headers()?.subtitle_tracks)
    }

    /// Video geometry, frame rate, duration and video codec
    pub fn media_summary(&mut self) -> Result<MediaSummary> {
        if !self.is_valid() {
            return Ok(DecodeSession::new().summary());
        }
        Ok(self.read_headers()?.summary())
    }

    /// Collect every block of `track_number` in cluster order
    pub fn rip_subtitles(&mut self, track_number: u64) -> Result<Vec<SubtitleSequence>> {
        self.rip_subtitles_with_progress(track_number, |_, _| {})
    }

    /// Like [`rip_subtitles`](Self::rip_subtitles), calling `progress` with
    /// (bytes consumed, stream length) after each top-level element
    #[tracing::instrument(skip(self, progress), level = "debug")]
    pub fn rip_subtitles_with_progress<F>(
        &mut self,
        track_number: u64,
        mut progress: F,
    ) -> Result<Vec<SubtitleSequence>>
    where
        F: FnMut(u64, u64),
    {
        let mut session = DecodeSession::for_track(track_number);
        self.run_pass(Pass::Rip, &mut session, &mut progress)?;

        tracing::debug!(
            "Ripped {} sequences from track {}",
            session.sequences.len(),
            track_number
        );

        Ok(session.sequences)
    }

    /// Start time in milliseconds of the first block of `track_number`.
    ///
    /// Stops at the first cluster that holds such a block; `None` if there is
    /// none.
    pub fn first_start_time(&mut self, track_number: u64) -> Result<Option<i64>> {
        let mut session = DecodeSession::new();
        let tick = self.run_pass(Pass::TrackStart(track_number), &mut session, &mut |_, _| {})?;
        Ok(tick.map(|tick| session.ticks_to_ms(tick)))
    }

    fn read_headers(&mut self) -> Result<DecodeSession> {
        let mut session = DecodeSession::new();
        self.run_pass(Pass::Headers, &mut session, &mut |_, _| {})?;
        Ok(session)
    }

    /// One forward pass over the segment's direct children.
    ///
    /// The span is the declared segment end clamped to the stream length,
    /// which covers unknown-size segments and truncated files.
    fn run_pass(
        &mut self,
        pass: Pass,
        session: &mut DecodeSession,
        progress: &mut dyn FnMut(u64, u64),
    ) -> Result<Option<i64>> {
        let Some(segment) = self.segment else {
            return Ok(None);
        };
        let total = self.reader.length();
        let end = segment.payload_end().min(total);
        let mut track_start = None;

        self.reader.seek_to(segment.payload_start)?;

        walk_children(&mut self.reader, end, |reader, child| {
            let flow = match child.tag {
                ElementTag::Info => {
                    analyze_segment_info(reader, child, session)?;
                    Flow::Continue
                }
                ElementTag::Tracks => {
                    analyze_tracks(reader, child, session)?;
                    if pass == Pass::Headers {
                        Flow::Stop
                    } else {
                        Flow::Continue
                    }
                }
                ElementTag::Cluster => match pass {
                    Pass::Headers => Flow::Continue,
                    Pass::Rip => {
                        analyze_cluster(reader, child, session)?;
                        Flow::Continue
                    }
                    Pass::TrackStart(track_number) => {
                        match find_track_start(reader, child, track_number)? {
                            Some(tick) => {
                                track_start = Some(tick);
                                Flow::Stop
                            }
                            None => Flow::Continue,
                        }
                    }
                },
                _ => {
                    tracing::trace!("Skipping {:?} ({} bytes)", child.tag, child.payload_size);
                    Flow::Continue
                }
            };

            progress(child.payload_end().min(total), total);
            Ok(flow)
        })?;

        Ok(track_start)
    }
}

/// Check for an EBML header followed by a Segment, returning the Segment
fn read_framing<S: ByteSource>(reader: &mut EbmlReader<S>) -> Result<Option<Element>> {
    let header = match reader.read_element()? {
        Some(header) if header.tag == ElementTag::Ebml => header,
        _ => return Ok(None),
    };

    if header.payload_end() > reader.length() {
        return Ok(None);
    }
    reader.seek_to(header.payload_end())?;

    match reader.read_element()? {
        Some(segment) if segment.tag == ElementTag::Segment => Ok(Some(segment)),
        _ => Ok(None),
    }
}
