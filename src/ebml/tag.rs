//! Element tag registry
//!
//! Ids are stored with their VINT length-marker bits, exactly as they appear
//! on the wire (e.g. Segment is `0x18538067`).

/// Recognized Matroska element tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementTag {
    Ebml,
    Void,
    Crc32,
    Segment,
    SeekHead,

    Info,
    TimecodeScale,
    Duration,

    Tracks,
    TrackEntry,
    TrackNumber,
    TrackType,
    DefaultDuration,
    Name,
    Language,
    CodecId,
    CodecPrivate,
    Video,
    PixelWidth,
    PixelHeight,
    Audio,
    ContentEncodings,
    ContentEncoding,
    ContentEncodingOrder,
    ContentEncodingScope,
    ContentEncodingType,
    ContentCompression,
    ContentCompAlgo,
    ContentCompSettings,

    Cluster,
    Timecode,
    SimpleBlock,
    BlockGroup,
    Block,
    BlockDuration,

    Cues,
    Attachments,
    Chapters,
    Tags,

    /// Legal but unrecognized id, skipped by its declared size
    Unknown(u64),
}

const REGISTRY: &[(u64, ElementTag)] = &[
    (0x1A45_DFA3, ElementTag::Ebml),
    (0xEC, ElementTag::Void),
    (0xBF, ElementTag::Crc32),
    (0x1853_8067, ElementTag::Segment),
    (0x114D_9B74, ElementTag::SeekHead),
    (0x1549_A966, ElementTag::Info),
    (0x2A_D7B1, ElementTag::TimecodeScale),
    (0x4489, ElementTag::Duration),
    (0x1654_AE6B, ElementTag::Tracks),
    (0xAE, ElementTag::TrackEntry),
    (0xD7, ElementTag::TrackNumber),
    (0x83, ElementTag::TrackType),
    (0x23_E383, ElementTag::DefaultDuration),
    (0x536E, ElementTag::Name),
    (0x22_B59C, ElementTag::Language),
    (0x86, ElementTag::CodecId),
    (0x63A2, ElementTag::CodecPrivate),
    (0xE0, ElementTag::Video),
    (0xB0, ElementTag::PixelWidth),
    (0xBA, ElementTag::PixelHeight),
    (0xE1, ElementTag::Audio),
    (0x6D80, ElementTag::ContentEncodings),
    (0x6240, ElementTag::ContentEncoding),
    (0x5031, ElementTag::ContentEncodingOrder),
    (0x5032, ElementTag::ContentEncodingScope),
    (0x5033, ElementTag::ContentEncodingType),
    (0x5034, ElementTag::ContentCompression),
    (0x4254, ElementTag::ContentCompAlgo),
    (0x4255, ElementTag::ContentCompSettings),
    (0x1F43_B675, ElementTag::Cluster),
    (0xE7, ElementTag::Timecode),
    (0xA3, ElementTag::SimpleBlock),
    (0xA0, ElementTag::BlockGroup),
    (0xA1, ElementTag::Block),
    (0x9B, ElementTag::BlockDuration),
    (0x1C53_BB6B, ElementTag::Cues),
    (0x1941_A469, ElementTag::Attachments),
    (0x1043_A770, ElementTag::Chapters),
    (0x1254_C367, ElementTag::Tags),
];

impl ElementTag {
    /// Map a raw id (marker bits included) to a tag
    pub fn from_id(id: u64) -> Self {
        REGISTRY
            .iter()
            .find(|(value, _)| *value == id)
            .map(|(_, tag)| *tag)
            .unwrap_or(ElementTag::Unknown(id))
    }

    /// Raw id of this tag, marker bits included
    pub fn id(self) -> u64 {
        if let ElementTag::Unknown(id) = self {
            return id;
        }
        REGISTRY
            .iter()
            .find(|(_, tag)| *tag == self)
            .map(|(value, _)| *value)
            .unwrap_or(0)
    }

    pub fn is_known(self) -> bool {
        !matches!(self, ElementTag::Unknown(_))
    }
}
