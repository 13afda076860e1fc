/// The role of one logical line in an M3U8 playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Empty,
    ExtM3u,
    Version,
    // media playlist tags
    TargetDuration,
    MediaSequence,
    DiscontinuitySequence,
    PlaylistType,
    IframesOnly,
    EndList,
    Start,
    Inf,
    ByteRange,
    Key,
    Map,
    Discontinuity,
    Gap,
    ProgramDateTime,
    DateRange,
    OatclsScte35,
    CueOut,
    CueOutCont,
    CueIn,
    Scte35,
    Cue,
    PartInf,
    Part,
    PreloadHint,
    ServerControl,
    Skip,
    // master playlist tags
    StreamInf,
    IframeStreamInf,
    Media,
    // either
    IndependentSegments,
    Define,
    UnknownExtTag,
    Comment,
    Uri,
}

impl LineType {
    /// Tags that force the media-playlist classification.
    pub fn is_media_tag(&self) -> bool {
        matches!(
            self,
            Self::TargetDuration
                | Self::MediaSequence
                | Self::DiscontinuitySequence
                | Self::PlaylistType
                | Self::IframesOnly
                | Self::EndList
                | Self::Start
                | Self::Inf
                | Self::ByteRange
                | Self::Key
                | Self::Map
                | Self::Discontinuity
                | Self::Gap
                | Self::ProgramDateTime
                | Self::DateRange
                | Self::OatclsScte35
                | Self::CueOut
                | Self::CueOutCont
                | Self::CueIn
                | Self::Scte35
                | Self::Cue
                | Self::PartInf
                | Self::Part
                | Self::PreloadHint
                | Self::ServerControl
                | Self::Skip
        )
    }

    /// Tags that force the master-playlist classification.
    pub fn is_master_tag(&self) -> bool {
        matches!(self, Self::StreamInf | Self::IframeStreamInf | Self::Media)
    }
}

/// Classifier for M3U8 lines.
pub struct LineClassifier;

impl LineClassifier {
    /// Classify a trimmed line. Longest prefixes are checked first where
    /// tags share one.
    pub fn classify(line: &str) -> LineType {
        if line.is_empty() {
            return LineType::Empty;
        }
        if !line.starts_with('#') {
            return LineType::Uri;
        }

        if line.starts_with("#EXTM3U") {
            LineType::ExtM3u
        } else if line.starts_with("#EXT-X-VERSION:") {
            LineType::Version
        } else if line.starts_with("#EXT-X-TARGETDURATION:") {
            LineType::TargetDuration
        } else if line.starts_with("#EXT-X-MEDIA-SEQUENCE:") {
            LineType::MediaSequence
        } else if line.starts_with("#EXT-X-DISCONTINUITY-SEQUENCE:") {
            LineType::DiscontinuitySequence
        } else if line.starts_with("#EXT-X-DISCONTINUITY") {
            LineType::Discontinuity
        } else if line.starts_with("#EXT-X-PLAYLIST-TYPE:") {
            LineType::PlaylistType
        } else if line.starts_with("#EXT-X-I-FRAMES-ONLY") {
            LineType::IframesOnly
        } else if line.starts_with("#EXT-X-ENDLIST") {
            LineType::EndList
        } else if line.starts_with("#EXT-X-START:") {
            LineType::Start
        } else if line.starts_with("#EXTINF:") {
            LineType::Inf
        } else if line.starts_with("#EXT-X-BYTERANGE:") {
            LineType::ByteRange
        } else if line.starts_with("#EXT-X-KEY:") {
            LineType::Key
        } else if line.starts_with("#EXT-X-MAP:") {
            LineType::Map
        } else if line.starts_with("#EXT-X-GAP") {
            LineType::Gap
        } else if line.starts_with("#EXT-X-PROGRAM-DATE-TIME:") {
            LineType::ProgramDateTime
        } else if line.starts_with("#EXT-X-DATERANGE:") {
            LineType::DateRange
        } else if line.starts_with("#EXT-OATCLS-SCTE35:") {
            LineType::OatclsScte35
        } else if line.starts_with("#EXT-X-CUE-OUT-CONT") {
            LineType::CueOutCont
        } else if line.starts_with("#EXT-X-CUE-OUT") {
            LineType::CueOut
        } else if line.starts_with("#EXT-X-CUE-IN") {
            LineType::CueIn
        } else if line.starts_with("#EXT-SCTE35:") {
            LineType::Scte35
        } else if line.starts_with("#EXT-X-CUE:") {
            LineType::Cue
        } else if line.starts_with("#EXT-X-PART-INF:") {
            LineType::PartInf
        } else if line.starts_with("#EXT-X-PART:") {
            LineType::Part
        } else if line.starts_with("#EXT-X-PRELOAD-HINT:") {
            LineType::PreloadHint
        } else if line.starts_with("#EXT-X-SERVER-CONTROL:") {
            LineType::ServerControl
        } else if line.starts_with("#EXT-X-SKIP:") {
            LineType::Skip
        } else if line.starts_with("#EXT-X-STREAM-INF:") {
            LineType::StreamInf
        } else if line.starts_with("#EXT-X-I-FRAME-STREAM-INF:") {
            LineType::IframeStreamInf
        } else if line.starts_with("#EXT-X-MEDIA:") {
            LineType::Media
        } else if line.starts_with("#EXT-X-INDEPENDENT-SEGMENTS") {
            LineType::IndependentSegments
        } else if line.starts_with("#EXT-X-DEFINE:") {
            LineType::Define
        } else if line.starts_with("#EXT") {
            LineType::UnknownExtTag
        } else {
            LineType::Comment
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("#EXTM3U", LineType::ExtM3u)]
    #[case("#EXT-X-VERSION:3", LineType::Version)]
    #[case("#EXT-X-MEDIA-SEQUENCE:5", LineType::MediaSequence)]
    #[case("#EXT-X-MEDIA:TYPE=AUDIO", LineType::Media)]
    #[case("#EXT-X-DISCONTINUITY-SEQUENCE:1", LineType::DiscontinuitySequence)]
    #[case("#EXT-X-DISCONTINUITY", LineType::Discontinuity)]
    #[case("#EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=1", LineType::IframeStreamInf)]
    #[case("#EXT-X-I-FRAMES-ONLY", LineType::IframesOnly)]
    #[case("#EXT-X-CUE-OUT:15", LineType::CueOut)]
    #[case("#EXT-X-CUE-OUT-CONT:Duration=15", LineType::CueOutCont)]
    #[case("#EXT-X-CUE-IN", LineType::CueIn)]
    #[case("#EXT-X-PART-INF:PART-TARGET=1.0", LineType::PartInf)]
    #[case("#EXT-X-PART:DURATION=1.0", LineType::Part)]
    #[case("#EXT-X-STREAM-INF:BANDWIDTH=1000000", LineType::StreamInf)]
    #[case("#EXTINF:6.0,", LineType::Inf)]
    #[case("#EXT-X-CUSTOM-TAG:value", LineType::UnknownExtTag)]
    #[case("# a comment", LineType::Comment)]
    #[case("segment001.ts", LineType::Uri)]
    #[case("https://example.com/playlist.m3u8", LineType::Uri)]
    #[case("", LineType::Empty)]
    fn test_classify(#[case] line: &str, #[case] expected: LineType) {
        assert_eq!(LineClassifier::classify(line), expected);
    }
}
