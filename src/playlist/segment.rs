use chrono::{DateTime, FixedOffset};

use crate::custom::CustomMap;
use crate::tag::{Key, Map, Scte};

/// One media segment of a media playlist.
///
/// `limit`/`offset` mirror `EXT-X-BYTERANGE:<n>[@<o>]`: a `limit` of zero
/// means the segment has no byte range, and a negative `offset` means the
/// range resumes where the previous range in the same resource ended.
#[derive(Debug, Default)]
pub struct MediaSegment {
    /// Sequence number; unique and consecutive across the playlist.
    pub seq_id: u64,
    pub uri: String,
    /// EXTINF first parameter, seconds.
    pub duration: f64,
    /// EXTINF optional second parameter.
    pub title: String,
    /// EXT-X-BYTERANGE `<n>`, length in bytes.
    pub limit: i64,
    /// EXT-X-BYTERANGE `[@o]`, offset from the start of the resource.
    pub offset: i64,
    /// EXT-X-KEY override; applies until the next override.
    pub key: Option<Key>,
    /// EXT-X-MAP override; applies until the next override.
    pub map: Option<Map>,
    /// EXT-X-DISCONTINUITY between the surrounding segments.
    pub discontinuity: bool,
    /// EXT-X-GAP: the segment is announced but absent.
    pub gap: bool,
    /// SCTE-35 ad-signaling cue.
    pub scte: Option<Scte>,
    /// EXT-X-PROGRAM-DATE-TIME anchor for the first sample.
    pub program_date_time: Option<DateTime<FixedOffset>>,
    /// Segment-scoped custom tags, emitted before the URI.
    pub custom: CustomMap,
}

impl MediaSegment {
    pub fn new(uri: &str, duration: f64, title: &str) -> Self {
        Self {
            uri: uri.to_string(),
            duration,
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Append `#EXT-X-BYTERANGE:...` when the segment carries a range.
    pub(crate) fn write_byterange(&self, out: &mut String) {
        if self.limit <= 0 {
            return;
        }
        out.push_str("#EXT-X-BYTERANGE:");
        out.push_str(&self.limit.to_string());
        if self.offset >= 0 {
            out.push('@');
            out.push_str(&self.offset.to_string());
        }
        out.push('\n');
    }

    /// Append `#EXTINF:...`. Versions below 3 only allow integer durations.
    pub(crate) fn write_extinf(&self, ver: u8, out: &mut String) {
        out.push_str("#EXTINF:");
        if ver < 3 {
            out.push_str(&format!("{:.0}", self.duration));
        } else {
            out.push_str(&format!("{:.3}", self.duration));
        }
        out.push(',');
        out.push_str(&self.title);
        out.push('\n');
    }
}
