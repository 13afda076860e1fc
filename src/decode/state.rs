use chrono::{DateTime, FixedOffset};

use crate::custom::CustomMap;
use crate::playlist::variant::{Alternative, VariantParams};
use crate::playlist::ListType;
use crate::tag::{Key, Map, Scte};

/// Per-line context accumulated while decoding, cleared between segments.
///
/// Tags arm pending fields here; the next URI line assembles them into a
/// segment (media playlists) or variant (master playlists). Key and map
/// inheritance is the only state that deliberately survives a segment
/// boundary, and it lives on the playlists themselves.
#[derive(Debug, Default)]
pub struct DecodingState {
    /// `#EXTM3U` has been seen (or tolerated as missing in lenient mode).
    pub m3u: bool,
    /// Lazily fixed by the first type-distinguishing tag.
    pub list_type: Option<ListType>,
    /// `#EXTINF` armed; the next URI completes a segment.
    pub tag_inf: bool,
    /// `#EXT-X-BYTERANGE` armed for the next segment.
    pub tag_range: bool,
    pub duration: f64,
    pub title: String,
    pub limit: i64,
    pub offset: i64,
    pub tag_discontinuity: bool,
    pub tag_gap: bool,
    pub program_date_time: Option<DateTime<FixedOffset>>,
    /// Pending key override for the next segment.
    pub xkey: Option<Key>,
    /// Pending map override for the next segment.
    pub xmap: Option<Map>,
    /// Pending SCTE-35 cue for the next segment.
    pub scte: Option<Scte>,
    /// Pending segment-scoped custom tags.
    pub seg_custom: CustomMap,
    /// `#EXT-X-STREAM-INF` params awaiting their URI line.
    pub variant: Option<VariantParams>,
    /// `#EXT-X-MEDIA` renditions awaiting their variant.
    pub alternatives: Vec<Alternative>,
    /// Raw unknown tag lines seen before the list type was fixed.
    pub pending_custom: Vec<String>,
}

impl DecodingState {
    pub fn new(list_type: Option<ListType>) -> Self {
        Self {
            list_type,
            ..Self::default()
        }
    }

    pub fn set_master(&mut self) {
        self.list_type.get_or_insert(ListType::Master);
    }

    pub fn set_media(&mut self) {
        self.list_type.get_or_insert(ListType::Media);
    }

    /// Clear everything scoped to the segment that just completed.
    pub fn reset_segment(&mut self) {
        self.tag_inf = false;
        self.tag_range = false;
        self.duration = 0.0;
        self.title.clear();
        self.limit = 0;
        self.offset = 0;
        self.tag_discontinuity = false;
        self.tag_gap = false;
        self.program_date_time = None;
        self.xkey = None;
        self.xmap = None;
        self.scte = None;
        self.seg_custom = CustomMap::new();
    }
}
