use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat};

use super::{MediaType, MIN_VER, write_uri};
use crate::custom::{CustomDecoder, CustomMap, CustomTag};
use crate::playlist::segment::MediaSegment;
use crate::tag::lowlatency::write_part_inf;
use crate::tag::{
    minimal_float, DateRange, Define, Key, Map, PartialSegment, PreloadHint, Scte, Scte35CueType,
    Scte35Syntax, ServerControl,
};
use crate::version::{
    ByteRangeOrIframesOnly, DefineVariables, IvInKey, KeyFormat, MapInPlaylist, SkipTag,
    VersionRule,
};
use crate::{Error, Result};

/// A single-bitrate (media) playlist.
///
/// Segments live in a fixed-capacity ring; for a live playlist only the most
/// recent `winsize` segments are rendered and [`MediaPlaylist::slide`]
/// advances the window. A `winsize` of zero renders every stored segment
/// (VOD and EVENT lists).
#[derive(Debug)]
pub struct MediaPlaylist {
    /// EXT-X-TARGETDURATION. Recomputed from the stored segments on append
    /// unless locked by [`MediaPlaylist::set_target_duration`] or a decoded
    /// tag.
    pub target_duration: u64,
    /// EXT-X-MEDIA-SEQUENCE: sequence number of the first stored segment.
    pub seq_no: u64,
    /// EXT-X-DISCONTINUITY-SEQUENCE.
    pub discontinuity_seq: u64,
    /// EXT-X-I-FRAMES-ONLY.
    pub iframe: bool,
    /// ENDLIST has been emitted; the playlist accepts no more segments.
    pub closed: bool,
    /// EXT-X-PLAYLIST-TYPE.
    pub media_type: Option<MediaType>,
    /// EXT-X-START:TIME-OFFSET, seconds. Zero means unset.
    pub start_time: f64,
    /// EXT-X-START:PRECISE=YES.
    pub start_time_precise: bool,
    /// Initial EXT-X-KEY, in effect until a segment overrides it.
    pub key: Option<Key>,
    /// Default EXT-X-MAP, in effect until a segment overrides it.
    pub map: Option<Map>,
    /// Optional query appended to every segment URI.
    pub args: Option<String>,
    /// EXT-X-DEFINE declarations in insertion order.
    pub defines: Vec<Define>,
    /// Playlist-scoped EXT-X-DATERANGE entries.
    pub date_ranges: Vec<DateRange>,
    /// Low-latency partial segments, oldest first.
    pub partial_segments: Vec<PartialSegment>,
    /// EXT-X-PART-INF:PART-TARGET.
    pub part_target_duration: Option<f64>,
    /// Trailing EXT-X-PRELOAD-HINT.
    pub preload_hint: Option<PreloadHint>,
    /// EXT-X-SERVER-CONTROL block.
    pub server_control: Option<ServerControl>,
    /// Header-scoped custom tags in declaration order.
    pub custom: CustomMap,
    segments: Vec<Option<MediaSegment>>,
    winsize: usize,
    capacity: usize,
    head: usize,
    tail: usize,
    count: usize,
    ver: u8,
    target_dur_locked: bool,
    cache: Option<String>,
    custom_decoders: Vec<Box<dyn CustomDecoder>>,
}

impl MediaPlaylist {
    /// Create an empty playlist rendering `winsize` segments out of at most
    /// `capacity` stored ones. Fails with [`Error::InvalidSize`] when
    /// `winsize > capacity` or `capacity` is zero.
    pub fn new(winsize: usize, capacity: usize) -> Result<Self> {
        if winsize > capacity || capacity == 0 {
            return Err(Error::InvalidSize);
        }
        let mut segments = Vec::new();
        segments.resize_with(capacity, || None);
        Ok(Self {
            target_duration: 0,
            seq_no: 0,
            discontinuity_seq: 0,
            iframe: false,
            closed: false,
            media_type: None,
            start_time: 0.0,
            start_time_precise: false,
            key: None,
            map: None,
            args: None,
            defines: Vec::new(),
            date_ranges: Vec::new(),
            partial_segments: Vec::new(),
            part_target_duration: None,
            preload_hint: None,
            server_control: None,
            custom: CustomMap::new(),
            segments,
            winsize,
            capacity,
            head: 0,
            tail: 0,
            count: 0,
            ver: MIN_VER,
            target_dur_locked: false,
            cache: None,
            custom_decoders: Vec::new(),
        })
    }

    /// Register custom decoders used by [`MediaPlaylist::decode_from`].
    pub fn with_custom_decoders(mut self, decoders: Vec<Box<dyn CustomDecoder>>) -> Self {
        self.custom_decoders = decoders;
        self
    }

    pub(crate) fn custom_decoders(&self) -> &[Box<dyn CustomDecoder>] {
        &self.custom_decoders
    }

    pub fn version(&self) -> u8 {
        self.ver
    }

    pub fn set_version(&mut self, ver: u8) {
        self.ver = ver;
        self.reset_cache();
    }

    pub(crate) fn raise_version(&mut self, required: u8) {
        if required > self.ver {
            self.ver = required;
        }
    }

    pub fn winsize(&self) -> usize {
        self.winsize
    }

    /// Change the rendered window. Fails with [`Error::InvalidSize`] when
    /// `winsize` exceeds the capacity.
    pub fn set_winsize(&mut self, winsize: usize) -> Result<()> {
        if winsize > self.capacity {
            return Err(Error::InvalidSize);
        }
        self.winsize = winsize;
        self.reset_cache();
        Ok(())
    }

    /// Number of stored segments.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Ring index of the most recently appended segment. Positionally
    /// defined even when the playlist is empty.
    pub(crate) fn last_idx(&self) -> usize {
        (self.head + self.capacity - 1) % self.capacity
    }

    /// Stored segments in sequence order.
    pub fn segments(&self) -> impl Iterator<Item = &MediaSegment> {
        (0..self.count).filter_map(|i| self.segments[(self.tail + i) % self.capacity].as_ref())
    }

    /// Stored segment by window position, `0` being the oldest.
    pub fn segment(&self, index: usize) -> Option<&MediaSegment> {
        if index >= self.count {
            return None;
        }
        self.segments[(self.tail + index) % self.capacity].as_ref()
    }

    pub fn last_segment(&self) -> Option<&MediaSegment> {
        if self.count == 0 {
            return None;
        }
        self.segments[self.last_idx()].as_ref()
    }

    fn last_segment_mut(&mut self) -> Result<&mut MediaSegment> {
        if self.count == 0 {
            return Err(Error::PlaylistEmpty);
        }
        let idx = self.last_idx();
        self.segments[idx].as_mut().ok_or(Error::PlaylistEmpty)
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::InvalidArgument(
                "playlist is closed for appending".to_string(),
            ));
        }
        Ok(())
    }

    fn check_duration(duration: f64) -> Result<()> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "segment duration must be a non-negative finite number, got {duration}"
            )));
        }
        Ok(())
    }

    /// Append one segment. Fails with [`Error::PlaylistFull`] at capacity.
    pub fn append(&mut self, uri: &str, duration: f64, title: &str) -> Result<()> {
        Self::check_duration(duration)?;
        self.append_segment(MediaSegment::new(uri, duration, title))
    }

    /// Append a pre-built segment, assigning its sequence id unless the
    /// caller already set one.
    pub fn append_segment(&mut self, mut seg: MediaSegment) -> Result<()> {
        self.check_open()?;
        if self.count == self.capacity {
            return Err(Error::PlaylistFull);
        }
        if seg.seq_id == 0 {
            seg.seq_id = match self.last_segment() {
                Some(last) => last.seq_id + 1,
                None => self.seq_no,
            };
        }
        let seq = seg.seq_id;
        let uri = seg.uri.clone();
        self.segments[self.head] = Some(seg);
        self.head = (self.head + 1) % self.capacity;
        self.count += 1;

        // Partials older than the last three full segments fall out of the
        // low-latency window.
        if !self.partial_segments.is_empty() {
            self.partial_segments.retain(|p| p.seq_id + 3 > seq);
            tracing::debug!(parent_uri = %uri, seq, "bound partial segments to full segment");
        }

        self.recompute_target_duration();
        self.reset_cache();
        Ok(())
    }

    /// Used by the decoder: append and double the ring instead of failing
    /// when it is full.
    pub(crate) fn append_segment_grow(&mut self, seg: MediaSegment) -> Result<()> {
        if self.count == self.capacity {
            self.grow();
        }
        self.append_segment(seg)
    }

    fn grow(&mut self) {
        let new_capacity = self.capacity * 2;
        let mut segments = Vec::new();
        segments.resize_with(new_capacity, || None);
        for (i, slot) in segments.iter_mut().take(self.count).enumerate() {
            *slot = self.segments[(self.tail + i) % self.capacity].take();
        }
        self.segments = segments;
        self.capacity = new_capacity;
        self.tail = 0;
        self.head = self.count;
    }

    /// FIFO slide: drop the oldest segment once the window is full, then
    /// append. Never fails due to capacity when `winsize <= capacity`.
    pub fn slide(&mut self, uri: &str, duration: f64, title: &str) -> Result<()> {
        self.check_open()?;
        Self::check_duration(duration)?;
        if self.count > 0 && self.count >= self.winsize {
            self.remove()?;
        }
        self.append(uri, duration, title)
    }

    /// Remove the oldest segment, advancing the media sequence. Fails with
    /// [`Error::PlaylistEmpty`] when nothing is stored.
    pub fn remove(&mut self) -> Result<()> {
        if self.count == 0 {
            return Err(Error::PlaylistEmpty);
        }
        self.segments[self.tail] = None;
        self.tail = (self.tail + 1) % self.capacity;
        self.count -= 1;
        self.seq_no += 1;
        self.reset_cache();
        Ok(())
    }

    /// Max stored segment duration rounded per protocol version: ceiling up
    /// to version 5, nearest integer from version 6. Zero when empty.
    pub fn calculate_target_duration(&self, ver: u8) -> u64 {
        let max = self
            .segments()
            .map(|s| s.duration)
            .fold(0.0_f64, f64::max);
        if ver >= 6 { max.round() as u64 } else { max.ceil() as u64 }
    }

    fn recompute_target_duration(&mut self) {
        if !self.target_dur_locked {
            self.target_duration = self.calculate_target_duration(self.ver);
        }
    }

    /// Lock the target duration to an explicit value; suppresses
    /// recomputation on later appends.
    pub fn set_target_duration(&mut self, duration: u64) {
        self.target_duration = duration;
        self.target_dur_locked = true;
        self.reset_cache();
    }

    /// Set the encryption key of the last appended segment.
    pub fn set_key(
        &mut self,
        method: &str,
        uri: &str,
        iv: &str,
        keyformat: &str,
        keyformatversions: &str,
    ) -> Result<()> {
        if self.count == 0 {
            return Err(Error::PlaylistEmpty);
        }
        let key = Key::new(method, uri, iv, keyformat, keyformatversions);
        self.raise_key_version(&key);
        self.last_segment_mut()?.key = Some(key);
        self.reset_cache();
        Ok(())
    }

    /// Set the playlist-level key applied to segments before any override.
    pub fn set_default_key(
        &mut self,
        method: &str,
        uri: &str,
        iv: &str,
        keyformat: &str,
        keyformatversions: &str,
    ) -> Result<()> {
        let key = Key::new(method, uri, iv, keyformat, keyformatversions);
        self.raise_key_version(&key);
        self.key = Some(key);
        self.reset_cache();
        Ok(())
    }

    fn raise_key_version(&mut self, key: &Key) {
        let iv_rule = IvInKey { iv: &key.iv };
        if iv_rule.triggered() {
            self.raise_version(iv_rule.required());
        }
        let format_rule = KeyFormat {
            keyformat: &key.keyformat,
            keyformatversions: &key.keyformatversions,
        };
        if format_rule.triggered() {
            self.raise_version(format_rule.required());
        }
    }

    /// Set the Media Initialization Section of the last appended segment.
    pub fn set_map(&mut self, uri: &str, limit: i64, offset: i64) -> Result<()> {
        if self.count == 0 {
            return Err(Error::PlaylistEmpty);
        }
        self.raise_version(MapInPlaylist { iframes_only: self.iframe }.required());
        self.last_segment_mut()?.map = Some(Map::new(uri, limit, offset));
        self.reset_cache();
        Ok(())
    }

    /// Set the default Media Initialization Section.
    pub fn set_default_map(&mut self, uri: &str, limit: i64, offset: i64) {
        self.raise_version(MapInPlaylist { iframes_only: self.iframe }.required());
        self.map = Some(Map::new(uri, limit, offset));
        self.reset_cache();
    }

    /// Mark the playlist I-frames-only, which requires protocol version 4.
    pub fn set_iframe_only(&mut self) {
        self.iframe = true;
        self.raise_version(ByteRangeOrIframesOnly.required());
        self.reset_cache();
    }

    /// Set the byte range of the last appended segment. A negative `offset`
    /// resumes from the previous range in the same resource.
    pub fn set_range(&mut self, limit: i64, offset: i64) -> Result<()> {
        if self.count == 0 {
            return Err(Error::PlaylistEmpty);
        }
        self.raise_version(ByteRangeOrIframesOnly.required());
        let seg = self.last_segment_mut()?;
        seg.limit = limit;
        seg.offset = offset;
        self.reset_cache();
        Ok(())
    }

    /// Attach an SCTE-67 2014 cue to the last appended segment.
    pub fn set_scte(&mut self, cue: &str, id: &str, time: f64) -> Result<()> {
        self.set_scte35(Scte {
            syntax: Scte35Syntax::Scte67_2014,
            cue_type: Scte35CueType::Start,
            cue: cue.to_string(),
            id: id.to_string(),
            time,
            ..Scte::default()
        })
    }

    /// Attach an SCTE-35 cue of any syntax to the last appended segment.
    pub fn set_scte35(&mut self, scte: Scte) -> Result<()> {
        self.last_segment_mut()?.scte = Some(scte);
        self.reset_cache();
        Ok(())
    }

    /// Mark the last appended segment as a gap.
    pub fn set_gap(&mut self) -> Result<()> {
        self.last_segment_mut()?.gap = true;
        self.reset_cache();
        Ok(())
    }

    /// Mark a discontinuity before the last appended segment.
    pub fn set_discontinuity(&mut self) -> Result<()> {
        self.last_segment_mut()?.discontinuity = true;
        self.reset_cache();
        Ok(())
    }

    /// Anchor the last appended segment to an absolute date and time.
    pub fn set_program_date_time(&mut self, at: DateTime<FixedOffset>) -> Result<()> {
        self.last_segment_mut()?.program_date_time = Some(at);
        self.reset_cache();
        Ok(())
    }

    /// Set a header-scoped custom tag, replacing any previous tag with the
    /// same name.
    pub fn set_custom_tag(&mut self, tag: Box<dyn CustomTag>) {
        self.custom.set(tag);
        self.reset_cache();
    }

    /// Set a custom tag on the last appended segment.
    pub fn set_custom_segment_tag(&mut self, tag: Box<dyn CustomTag>) -> Result<()> {
        self.last_segment_mut()?.custom.set(tag);
        self.reset_cache();
        Ok(())
    }

    /// Append a low-latency partial segment. The part is provisionally
    /// bound to the next full sequence number.
    pub fn append_partial(&mut self, uri: &str, duration: f64, independent: bool) -> Result<()> {
        self.check_open()?;
        Self::check_duration(duration)?;
        self.partial_segments.push(PartialSegment {
            seq_id: self.seq_no + self.count as u64,
            uri: uri.to_string(),
            duration,
            independent,
        });
        self.reset_cache();
        Ok(())
    }

    pub fn set_preload_hint(&mut self, hint_type: &str, uri: &str) {
        self.preload_hint = Some(PreloadHint::new(hint_type, uri));
        self.reset_cache();
    }

    pub fn set_server_control(&mut self, control: ServerControl) -> Result<()> {
        self.server_control = Some(control);
        self.reset_cache();
        Ok(())
    }

    /// Append an EXT-X-DEFINE declaration, raising the version to 8.
    pub fn append_define(&mut self, define: Define) -> Result<()> {
        self.raise_version(DefineVariables.required());
        self.defines.push(define);
        self.reset_cache();
        Ok(())
    }

    /// Append a playlist-scoped date range.
    pub fn append_date_range(&mut self, date_range: DateRange) {
        self.date_ranges.push(date_range);
        self.reset_cache();
    }

    /// Close the playlist: render `#EXT-X-ENDLIST` and refuse further
    /// appends.
    pub fn close(&mut self) {
        self.closed = true;
        self.reset_cache();
    }

    pub(crate) fn reset_cache(&mut self) {
        self.cache = None;
    }

    /// Render to canonical text, caching the result until the next
    /// mutation.
    pub fn encode(&mut self) -> &str {
        if self.cache.is_none() {
            self.cache = Some(self.render(0));
        }
        self.cache.as_deref().unwrap_or_default()
    }

    /// Render a playlist delta update skipping the first `skipped` stored
    /// segments, raising the version to 9.
    pub fn encode_with_skip(&mut self, skipped: u64) -> Result<String> {
        if skipped as usize > self.count {
            return Err(Error::InvalidArgument(format!(
                "cannot skip {skipped} of {} segments",
                self.count
            )));
        }
        self.raise_version(SkipTag.required());
        Ok(self.render(skipped))
    }

    fn render(&self, skipped: u64) -> String {
        let mut out = String::with_capacity(1024);
        out.push_str("#EXTM3U\n#EXT-X-VERSION:");
        out.push_str(&self.ver.to_string());
        out.push('\n');

        for define in &self.defines {
            define.write_line(&mut out);
        }
        if let Some(control) = &self.server_control {
            control.write_line(&mut out);
        }
        if let Some(part_target) = self.part_target_duration {
            write_part_inf(part_target, &mut out);
        }
        if let Some(media_type) = self.media_type {
            out.push_str("#EXT-X-PLAYLIST-TYPE:");
            out.push_str(media_type.as_str());
            out.push('\n');
        }
        out.push_str("#EXT-X-MEDIA-SEQUENCE:");
        out.push_str(&self.seq_no.to_string());
        out.push('\n');
        if self.discontinuity_seq != 0 {
            out.push_str("#EXT-X-DISCONTINUITY-SEQUENCE:");
            out.push_str(&self.discontinuity_seq.to_string());
            out.push('\n');
        }
        if self.iframe {
            out.push_str("#EXT-X-I-FRAMES-ONLY\n");
        }
        let target_duration = if self.target_dur_locked {
            self.target_duration
        } else {
            self.calculate_target_duration(self.ver)
        };
        out.push_str("#EXT-X-TARGETDURATION:");
        out.push_str(&target_duration.to_string());
        out.push('\n');
        if self.start_time != 0.0 {
            out.push_str("#EXT-X-START:TIME-OFFSET=");
            out.push_str(&minimal_float(self.start_time));
            if self.start_time_precise {
                out.push_str(",PRECISE=YES");
            }
            out.push('\n');
        }

        let mut current_key = self.key.clone();
        let mut current_map = self.map.clone();
        if let Some(key) = &self.key {
            key.write_line("#EXT-X-KEY:", &mut out);
        }
        // A delta update omits the default map: it was already delivered
        // with the skipped part of the playlist.
        if skipped > 0 {
            current_map = None;
        } else if let Some(map) = &self.map {
            map.write_line(&mut out);
        }
        for date_range in &self.date_ranges {
            date_range.write_line(&mut out);
        }
        for tag in self.custom.iter() {
            if let Some(line) = tag.encode() {
                out.push_str(&line);
                out.push('\n');
            }
        }
        if skipped > 0 {
            out.push_str("#EXT-X-SKIP:SKIPPED-SEGMENTS=");
            out.push_str(&skipped.to_string());
            out.push('\n');
        }

        // The window is the first `winsize` stored segments starting at the
        // tail; zero renders everything. A delta update starts past the
        // skipped ones.
        let window = if self.winsize == 0 {
            self.count
        } else {
            self.winsize.min(self.count)
        };
        let start = (skipped as usize).min(window);
        let rendered = window - start;

        let mut last_seq = None;
        for i in 0..rendered {
            let idx = (self.tail + start + i) % self.capacity;
            let Some(seg) = self.segments[idx].as_ref() else {
                continue;
            };
            last_seq = Some(seg.seq_id);

            if seg.discontinuity {
                out.push_str("#EXT-X-DISCONTINUITY\n");
            }
            if let Some(at) = &seg.program_date_time {
                out.push_str("#EXT-X-PROGRAM-DATE-TIME:");
                out.push_str(&at.to_rfc3339_opts(SecondsFormat::AutoSi, true));
                out.push('\n');
            }
            if let Some(key) = &seg.key
                && current_key.as_ref() != Some(key)
            {
                key.write_line("#EXT-X-KEY:", &mut out);
                current_key = Some(key.clone());
            }
            if let Some(map) = &seg.map
                && current_map.as_ref() != Some(map)
            {
                map.write_line(&mut out);
                current_map = Some(map.clone());
            }
            seg.write_byterange(&mut out);
            if let Some(scte) = &seg.scte {
                scte.write_lines(&mut out);
            }
            for part in &self.partial_segments {
                if part.seq_id == seg.seq_id {
                    part.write_line(&mut out);
                }
            }
            seg.write_extinf(self.ver, &mut out);
            if seg.gap {
                out.push_str("#EXT-X-GAP\n");
            }
            for tag in seg.custom.iter() {
                if let Some(line) = tag.encode() {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
            write_uri(&seg.uri, self.args.as_deref(), &mut out);
            out.push('\n');
        }

        // Parts of the not-yet-complete next segment trail the window.
        let trailing_from = match last_seq {
            Some(seq) => seq + 1,
            None => 0,
        };
        for part in &self.partial_segments {
            if part.seq_id >= trailing_from {
                part.write_line(&mut out);
            }
        }
        if let Some(hint) = &self.preload_hint {
            hint.write_line(&mut out);
        }
        if self.closed {
            out.push_str("#EXT-X-ENDLIST\n");
        }
        out
    }
}

impl fmt::Display for MediaPlaylist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(0))
    }
}
