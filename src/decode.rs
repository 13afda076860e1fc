//! Line-by-line playlist decoding.
//!
//! The decoder consumes one logical line at a time: the classifier names the
//! line, the handlers mutate a [`DecodingState`] plus the target playlist,
//! and the first type-distinguishing tag fixes whether the stream is a
//! master or media playlist. In strict mode structural problems abort the
//! decode; in lenient mode they are logged and skipped where recovery is
//! unambiguous.

pub mod classifier;
pub mod state;

use std::io::BufRead;

use classifier::{LineClassifier, LineType};
use state::DecodingState;

use crate::attribute::decode_attributes;
use crate::custom::{CustomTag, RawTag};
use crate::playlist::segment::MediaSegment;
use crate::playlist::variant::{Alternative, Variant, VariantParams};
use crate::playlist::{ListType, MasterPlaylist, MediaPlaylist, MediaType, Playlist};
use crate::tag::daterange::parse_date;
use crate::tag::{
    DateRange, Define, Key, Map, PartialSegment, PreloadHint, Scte, Scte35CueType, Scte35Syntax,
    ServerControl,
};
use crate::version::{
    ByteRangeOrIframesOnly, DefineVariables, FloatPointDuration, IvInKey, KeyFormat,
    MapInPlaylist, SkipTag, VersionMismatch, VersionRule,
};
use crate::{Error, Result};

/// Decode a playlist from a byte buffer, detecting its type.
pub fn decode(data: &[u8], strict: bool) -> Result<Playlist> {
    decode_from(data, strict)
}

/// Decode a playlist from a streaming reader, detecting its type.
pub fn decode_from<R: BufRead>(reader: R, strict: bool) -> Result<Playlist> {
    let mut master = MasterPlaylist::new();
    let mut media = MediaPlaylist::new(0, 16)?;
    let mut state = DecodingState::default();
    run(reader, strict, &mut master, &mut media, &mut state)?;

    match state.list_type {
        Some(ListType::Master) => {
            flush_pending_custom(&mut state, |tag| master.custom.set(tag));
            Ok(Playlist::Master(master))
        }
        Some(ListType::Media) => {
            flush_pending_custom(&mut state, |tag| media.custom.set(tag));
            Ok(Playlist::Media(media))
        }
        None => Err(Error::BadFormat(
            "can't detect playlist type".to_string(),
        )),
    }
}

impl MasterPlaylist {
    /// Decode master-playlist text into this playlist.
    pub fn decode_from<R: BufRead>(&mut self, reader: R, strict: bool) -> Result<()> {
        let mut media = MediaPlaylist::new(0, 16)?;
        let mut state = DecodingState::new(Some(ListType::Master));
        run(reader, strict, self, &mut media, &mut state)
    }

    /// Decode master-playlist text from a byte buffer.
    pub fn decode(&mut self, data: &[u8], strict: bool) -> Result<()> {
        self.decode_from(data, strict)
    }
}

impl MediaPlaylist {
    /// Decode media-playlist text into this playlist. The ring grows past
    /// its declared capacity instead of rejecting segments.
    pub fn decode_from<R: BufRead>(&mut self, reader: R, strict: bool) -> Result<()> {
        let mut master = MasterPlaylist::new();
        let mut state = DecodingState::new(Some(ListType::Media));
        run(reader, strict, &mut master, self, &mut state)
    }

    /// Decode media-playlist text from a byte buffer.
    pub fn decode(&mut self, data: &[u8], strict: bool) -> Result<()> {
        self.decode_from(data, strict)
    }
}

fn flush_pending_custom(state: &mut DecodingState, mut set: impl FnMut(Box<dyn CustomTag>)) {
    for line in state.pending_custom.drain(..) {
        set(Box::new(RawTag::new(&line)));
    }
}

fn run<R: BufRead>(
    reader: R,
    strict: bool,
    master: &mut MasterPlaylist,
    media: &mut MediaPlaylist,
    state: &mut DecodingState,
) -> Result<()> {
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !state.m3u {
            state.m3u = true;
            if line == "#EXTM3U" {
                continue;
            }
            if strict {
                return Err(Error::BadFormat(
                    "playlist must start with #EXTM3U".to_string(),
                ));
            }
            tracing::warn!("playlist does not start with #EXTM3U");
        }
        decode_line(line, state, master, media, strict)?;
    }
    Ok(())
}

/// Map a version-rule verdict onto the decode mode: an error in strict
/// mode, a warning otherwise.
fn enforce(mismatch: Option<VersionMismatch>, strict: bool) -> Result<()> {
    let Some(mismatch) = mismatch else {
        return Ok(());
    };
    if strict {
        return Err(mismatch.into());
    }
    tracing::warn!(
        actual = mismatch.actual,
        required = mismatch.required,
        "{}", mismatch.description
    );
    Ok(())
}

fn parse_or_skip<T: std::str::FromStr>(s: &str, what: &str, strict: bool) -> Result<Option<T>> {
    match s.trim().parse() {
        Ok(v) => Ok(Some(v)),
        Err(_) => {
            if strict {
                return Err(Error::BadFormat(format!("invalid {what}: {s:?}")));
            }
            tracing::warn!(what, value = %s, "unparseable value, line skipped");
            Ok(None)
        }
    }
}

/// Everything after the first `:` of a tag line.
fn tag_value(line: &str) -> &str {
    line.split_once(':').map_or("", |(_, rest)| rest)
}

fn decode_line(
    line: &str,
    state: &mut DecodingState,
    master: &mut MasterPlaylist,
    media: &mut MediaPlaylist,
    strict: bool,
) -> Result<()> {
    let mut line_type = LineClassifier::classify(line);

    // Once the list type is fixed, tags of the other type are unknown.
    match state.list_type {
        Some(ListType::Master) if line_type.is_media_tag() => {
            line_type = LineType::UnknownExtTag;
        }
        Some(ListType::Media) if line_type.is_master_tag() => {
            line_type = LineType::UnknownExtTag;
        }
        _ => {}
    }

    match line_type {
        LineType::Empty | LineType::ExtM3u | LineType::Comment => {}

        LineType::Version => {
            if let Some(ver) = parse_or_skip::<u8>(tag_value(line), "protocol version", strict)? {
                master.set_version(ver);
                media.set_version(ver);
            }
        }

        LineType::TargetDuration => {
            state.set_media();
            if let Some(dur) = parse_or_skip::<f64>(tag_value(line), "target duration", strict)? {
                media.set_target_duration(dur.ceil() as u64);
            }
        }

        LineType::MediaSequence => {
            state.set_media();
            if let Some(seq) = parse_or_skip::<u64>(tag_value(line), "media sequence", strict)? {
                media.seq_no = seq;
            }
        }

        LineType::DiscontinuitySequence => {
            state.set_media();
            if let Some(seq) =
                parse_or_skip::<u64>(tag_value(line), "discontinuity sequence", strict)?
            {
                media.discontinuity_seq = seq;
            }
        }

        LineType::PlaylistType => {
            state.set_media();
            match MediaType::parse(tag_value(line)) {
                Some(media_type) => media.media_type = Some(media_type),
                None if strict => {
                    return Err(Error::BadFormat(format!("invalid playlist type: {line}")));
                }
                None => tracing::warn!(%line, "unknown playlist type, ignored"),
            }
        }

        LineType::IframesOnly => {
            state.set_media();
            enforce(ByteRangeOrIframesOnly.validate(media.version()), strict)?;
            media.iframe = true;
        }

        LineType::EndList => {
            state.set_media();
            media.closed = true;
        }

        LineType::IndependentSegments => {
            master.set_independent_segments(true);
        }

        LineType::Start => {
            state.set_media();
            for attr in decode_attributes(tag_value(line)) {
                match attr.key.as_str() {
                    "TIME-OFFSET" => {
                        if let Some(offset) =
                            parse_or_skip::<f64>(attr.unquoted(), "start time offset", strict)?
                        {
                            media.start_time = offset;
                        }
                    }
                    "PRECISE" => media.start_time_precise = attr.unquoted() == "YES",
                    _ => {}
                }
            }
        }

        LineType::Inf => {
            state.set_media();
            let value = tag_value(line);
            let (duration_str, title) = match value.split_once(',') {
                Some((duration, title)) => (duration, title),
                None => (value, ""),
            };
            enforce(
                FloatPointDuration {
                    duration: duration_str.trim(),
                }
                .validate(media.version()),
                strict,
            )?;
            if let Some(duration) = parse_or_skip::<f64>(duration_str, "EXTINF duration", strict)? {
                state.tag_inf = true;
                state.duration = duration;
                state.title = title.to_string();
            }
        }

        LineType::ByteRange => {
            state.set_media();
            enforce(ByteRangeOrIframesOnly.validate(media.version()), strict)?;
            let value = tag_value(line);
            let (limit_str, offset) = match value.split_once('@') {
                Some((limit, offset)) => (limit, Some(offset)),
                None => (value, None),
            };
            let Some(limit) = parse_or_skip::<i64>(limit_str, "byte range length", strict)? else {
                return Ok(());
            };
            let offset = match offset {
                Some(offset_str) => {
                    match parse_or_skip::<i64>(offset_str, "byte range offset", strict)? {
                        Some(offset) => offset,
                        None => return Ok(()),
                    }
                }
                None => -1,
            };
            state.tag_range = true;
            state.limit = limit;
            state.offset = offset;
        }

        LineType::Key => {
            state.set_media();
            let key = Key::from_attributes(&decode_attributes(tag_value(line)));
            enforce(IvInKey { iv: &key.iv }.validate(media.version()), strict)?;
            enforce(
                KeyFormat {
                    keyformat: &key.keyformat,
                    keyformatversions: &key.keyformatversions,
                }
                .validate(media.version()),
                strict,
            )?;
            // Ahead of the first segment the key is the playlist default;
            // later tags are per-segment overrides.
            if media.count() == 0 && !state.tag_inf && media.key.is_none() {
                media.key = Some(key);
            } else {
                state.xkey = Some(key);
            }
        }

        LineType::Map => {
            state.set_media();
            enforce(
                MapInPlaylist {
                    iframes_only: media.iframe,
                }
                .validate(media.version()),
                strict,
            )?;
            match Map::from_attributes(&decode_attributes(tag_value(line))) {
                Some(map) => {
                    if media.count() == 0 && !state.tag_inf && media.map.is_none() {
                        media.map = Some(map);
                    } else {
                        state.xmap = Some(map);
                    }
                }
                None if strict => {
                    return Err(Error::BadFormat(format!("malformed EXT-X-MAP: {line}")));
                }
                None => tracing::warn!(%line, "EXT-X-MAP without URI, ignored"),
            }
        }

        LineType::Discontinuity => {
            state.set_media();
            state.tag_discontinuity = true;
        }

        LineType::Gap => {
            state.set_media();
            state.tag_gap = true;
        }

        LineType::ProgramDateTime => {
            state.set_media();
            match parse_date(tag_value(line)) {
                Ok(at) => state.program_date_time = Some(at),
                Err(e) if strict => return Err(e),
                Err(_) => tracing::warn!(%line, "unparseable program date time, ignored"),
            }
        }

        LineType::DateRange => {
            state.set_media();
            match DateRange::from_attributes(&decode_attributes(tag_value(line))) {
                Ok(dr) if dr.has_scte35() => state.scte = Some(scte_from_date_range(dr)),
                Ok(dr) => media.append_date_range(dr),
                Err(e) if strict => return Err(e),
                Err(_) => tracing::warn!(%line, "malformed EXT-X-DATERANGE, ignored"),
            }
        }

        LineType::OatclsScte35 => {
            state.set_media();
            state.scte = Some(Scte {
                syntax: Scte35Syntax::Oatcls,
                cue_type: Scte35CueType::Cmd,
                cue: tag_value(line).to_string(),
                ..Scte::default()
            });
        }

        LineType::CueOut => {
            state.set_media();
            let value = tag_value(line);
            let duration = if value.contains('=') {
                decode_attributes(value)
                    .iter()
                    .find(|a| a.key == "DURATION")
                    .and_then(|a| a.unquoted().parse().ok())
            } else {
                value.trim().parse().ok()
            };
            let mut scte = state.scte.take().unwrap_or_else(|| Scte {
                syntax: Scte35Syntax::Oatcls,
                ..Scte::default()
            });
            scte.syntax = Scte35Syntax::Oatcls;
            scte.cue_type = Scte35CueType::Start;
            scte.duration = duration;
            state.scte = Some(scte);
        }

        LineType::CueOutCont => {
            state.set_media();
            let mut scte = Scte {
                syntax: Scte35Syntax::Oatcls,
                cue_type: Scte35CueType::Mid,
                ..Scte::default()
            };
            for attr in decode_attributes(tag_value(line)) {
                match attr.key.as_str() {
                    "ElapsedTime" => scte.elapsed = attr.unquoted().parse().unwrap_or(0.0),
                    "Duration" => scte.duration = attr.unquoted().parse().ok(),
                    "SCTE35" => scte.cue = attr.unquoted().to_string(),
                    _ => {}
                }
            }
            state.scte = Some(scte);
        }

        LineType::CueIn => {
            state.set_media();
            state.scte = Some(Scte {
                syntax: Scte35Syntax::Oatcls,
                cue_type: Scte35CueType::End,
                ..Scte::default()
            });
        }

        LineType::Scte35 | LineType::Cue => {
            state.set_media();
            state.scte = Some(Scte::from_scte67_attributes(&decode_attributes(tag_value(
                line,
            ))));
        }

        LineType::PartInf => {
            state.set_media();
            for attr in decode_attributes(tag_value(line)) {
                if attr.key == "PART-TARGET"
                    && let Some(target) =
                        parse_or_skip::<f64>(attr.unquoted(), "part target duration", strict)?
                {
                    media.part_target_duration = Some(target);
                }
            }
        }

        LineType::Part => {
            state.set_media();
            match PartialSegment::from_attributes(&decode_attributes(tag_value(line))) {
                Some(part) if !media.closed => {
                    media.append_partial(&part.uri, part.duration, part.independent)?;
                }
                Some(_) => tracing::warn!(%line, "partial segment after ENDLIST, ignored"),
                None if strict => {
                    return Err(Error::BadFormat(format!("malformed EXT-X-PART: {line}")));
                }
                None => tracing::warn!(%line, "malformed EXT-X-PART, ignored"),
            }
        }

        LineType::PreloadHint => {
            state.set_media();
            if let Some(hint) = PreloadHint::from_attributes(&decode_attributes(tag_value(line))) {
                media.preload_hint = Some(hint);
            }
        }

        LineType::ServerControl => {
            state.set_media();
            media.server_control = Some(ServerControl::from_attributes(&decode_attributes(
                tag_value(line),
            )));
        }

        LineType::Skip => {
            state.set_media();
            enforce(SkipTag.validate(media.version()), strict)?;
            for attr in decode_attributes(tag_value(line)) {
                if attr.key == "SKIPPED-SEGMENTS"
                    && let Some(skipped) =
                        parse_or_skip::<u64>(attr.unquoted(), "skipped segment count", strict)?
                {
                    // The decoded playlist models the visible window.
                    media.seq_no += skipped;
                }
            }
        }

        LineType::Define => {
            match Define::from_attributes(&decode_attributes(tag_value(line))) {
                Some(define) => {
                    let ver = match state.list_type {
                        Some(ListType::Master) => master.version(),
                        _ => media.version(),
                    };
                    enforce(DefineVariables.validate(ver), strict)?;
                    if state.list_type != Some(ListType::Media) {
                        master.defines.push(define.clone());
                    }
                    if state.list_type != Some(ListType::Master) {
                        media.defines.push(define);
                    }
                }
                None if strict => {
                    return Err(Error::BadFormat(format!("malformed EXT-X-DEFINE: {line}")));
                }
                None => tracing::warn!(%line, "malformed EXT-X-DEFINE, ignored"),
            }
        }

        LineType::StreamInf => {
            state.set_master();
            let (mut params, _) =
                VariantParams::from_attributes(&decode_attributes(tag_value(line)), false);
            params.alternatives = std::mem::take(&mut state.alternatives);
            if state.variant.replace(params).is_some() {
                tracing::warn!("EXT-X-STREAM-INF without a following URI, replaced");
            }
        }

        LineType::IframeStreamInf => {
            state.set_master();
            let (mut params, uri) =
                VariantParams::from_attributes(&decode_attributes(tag_value(line)), true);
            params.alternatives = std::mem::take(&mut state.alternatives);
            if uri.is_empty() {
                if strict {
                    return Err(Error::BadFormat(format!(
                        "EXT-X-I-FRAME-STREAM-INF without URI: {line}"
                    )));
                }
                tracing::warn!(%line, "EXT-X-I-FRAME-STREAM-INF without URI, ignored");
            } else {
                master.variants.push(Variant { uri, params });
            }
        }

        LineType::Media => {
            state.set_master();
            let alt = Alternative::from_attributes(&decode_attributes(tag_value(line)));
            match state.variant.as_mut() {
                Some(variant) => variant.alternatives.push(alt),
                None => state.alternatives.push(alt),
            }
        }

        LineType::UnknownExtTag => {
            decode_unknown_tag(line, state, master, media, strict)?;
        }

        LineType::Uri => {
            decode_uri_line(line, state, master, media, strict)?;
        }
    }
    Ok(())
}

fn decode_unknown_tag(
    line: &str,
    state: &mut DecodingState,
    master: &mut MasterPlaylist,
    media: &mut MediaPlaylist,
    strict: bool,
) -> Result<()> {
    // Registered hooks win over the raw fallback.
    let mut decoded: Option<(Box<dyn CustomTag>, bool, bool)> = None;
    if state.list_type != Some(ListType::Media)
        && let Some(decoder) = master
            .custom_decoders()
            .iter()
            .find(|d| line.starts_with(d.tag_name()))
    {
        decoded = Some((decoder.decode(line)?, false, true));
    }
    if decoded.is_none()
        && state.list_type != Some(ListType::Master)
        && let Some(decoder) = media
            .custom_decoders()
            .iter()
            .find(|d| line.starts_with(d.tag_name()))
    {
        decoded = Some((decoder.decode(line)?, decoder.segment_tag(), false));
    }

    match decoded {
        Some((tag, _, true)) => master.custom.set(tag),
        Some((tag, true, false)) => state.seg_custom.set(tag),
        Some((tag, false, false)) => media.custom.set(tag),
        None => {
            if strict {
                return Err(Error::UnknownTag(
                    RawTag::new(line).tag_name().to_string(),
                ));
            }
            tracing::debug!(%line, "unknown tag kept verbatim");
            let raw = Box::new(RawTag::new(line));
            match state.list_type {
                Some(ListType::Master) => master.custom.set(raw),
                Some(ListType::Media) if state.tag_inf => state.seg_custom.set(raw),
                Some(ListType::Media) => media.custom.set(raw),
                None => state.pending_custom.push(line.to_string()),
            }
        }
    }
    Ok(())
}

fn decode_uri_line(
    line: &str,
    state: &mut DecodingState,
    master: &mut MasterPlaylist,
    media: &mut MediaPlaylist,
    strict: bool,
) -> Result<()> {
    if state.list_type == Some(ListType::Master) {
        match state.variant.take() {
            Some(params) => master.variants.push(Variant {
                uri: line.to_string(),
                params,
            }),
            None => tracing::debug!(%line, "URI without pending EXT-X-STREAM-INF, ignored"),
        }
        return Ok(());
    }

    if !state.tag_inf {
        tracing::debug!(%line, "URI without pending EXTINF, ignored");
        return Ok(());
    }
    if media.closed {
        state.reset_segment();
        if strict {
            return Err(Error::BadFormat(format!(
                "segment after EXT-X-ENDLIST: {line}"
            )));
        }
        tracing::warn!(%line, "segment after EXT-X-ENDLIST, ignored");
        return Ok(());
    }

    let mut seg = MediaSegment::new(line, state.duration, &state.title);
    if state.tag_range {
        seg.limit = state.limit;
        seg.offset = state.offset;
    }
    seg.key = state.xkey.take();
    seg.map = state.xmap.take();
    seg.discontinuity = state.tag_discontinuity;
    seg.gap = state.tag_gap;
    seg.scte = state.scte.take();
    seg.program_date_time = state.program_date_time.take();
    seg.custom = std::mem::take(&mut state.seg_custom);
    media.append_segment_grow(seg)?;
    state.reset_segment();
    Ok(())
}

fn scte_from_date_range(dr: DateRange) -> Scte {
    let (cue_type, cue) = if !dr.scte35_out.is_empty() {
        (Scte35CueType::Start, dr.scte35_out.clone())
    } else if !dr.scte35_in.is_empty() {
        (Scte35CueType::End, dr.scte35_in.clone())
    } else {
        (Scte35CueType::Cmd, dr.scte35_cmd.clone())
    };
    Scte {
        syntax: Scte35Syntax::DateRange,
        cue_type,
        cue,
        id: dr.id,
        time: 0.0,
        elapsed: 0.0,
        planned_duration: dr.planned_duration,
        duration: dr.duration,
        start_date: dr.start_date,
        end_date: dr.end_date,
    }
}
