use super::write_uri;
use crate::attribute::Attribute;

/// A variant entry of a master playlist: the URI of a media playlist plus
/// its `EXT-X-STREAM-INF` / `EXT-X-I-FRAME-STREAM-INF` parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variant {
    pub uri: String,
    pub params: VariantParams,
}

/// Attributes of a variant stream. Empty strings and zero numbers mean the
/// attribute is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantParams {
    /// Legacy PROGRAM-ID, removed in protocol version 6.
    pub program_id: u32,
    pub bandwidth: u32,
    pub average_bandwidth: u32,
    pub codecs: String,
    /// `WxH` string, carried verbatim.
    pub resolution: String,
    pub audio: String,
    pub video: String,
    pub subtitles: String,
    /// CLOSED-CAPTIONS group id, or the literal `NONE`.
    pub captions: String,
    /// Non-standard NAME extension (Wowza/JWPlayer).
    pub name: String,
    /// The variant is an `EXT-X-I-FRAME-STREAM-INF` entry.
    pub iframe: bool,
    pub video_range: String,
    pub hdcp_level: String,
    pub frame_rate: f64,
    /// `EXT-X-MEDIA` renditions tied to this variant.
    pub alternatives: Vec<Alternative>,
}

impl VariantParams {
    /// Build from a decoded attribute list; `iframe` selects the tag the
    /// attributes came from.
    pub(crate) fn from_attributes(attrs: &[Attribute], iframe: bool) -> (Self, String) {
        let mut params = Self {
            iframe,
            ..Self::default()
        };
        let mut uri = String::new();
        for attr in attrs {
            match attr.key.as_str() {
                "PROGRAM-ID" => params.program_id = attr.unquoted().parse().unwrap_or(0),
                "BANDWIDTH" => params.bandwidth = attr.unquoted().parse().unwrap_or(0),
                "AVERAGE-BANDWIDTH" => {
                    params.average_bandwidth = attr.unquoted().parse().unwrap_or(0)
                }
                "CODECS" => params.codecs = attr.unquoted().to_string(),
                "RESOLUTION" => params.resolution = attr.unquoted().to_string(),
                "AUDIO" => params.audio = attr.unquoted().to_string(),
                "VIDEO" => params.video = attr.unquoted().to_string(),
                "SUBTITLES" => params.subtitles = attr.unquoted().to_string(),
                "CLOSED-CAPTIONS" => params.captions = attr.unquoted().to_string(),
                "NAME" => params.name = attr.unquoted().to_string(),
                "FRAME-RATE" => params.frame_rate = attr.unquoted().parse().unwrap_or(0.0),
                "VIDEO-RANGE" => params.video_range = attr.unquoted().to_string(),
                "HDCP-LEVEL" => params.hdcp_level = attr.unquoted().to_string(),
                "URI" => uri = attr.unquoted().to_string(),
                _ => {}
            }
        }
        (params, uri)
    }
}

/// An `EXT-X-MEDIA` rendition: an alternate version of the content such as
/// another audio language or camera angle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alternative {
    pub media_type: String,
    pub uri: String,
    pub group_id: String,
    pub language: String,
    pub assoc_language: String,
    pub name: String,
    pub stable_rendition_id: String,
    pub default: bool,
    pub autoselect: bool,
    pub forced: bool,
    pub instream_id: String,
    pub bit_depth: u8,
    pub sample_rate: u32,
    pub characteristics: String,
    pub channels: String,
}

impl Alternative {
    pub(crate) fn from_attributes(attrs: &[Attribute]) -> Self {
        let mut alt = Self::default();
        for attr in attrs {
            match attr.key.as_str() {
                "TYPE" => alt.media_type = attr.unquoted().to_string(),
                "URI" => alt.uri = attr.unquoted().to_string(),
                "GROUP-ID" => alt.group_id = attr.unquoted().to_string(),
                "LANGUAGE" => alt.language = attr.unquoted().to_string(),
                "ASSOC-LANGUAGE" => alt.assoc_language = attr.unquoted().to_string(),
                "NAME" => alt.name = attr.unquoted().to_string(),
                "STABLE-RENDITION-ID" => alt.stable_rendition_id = attr.unquoted().to_string(),
                "DEFAULT" => alt.default = attr.unquoted() == "YES",
                "AUTOSELECT" => alt.autoselect = attr.unquoted() == "YES",
                "FORCED" => alt.forced = attr.unquoted() == "YES",
                "INSTREAM-ID" => alt.instream_id = attr.unquoted().to_string(),
                "BIT-DEPTH" => alt.bit_depth = attr.unquoted().parse().unwrap_or(0),
                "SAMPLE-RATE" => alt.sample_rate = attr.unquoted().parse().unwrap_or(0),
                "CHARACTERISTICS" => alt.characteristics = attr.unquoted().to_string(),
                "CHANNELS" => alt.channels = attr.unquoted().to_string(),
                _ => {}
            }
        }
        alt
    }

    /// Append `#EXT-X-MEDIA:...` to the output.
    pub(crate) fn write_line(&self, out: &mut String) {
        out.push_str("#EXT-X-MEDIA:TYPE=");
        out.push_str(&self.media_type);
        push_quoted(out, "GROUP-ID", &self.group_id);
        push_quoted(out, "NAME", &self.name);
        push_quoted(out, "LANGUAGE", &self.language);
        push_quoted(out, "ASSOC-LANGUAGE", &self.assoc_language);
        push_quoted(out, "STABLE-RENDITION-ID", &self.stable_rendition_id);
        if self.default {
            out.push_str(",DEFAULT=YES");
        } else {
            out.push_str(",DEFAULT=NO");
        }
        if self.autoselect {
            out.push_str(",AUTOSELECT=YES");
        }
        if self.forced {
            out.push_str(",FORCED=YES");
        }
        push_quoted(out, "INSTREAM-ID", &self.instream_id);
        if self.bit_depth > 0 {
            out.push_str(",BIT-DEPTH=");
            out.push_str(&self.bit_depth.to_string());
        }
        if self.sample_rate > 0 {
            out.push_str(",SAMPLE-RATE=");
            out.push_str(&self.sample_rate.to_string());
        }
        push_quoted(out, "CHARACTERISTICS", &self.characteristics);
        push_quoted(out, "CHANNELS", &self.channels);
        push_quoted(out, "URI", &self.uri);
        out.push('\n');
    }
}

fn push_quoted(out: &mut String, key: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    out.push(',');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(value);
    out.push('"');
}

fn push_unquoted(out: &mut String, key: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    out.push(',');
    out.push_str(key);
    out.push('=');
    out.push_str(value);
}

impl Variant {
    /// Append the variant's `EXT-X-MEDIA` lines and stream-inf entry.
    pub(crate) fn write(&self, args: Option<&str>, out: &mut String) {
        for alt in &self.params.alternatives {
            alt.write_line(out);
        }
        if self.params.iframe {
            self.write_iframe_stream_inf(args, out);
        } else {
            self.write_stream_inf(args, out);
        }
    }

    fn write_stream_inf(&self, args: Option<&str>, out: &mut String) {
        let p = &self.params;
        out.push_str("#EXT-X-STREAM-INF:");
        if p.program_id > 0 {
            out.push_str("PROGRAM-ID=");
            out.push_str(&p.program_id.to_string());
            out.push(',');
        }
        out.push_str("BANDWIDTH=");
        out.push_str(&p.bandwidth.to_string());
        if p.average_bandwidth > 0 {
            out.push_str(",AVERAGE-BANDWIDTH=");
            out.push_str(&p.average_bandwidth.to_string());
        }
        push_quoted(out, "CODECS", &p.codecs);
        push_unquoted(out, "RESOLUTION", &p.resolution);
        push_quoted(out, "AUDIO", &p.audio);
        push_quoted(out, "VIDEO", &p.video);
        push_quoted(out, "SUBTITLES", &p.subtitles);
        push_quoted(out, "NAME", &p.name);
        if p.frame_rate > 0.0 {
            out.push_str(&format!(",FRAME-RATE={:.3}", p.frame_rate));
        }
        push_unquoted(out, "HDCP-LEVEL", &p.hdcp_level);
        push_unquoted(out, "VIDEO-RANGE", &p.video_range);
        if !p.captions.is_empty() {
            if p.captions == "NONE" {
                out.push_str(",CLOSED-CAPTIONS=NONE");
            } else {
                push_quoted(out, "CLOSED-CAPTIONS", &p.captions);
            }
        }
        out.push('\n');
        write_uri(&self.uri, args, out);
        out.push('\n');
    }

    fn write_iframe_stream_inf(&self, args: Option<&str>, out: &mut String) {
        let p = &self.params;
        out.push_str("#EXT-X-I-FRAME-STREAM-INF:");
        if p.program_id > 0 {
            out.push_str("PROGRAM-ID=");
            out.push_str(&p.program_id.to_string());
            out.push(',');
        }
        out.push_str("BANDWIDTH=");
        out.push_str(&p.bandwidth.to_string());
        if p.average_bandwidth > 0 {
            out.push_str(",AVERAGE-BANDWIDTH=");
            out.push_str(&p.average_bandwidth.to_string());
        }
        push_quoted(out, "CODECS", &p.codecs);
        push_unquoted(out, "RESOLUTION", &p.resolution);
        push_quoted(out, "VIDEO", &p.video);
        push_unquoted(out, "HDCP-LEVEL", &p.hdcp_level);
        push_unquoted(out, "VIDEO-RANGE", &p.video_range);
        out.push_str(",URI=\"");
        write_uri(&self.uri, args, out);
        out.push_str("\"\n");
    }
}
