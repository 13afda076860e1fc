use std::fmt;

use super::MIN_VER;
use crate::custom::{CustomDecoder, CustomMap, CustomTag};
use crate::playlist::variant::{Variant, VariantParams};
use crate::tag::{Define, DefineKind};
use crate::version::{DefineVariables, VersionRule};
use crate::{Error, Result};

/// A master (multivariant) playlist: parameters plus one or more media
/// playlists, identified by the URI lines.
#[derive(Debug)]
pub struct MasterPlaylist {
    pub variants: Vec<Variant>,
    /// Optional query appended to every variant URI.
    pub args: Option<String>,
    /// EXT-X-DEFINE declarations in insertion order.
    pub defines: Vec<Define>,
    /// Custom tags in declaration order.
    pub custom: CustomMap,
    independent_segments: bool,
    ver: u8,
    cache: Option<String>,
    custom_decoders: Vec<Box<dyn CustomDecoder>>,
}

impl MasterPlaylist {
    pub fn new() -> Self {
        Self {
            variants: Vec::new(),
            args: None,
            defines: Vec::new(),
            custom: CustomMap::new(),
            independent_segments: false,
            ver: MIN_VER,
            cache: None,
            custom_decoders: Vec::new(),
        }
    }

    /// Register custom decoders used by [`MasterPlaylist::decode_from`].
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

    pub fn independent_segments(&self) -> bool {
        self.independent_segments
    }

    /// Set the global EXT-X-INDEPENDENT-SEGMENTS flag.
    pub fn set_independent_segments(&mut self, independent: bool) {
        self.independent_segments = independent;
        self.reset_cache();
    }

    /// Append a variant stream. Renditions and I-frame variants require
    /// protocol version 4.
    pub fn append_variant(&mut self, uri: &str, params: VariantParams) {
        if params.iframe || !params.alternatives.is_empty() {
            self.raise_version(4);
        }
        self.variants.push(Variant {
            uri: uri.to_string(),
            params,
        });
        self.reset_cache();
    }

    /// Append an EXT-X-DEFINE declaration, raising the version to 8.
    /// IMPORT declarations only make sense in media playlists.
    pub fn append_define(&mut self, define: Define) -> Result<()> {
        if define.kind == DefineKind::Import {
            return Err(Error::InvalidArgument(
                "IMPORT defines are not allowed in a master playlist".to_string(),
            ));
        }
        self.raise_version(DefineVariables.required());
        self.defines.push(define);
        self.reset_cache();
        Ok(())
    }

    /// Set a custom tag, replacing any previous tag with the same name.
    pub fn set_custom_tag(&mut self, tag: Box<dyn CustomTag>) {
        self.custom.set(tag);
        self.reset_cache();
    }

    pub(crate) fn reset_cache(&mut self) {
        self.cache = None;
    }

    /// Render to canonical text, caching the result until the next
    /// mutation.
    pub fn encode(&mut self) -> &str {
        if self.cache.is_none() {
            self.cache = Some(self.render());
        }
        self.cache.as_deref().unwrap_or_default()
    }

    fn render(&self) -> String {
        let mut out = String::with_capacity(512);
        out.push_str("#EXTM3U\n#EXT-X-VERSION:");
        out.push_str(&self.ver.to_string());
        out.push('\n');
        if self.independent_segments {
            out.push_str("#EXT-X-INDEPENDENT-SEGMENTS\n");
        }
        for define in &self.defines {
            define.write_line(&mut out);
        }
        for tag in self.custom.iter() {
            if let Some(line) = tag.encode() {
                out.push_str(&line);
                out.push('\n');
            }
        }
        for variant in &self.variants {
            variant.write(self.args.as_deref(), &mut out);
        }
        out
    }
}

impl Default for MasterPlaylist {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MasterPlaylist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::playlist::variant::Alternative;

    #[derive(Debug)]
    struct MockTag(&'static str);

    impl CustomTag for MockTag {
        fn tag_name(&self) -> &str {
            self.0
        }

        fn encode(&self) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    #[test]
    fn test_append_variants() {
        let mut m = MasterPlaylist::new();
        m.append_variant(
            "chunklist1.m3u8",
            VariantParams {
                bandwidth: 1_500_000,
                resolution: "576x480".to_string(),
                ..VariantParams::default()
            },
        );
        m.append_variant(
            "chunklist2.m3u8",
            VariantParams {
                bandwidth: 1_500_000,
                resolution: "576x480".to_string(),
                ..VariantParams::default()
            },
        );
        assert_eq!(m.variants.len(), 2);
    }

    #[test]
    fn test_alternatives_raise_version_and_render() {
        let mut m = MasterPlaylist::new();
        let audio = Alternative {
            group_id: "audio".to_string(),
            uri: "800/rendition.m3u8".to_string(),
            media_type: "AUDIO".to_string(),
            name: "main".to_string(),
            default: true,
            autoselect: true,
            language: "english".to_string(),
            ..Alternative::default()
        };
        m.append_variant(
            "chunklist1.m3u8",
            VariantParams {
                alternatives: vec![audio],
                ..VariantParams::default()
            },
        );
        assert_eq!(m.version(), 4);
        let expected = "#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"audio\",NAME=\"main\",\
                        LANGUAGE=\"english\",DEFAULT=YES,AUTOSELECT=YES,URI=\"800/rendition.m3u8\"";
        assert!(m.encode().contains(expected));
    }

    #[test]
    fn test_closed_captions_none_unquoted() {
        let mut m = MasterPlaylist::new();
        m.append_variant(
            "eng_rendition_rendition.m3u8",
            VariantParams {
                bandwidth: 8000,
                codecs: "avc1".to_string(),
                resolution: "1280x720".to_string(),
                audio: "audio0".to_string(),
                captions: "NONE".to_string(),
                ..VariantParams::default()
            },
        );
        assert!(m.encode().contains("CLOSED-CAPTIONS=NONE"));

        let mut m2 = MasterPlaylist::new();
        m2.append_variant(
            "eng_rendition_rendition.m3u8",
            VariantParams {
                bandwidth: 8000,
                captions: "CC1".to_string(),
                ..VariantParams::default()
            },
        );
        assert!(m2.encode().contains("CLOSED-CAPTIONS=\"CC1\""));
    }

    #[test]
    fn test_args_merged_into_existing_query() {
        let mut m = MasterPlaylist::new();
        m.append_variant(
            "chunklist1.m3u8?k1=v1&k2=v2",
            VariantParams {
                bandwidth: 1_500_000,
                resolution: "576x480".to_string(),
                ..VariantParams::default()
            },
        );
        m.args = Some("k3=v3".to_string());
        assert!(m.encode().contains("chunklist1.m3u8?k1=v1&k2=v2&k3=v3"));
    }

    #[test]
    fn test_stream_inf_name_rendered() {
        let mut m = MasterPlaylist::new();
        m.append_variant(
            "chunklist1.m3u8",
            VariantParams {
                bandwidth: 3000,
                resolution: "1152x960".to_string(),
                name: "HD 960p".to_string(),
                ..VariantParams::default()
            },
        );
        assert_eq!(m.variants[0].params.name, "HD 960p");
        assert!(m.encode().contains("NAME=\"HD 960p\""));
    }

    #[test]
    fn test_custom_tag_rendered() {
        let mut m = MasterPlaylist::new();
        m.set_custom_tag(Box::new(MockTag("#CustomMTag")));
        assert!(m.encode().contains("#CustomMTag"));
    }

    #[test]
    fn test_version_accessors() {
        let mut m = MasterPlaylist::new();
        m.set_version(5);
        assert_eq!(m.version(), 5);
        m.set_version(7);
        assert_eq!(m.version(), 7);
    }

    #[test]
    fn test_independent_segments() {
        let mut m = MasterPlaylist::new();
        assert!(!m.independent_segments());
        m.set_independent_segments(true);
        assert!(m.independent_segments());
        assert!(m.encode().contains("#EXT-X-INDEPENDENT-SEGMENTS"));
    }

    #[test]
    fn test_append_define_rejects_import() {
        let mut m = MasterPlaylist::new();
        assert!(matches!(
            m.append_define(Define::import("Var")),
            Err(Error::InvalidArgument(_))
        ));
        m.append_define(Define::value("Var", "1")).unwrap();
        assert_eq!(m.version(), 8);
        assert!(m.encode().contains("#EXT-X-DEFINE:NAME=\"Var\",VALUE=\"1\"\n"));
    }

    #[test]
    fn test_encode_simple_master() {
        let mut m = MasterPlaylist::new();
        for uri in ["chunklist1.m3u8", "chunklist2.m3u8"] {
            m.append_variant(
                uri,
                VariantParams {
                    bandwidth: 1_500_000,
                    average_bandwidth: 1_500_000,
                    resolution: "576x480".to_string(),
                    frame_rate: 25.0,
                    ..VariantParams::default()
                },
            );
        }
        assert_eq!(
            m.encode(),
            "#EXTM3U\n\
             #EXT-X-VERSION:3\n\
             #EXT-X-STREAM-INF:BANDWIDTH=1500000,AVERAGE-BANDWIDTH=1500000,\
             RESOLUTION=576x480,FRAME-RATE=25.000\n\
             chunklist1.m3u8\n\
             #EXT-X-STREAM-INF:BANDWIDTH=1500000,AVERAGE-BANDWIDTH=1500000,\
             RESOLUTION=576x480,FRAME-RATE=25.000\n\
             chunklist2.m3u8\n"
        );
    }

    #[test]
    fn test_encode_hls_v7_master() {
        let mut m = MasterPlaylist::new();
        m.set_version(7);
        m.set_independent_segments(true);
        m.append_variant(
            "hdr10_1080/prog_index.m3u8",
            VariantParams {
                average_bandwidth: 7_964_551,
                bandwidth: 12_886_714,
                video_range: "PQ".to_string(),
                codecs: "hvc1.2.4.L123.B0".to_string(),
                resolution: "1920x1080".to_string(),
                frame_rate: 23.976,
                captions: "NONE".to_string(),
                hdcp_level: "TYPE-0".to_string(),
                ..VariantParams::default()
            },
        );
        m.append_variant(
            "hdr10_1080/iframe_index.m3u8",
            VariantParams {
                iframe: true,
                average_bandwidth: 364_552,
                bandwidth: 905_053,
                video_range: "PQ".to_string(),
                codecs: "hvc1.2.4.L123.B0".to_string(),
                resolution: "1920x1080".to_string(),
                hdcp_level: "TYPE-0".to_string(),
                ..VariantParams::default()
            },
        );
        assert_eq!(
            m.encode(),
            "#EXTM3U\n\
             #EXT-X-VERSION:7\n\
             #EXT-X-INDEPENDENT-SEGMENTS\n\
             #EXT-X-STREAM-INF:BANDWIDTH=12886714,AVERAGE-BANDWIDTH=7964551,\
             CODECS=\"hvc1.2.4.L123.B0\",RESOLUTION=1920x1080,FRAME-RATE=23.976,\
             HDCP-LEVEL=TYPE-0,VIDEO-RANGE=PQ,CLOSED-CAPTIONS=NONE\n\
             hdr10_1080/prog_index.m3u8\n\
             #EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=905053,AVERAGE-BANDWIDTH=364552,\
             CODECS=\"hvc1.2.4.L123.B0\",RESOLUTION=1920x1080,HDCP-LEVEL=TYPE-0,\
             VIDEO-RANGE=PQ,URI=\"hdr10_1080/iframe_index.m3u8\"\n"
        );
    }
}
