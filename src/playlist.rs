pub mod master;
pub mod media;
pub mod segment;
pub mod variant;

pub use master::MasterPlaylist;
pub use media::MediaPlaylist;
pub use segment::MediaSegment;
pub use variant::{Alternative, Variant, VariantParams};

/// Minimum protocol version produced by this crate. Version 3 is the first
/// with floating-point EXTINF durations.
pub(crate) const MIN_VER: u8 = 3;

/// Which playlist variant a decoded stream turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Master,
    Media,
}

/// `EXT-X-PLAYLIST-TYPE` value of a media playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Event,
    Vod,
}

impl MediaType {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "EVENT",
            Self::Vod => "VOD",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "EVENT" => Some(Self::Event),
            "VOD" => Some(Self::Vod),
            _ => None,
        }
    }
}

/// A decoded playlist: either a master (multivariant) playlist or a media
/// playlist. Inferred from the first type-distinguishing tag.
#[derive(Debug)]
pub enum Playlist {
    Master(MasterPlaylist),
    Media(MediaPlaylist),
}

impl Playlist {
    pub fn list_type(&self) -> ListType {
        match self {
            Self::Master(_) => ListType::Master,
            Self::Media(_) => ListType::Media,
        }
    }

    /// Render to canonical text, caching the result.
    pub fn encode(&mut self) -> &str {
        match self {
            Self::Master(p) => p.encode(),
            Self::Media(p) => p.encode(),
        }
    }
}

impl std::fmt::Display for Playlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Master(p) => std::fmt::Display::fmt(p, f),
            Self::Media(p) => std::fmt::Display::fmt(p, f),
        }
    }
}

/// Join a URI with an optional query suffix, extending any query the URI
/// already carries.
pub(crate) fn write_uri(uri: &str, args: Option<&str>, out: &mut String) {
    out.push_str(uri);
    if let Some(args) = args
        && !args.is_empty()
    {
        out.push(if uri.contains('?') { '&' } else { '?' });
        out.push_str(args);
    }
}
