//! Encoder and decoder for HLS (M3U8) playlists as described by
//! draft-pantos-hls-rfc8216bis.
//!
//! Both playlist kinds are modeled: master (multivariant) playlists listing
//! bitrate variants, and media playlists holding an ordered window of
//! segments in a fixed-capacity ring. The decoder is a line-by-line state
//! machine with strict and lenient modes; the encoder produces canonical
//! text, applies protocol-version-aware formatting, and caches its output
//! until the next mutation. Low-latency extensions, SCTE-35 ad signaling
//! (carried verbatim), byte ranges, encryption keys, program-date-time
//! anchors, and caller-supplied custom tags are all round-tripped.
//!
//! ```
//! use m3u8::MediaPlaylist;
//!
//! let mut p = MediaPlaylist::new(3, 5).unwrap();
//! p.append("test01.ts", 5.0, "").unwrap();
//! assert!(p.encode().contains("#EXTINF:5.000,\ntest01.ts"));
//! ```

pub mod attribute;
pub mod custom;
pub mod decode;
pub mod error;
pub mod playlist;
pub mod tag;
pub mod version;

pub use attribute::{decode_attributes, find_ends_in_number, is_part_of, Attribute};
pub use custom::{CustomDecoder, CustomMap, CustomTag, RawTag};
pub use decode::{decode, decode_from};
pub use error::{Error, Result};
pub use playlist::{
    Alternative, ListType, MasterPlaylist, MediaPlaylist, MediaSegment, MediaType, Playlist,
    Variant, VariantParams,
};
pub use tag::{
    DateRange, Define, DefineKind, Key, Map, PartialSegment, PreloadHint, Scte, Scte35CueType,
    Scte35Syntax, ServerControl,
};
pub use version::{VersionMismatch, VersionRule};
