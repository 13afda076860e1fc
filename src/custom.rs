//! Hooks for tags the crate does not natively understand.
//!
//! A caller registers [`CustomDecoder`]s before decoding; matching lines are
//! handed to the hook instead of being rejected. Decoded (or caller-built)
//! [`CustomTag`]s are owned by the playlist and rendered back during
//! encoding.

use std::fmt;

use crate::Result;

/// An encodable representation of a custom or unsupported tag.
pub trait CustomTag: fmt::Debug + Send + Sync {
    /// Full identifier including the leading `#` and, when the tag carries a
    /// value or attribute list, the trailing `:`.
    fn tag_name(&self) -> &str;

    /// The complete tag line, without trailing newline. `None` writes
    /// nothing to the playlist.
    fn encode(&self) -> Option<String>;
}

/// A decoder for a custom or unsupported tag, keyed by its identifier.
pub trait CustomDecoder: fmt::Debug + Send + Sync {
    /// Full identifier including the leading `#` and, when the tag carries a
    /// value or attribute list, the trailing `:`.
    fn tag_name(&self) -> &str;

    /// Parse one playlist line into its [`CustomTag`] representation.
    fn decode(&self, line: &str) -> Result<Box<dyn CustomTag>>;

    /// `true` if the tag applies per segment, `false` for a media-playlist
    /// header tag. Ignored for master playlists.
    fn segment_tag(&self) -> bool;
}

/// Custom tags in declaration order. Setting a tag with an already-present
/// identifier replaces it in place.
#[derive(Debug, Default)]
pub struct CustomMap {
    tags: Vec<Box<dyn CustomTag>>,
}

impl CustomMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, tag: Box<dyn CustomTag>) {
        match self.tags.iter_mut().find(|t| t.tag_name() == tag.tag_name()) {
            Some(slot) => *slot = tag,
            None => self.tags.push(tag),
        }
    }

    pub fn get(&self, tag_name: &str) -> Option<&dyn CustomTag> {
        self.tags
            .iter()
            .find(|t| t.tag_name() == tag_name)
            .map(|t| t.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn CustomTag> {
        self.tags.iter().map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }
}

/// A tag kept verbatim. Lenient decoding stores unrecognized `#EXT...` lines
/// this way so they survive re-encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    name: String,
    line: String,
}

impl RawTag {
    pub fn new(line: &str) -> Self {
        let name = match line.find(':') {
            Some(idx) => line[..=idx].to_string(),
            None => line.to_string(),
        };
        Self {
            name,
            line: line.to_string(),
        }
    }

    pub fn line(&self) -> &str {
        &self.line
    }
}

impl CustomTag for RawTag {
    fn tag_name(&self) -> &str {
        &self.name
    }

    fn encode(&self) -> Option<String> {
        Some(self.line.clone())
    }
}
