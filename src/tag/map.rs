use crate::attribute::Attribute;

/// Media Initialization Section from an `EXT-X-MAP` tag.
///
/// Applies to every segment after it until the next `EXT-X-MAP` tag or the
/// end of the playlist. `limit`/`offset` mirror the optional
/// `BYTERANGE=<n>@<o>` attribute; a `limit` of zero means no byte range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Map {
    pub uri: String,
    pub limit: i64,
    pub offset: i64,
}

impl Map {
    pub fn new(uri: &str, limit: i64, offset: i64) -> Self {
        Self {
            uri: uri.to_string(),
            limit,
            offset,
        }
    }

    /// Build from a decoded attribute list. Returns `None` without a URI.
    pub(crate) fn from_attributes(attrs: &[Attribute]) -> Option<Self> {
        let mut map = Self::default();
        let mut has_uri = false;
        for attr in attrs {
            match attr.key.as_str() {
                "URI" => {
                    map.uri = attr.unquoted().to_string();
                    has_uri = true;
                }
                "BYTERANGE" => {
                    let value = attr.unquoted();
                    let (limit, offset) = match value.split_once('@') {
                        Some((l, o)) => (l.parse().ok()?, o.parse().ok()?),
                        None => (value.parse().ok()?, 0),
                    };
                    map.limit = limit;
                    map.offset = offset;
                }
                _ => {}
            }
        }
        has_uri.then_some(map)
    }

    /// Append `#EXT-X-MAP:...` to the output.
    pub(crate) fn write_line(&self, out: &mut String) {
        out.push_str("#EXT-X-MAP:URI=\"");
        out.push_str(&self.uri);
        out.push('"');
        if self.limit > 0 {
            out.push_str(",BYTERANGE=");
            out.push_str(&self.limit.to_string());
            out.push('@');
            out.push_str(&self.offset.to_string());
        }
        out.push('\n');
    }
}
