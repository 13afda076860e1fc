use crate::attribute::Attribute;

/// Flavor of an `EXT-X-DEFINE` variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineKind {
    /// `NAME="..."` with a literal `VALUE="..."`.
    Value,
    /// `IMPORT="..."`: takes the value from the multivariant playlist.
    /// Media playlists only.
    Import,
    /// `QUERYPARAM="..."`: takes the value from the playlist URI query.
    Queryparam,
}

/// An `EXT-X-DEFINE` variable declaration, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub kind: DefineKind,
    /// Only meaningful for [`DefineKind::Value`].
    pub value: String,
}

impl Define {
    pub fn value(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: DefineKind::Value,
            value: value.to_string(),
        }
    }

    pub fn import(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: DefineKind::Import,
            value: String::new(),
        }
    }

    pub fn queryparam(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: DefineKind::Queryparam,
            value: String::new(),
        }
    }

    /// Build from a decoded attribute list. Returns `None` when no
    /// recognized declaration form is present.
    pub(crate) fn from_attributes(attrs: &[Attribute]) -> Option<Self> {
        let mut name = None;
        let mut value = String::new();
        let mut kind = None;
        for attr in attrs {
            match attr.key.as_str() {
                "NAME" => {
                    name = Some(attr.unquoted().to_string());
                    kind.get_or_insert(DefineKind::Value);
                }
                "VALUE" => value = attr.unquoted().to_string(),
                "IMPORT" => {
                    name = Some(attr.unquoted().to_string());
                    kind = Some(DefineKind::Import);
                }
                "QUERYPARAM" => {
                    name = Some(attr.unquoted().to_string());
                    kind = Some(DefineKind::Queryparam);
                }
                _ => {}
            }
        }
        Some(Self {
            name: name?,
            kind: kind?,
            value,
        })
    }

    /// Append `#EXT-X-DEFINE:...` to the output.
    pub(crate) fn write_line(&self, out: &mut String) {
        match self.kind {
            DefineKind::Value => {
                out.push_str("#EXT-X-DEFINE:NAME=\"");
                out.push_str(&self.name);
                out.push_str("\",VALUE=\"");
                out.push_str(&self.value);
                out.push_str("\"\n");
            }
            DefineKind::Import => {
                out.push_str("#EXT-X-DEFINE:IMPORT=\"");
                out.push_str(&self.name);
                out.push_str("\"\n");
            }
            DefineKind::Queryparam => {
                out.push_str("#EXT-X-DEFINE:QUERYPARAM=\"");
                out.push_str(&self.name);
                out.push_str("\"\n");
            }
        }
    }
}
