use crate::attribute::Attribute;

/// Stream encryption parameters from an `EXT-X-KEY` tag.
///
/// Fields hold the attribute text verbatim; an empty string means the
/// attribute is absent. The IV keeps its `0x` prefix and key material is
/// never resolved here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Key {
    pub method: String,
    pub uri: String,
    pub iv: String,
    pub keyformat: String,
    pub keyformatversions: String,
}

impl Key {
    pub fn new(
        method: &str,
        uri: &str,
        iv: &str,
        keyformat: &str,
        keyformatversions: &str,
    ) -> Self {
        Self {
            method: method.to_string(),
            uri: uri.to_string(),
            iv: iv.to_string(),
            keyformat: keyformat.to_string(),
            keyformatversions: keyformatversions.to_string(),
        }
    }

    /// Build from a decoded attribute list.
    pub(crate) fn from_attributes(attrs: &[Attribute]) -> Self {
        let mut key = Self::default();
        for attr in attrs {
            match attr.key.as_str() {
                "METHOD" => key.method = attr.unquoted().to_string(),
                "URI" => key.uri = attr.unquoted().to_string(),
                "IV" => key.iv = attr.unquoted().to_string(),
                "KEYFORMAT" => key.keyformat = attr.unquoted().to_string(),
                "KEYFORMATVERSIONS" => key.keyformatversions = attr.unquoted().to_string(),
                _ => {}
            }
        }
        key
    }

    /// Append `#EXT-X-KEY:...` (or the given tag name) to the output.
    pub(crate) fn write_line(&self, tag: &str, out: &mut String) {
        out.push_str(tag);
        out.push_str("METHOD=");
        out.push_str(&self.method);
        if !self.uri.is_empty() {
            out.push_str(",URI=\"");
            out.push_str(&self.uri);
            out.push('"');
        }
        if !self.iv.is_empty() {
            out.push_str(",IV=");
            out.push_str(&self.iv);
        }
        if !self.keyformat.is_empty() {
            out.push_str(",KEYFORMAT=\"");
            out.push_str(&self.keyformat);
            out.push('"');
        }
        if !self.keyformatversions.is_empty() {
            out.push_str(",KEYFORMATVERSIONS=\"");
            out.push_str(&self.keyformatversions);
            out.push('"');
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::decode_attributes;

    #[test]
    fn test_from_attributes() {
        let attrs = decode_attributes(
            r#"METHOD=SAMPLE-AES,URI="https://example.com/key",IV=0x00000000000000000000000000000001"#,
        );
        let key = Key::from_attributes(&attrs);
        assert_eq!(key.method, "SAMPLE-AES");
        assert_eq!(key.uri, "https://example.com/key");
        assert_eq!(key.iv, "0x00000000000000000000000000000001");
    }

    #[test]
    fn test_write_method_none() {
        let key = Key::new("NONE", "", "", "", "");
        let mut out = String::new();
        key.write_line("#EXT-X-KEY:", &mut out);
        assert_eq!(out, "#EXT-X-KEY:METHOD=NONE\n");
    }

    #[test]
    fn test_write_full() {
        let key = Key::new("AES-128", "key-uri", "0x01", "identity", "1");
        let mut out = String::new();
        key.write_line("#EXT-X-KEY:", &mut out);
        assert_eq!(
            out,
            "#EXT-X-KEY:METHOD=AES-128,URI=\"key-uri\",IV=0x01,KEYFORMAT=\"identity\",KEYFORMATVERSIONS=\"1\"\n"
        );
    }
}
