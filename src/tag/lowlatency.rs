//! Low-latency HLS extensions: partial segments, preload hints, and the
//! server-control block.

use super::fixed3;
use crate::attribute::Attribute;

/// An `EXT-X-PART` entry: a fragment of a segment published before the full
/// segment is available.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialSegment {
    /// Sequence id of the full segment this part belongs to. Parts newer
    /// than the last full segment trail the playlist window.
    pub seq_id: u64,
    pub uri: String,
    pub duration: f64,
    pub independent: bool,
}

impl PartialSegment {
    /// Build from a decoded attribute list. Returns `None` without a URI.
    pub(crate) fn from_attributes(attrs: &[Attribute]) -> Option<Self> {
        let mut uri = None;
        let mut duration = 0.0;
        let mut independent = false;
        for attr in attrs {
            match attr.key.as_str() {
                "URI" => uri = Some(attr.unquoted().to_string()),
                "DURATION" => duration = attr.unquoted().parse().ok()?,
                "INDEPENDENT" => independent = attr.unquoted() == "YES",
                _ => {}
            }
        }
        Some(Self {
            seq_id: 0,
            uri: uri?,
            duration,
            independent,
        })
    }

    /// Append `#EXT-X-PART:...` to the output.
    pub(crate) fn write_line(&self, out: &mut String) {
        out.push_str("#EXT-X-PART:DURATION=");
        out.push_str(&fixed3(self.duration));
        if self.independent {
            out.push_str(",INDEPENDENT=YES");
        }
        out.push_str(",URI=\"");
        out.push_str(&self.uri);
        out.push_str("\"\n");
    }
}

/// An `EXT-X-PRELOAD-HINT` tag announcing the next resource the server will
/// publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadHint {
    /// Hint type, typically `PART` or `MAP`.
    pub hint_type: String,
    pub uri: String,
}

impl PreloadHint {
    pub fn new(hint_type: &str, uri: &str) -> Self {
        Self {
            hint_type: hint_type.to_string(),
            uri: uri.to_string(),
        }
    }

    pub(crate) fn from_attributes(attrs: &[Attribute]) -> Option<Self> {
        let mut hint_type = None;
        let mut uri = None;
        for attr in attrs {
            match attr.key.as_str() {
                "TYPE" => hint_type = Some(attr.unquoted().to_string()),
                "URI" => uri = Some(attr.unquoted().to_string()),
                _ => {}
            }
        }
        Some(Self {
            hint_type: hint_type?,
            uri: uri?,
        })
    }

    pub(crate) fn write_line(&self, out: &mut String) {
        out.push_str("#EXT-X-PRELOAD-HINT:TYPE=");
        out.push_str(&self.hint_type);
        out.push_str(",URI=\"");
        out.push_str(&self.uri);
        out.push_str("\"\n");
    }
}

/// The `EXT-X-SERVER-CONTROL` block. Zero and `false` fields are omitted
/// from the rendered tag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ServerControl {
    pub can_skip_until: f64,
    pub can_skip_dateranges: bool,
    pub hold_back: f64,
    pub part_hold_back: f64,
    pub can_block_reload: bool,
}

impl ServerControl {
    pub(crate) fn from_attributes(attrs: &[Attribute]) -> Self {
        let mut sc = Self::default();
        for attr in attrs {
            match attr.key.as_str() {
                "CAN-SKIP-UNTIL" => sc.can_skip_until = attr.unquoted().parse().unwrap_or(0.0),
                "CAN-SKIP-DATERANGES" => sc.can_skip_dateranges = attr.unquoted() == "YES",
                "HOLD-BACK" => sc.hold_back = attr.unquoted().parse().unwrap_or(0.0),
                "PART-HOLD-BACK" => sc.part_hold_back = attr.unquoted().parse().unwrap_or(0.0),
                "CAN-BLOCK-RELOAD" => sc.can_block_reload = attr.unquoted() == "YES",
                _ => {}
            }
        }
        sc
    }

    pub(crate) fn write_line(&self, out: &mut String) {
        let mut parts = Vec::new();
        if self.can_skip_until > 0.0 {
            parts.push(format!("CAN-SKIP-UNTIL={}", fixed3(self.can_skip_until)));
        }
        if self.can_skip_dateranges {
            parts.push("CAN-SKIP-DATERANGES=YES".to_string());
        }
        if self.hold_back > 0.0 {
            parts.push(format!("HOLD-BACK={}", fixed3(self.hold_back)));
        }
        if self.part_hold_back > 0.0 {
            parts.push(format!("PART-HOLD-BACK={}", fixed3(self.part_hold_back)));
        }
        if self.can_block_reload {
            parts.push("CAN-BLOCK-RELOAD=YES".to_string());
        }
        out.push_str("#EXT-X-SERVER-CONTROL:");
        out.push_str(&parts.join(","));
        out.push('\n');
    }
}

/// `#EXT-X-PART-INF:PART-TARGET=...` with three-decimal formatting.
pub(crate) fn write_part_inf(part_target: f64, out: &mut String) {
    out.push_str("#EXT-X-PART-INF:PART-TARGET=");
    out.push_str(&fixed3(part_target));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::decode_attributes;

    #[test]
    fn test_part_write() {
        let part = PartialSegment {
            seq_id: 2,
            uri: "test02.1.m4s".to_string(),
            duration: 1.0,
            independent: true,
        };
        let mut out = String::new();
        part.write_line(&mut out);
        assert_eq!(
            out,
            "#EXT-X-PART:DURATION=1.000,INDEPENDENT=YES,URI=\"test02.1.m4s\"\n"
        );
    }

    #[test]
    fn test_part_parse() {
        let attrs = decode_attributes(r#"DURATION=1.000,INDEPENDENT=YES,URI="test02.1.m4s""#);
        let part = PartialSegment::from_attributes(&attrs).unwrap();
        assert_eq!(part.uri, "test02.1.m4s");
        assert_eq!(part.duration, 1.0);
        assert!(part.independent);
    }

    #[test]
    fn test_preload_hint_write() {
        let hint = PreloadHint::new("PART", "test05.2.m4s");
        let mut out = String::new();
        hint.write_line(&mut out);
        assert_eq!(out, "#EXT-X-PRELOAD-HINT:TYPE=PART,URI=\"test05.2.m4s\"\n");
    }

    #[test]
    fn test_server_control_part_hold_back_only() {
        let sc = ServerControl {
            part_hold_back: 3.006,
            can_block_reload: true,
            ..ServerControl::default()
        };
        let mut out = String::new();
        sc.write_line(&mut out);
        assert_eq!(
            out,
            "#EXT-X-SERVER-CONTROL:PART-HOLD-BACK=3.006,CAN-BLOCK-RELOAD=YES\n"
        );
    }

    #[test]
    fn test_server_control_skip_and_hold_back() {
        let sc = ServerControl {
            can_skip_until: 24.0,
            hold_back: 12.0,
            can_block_reload: true,
            ..ServerControl::default()
        };
        let mut out = String::new();
        sc.write_line(&mut out);
        assert_eq!(
            out,
            "#EXT-X-SERVER-CONTROL:CAN-SKIP-UNTIL=24.000,HOLD-BACK=12.000,CAN-BLOCK-RELOAD=YES\n"
        );
    }

    #[test]
    fn test_server_control_round_trip() {
        let attrs =
            decode_attributes("CAN-SKIP-UNTIL=24.000,HOLD-BACK=12.000,CAN-BLOCK-RELOAD=YES");
        let sc = ServerControl::from_attributes(&attrs);
        assert_eq!(sc.can_skip_until, 24.0);
        assert_eq!(sc.hold_back, 12.0);
        assert!(sc.can_block_reload);
        assert!(!sc.can_skip_dateranges);
    }

    #[test]
    fn test_part_inf() {
        let mut out = String::new();
        write_part_inf(1.002, &mut out);
        assert_eq!(out, "#EXT-X-PART-INF:PART-TARGET=1.002\n");
    }
}
