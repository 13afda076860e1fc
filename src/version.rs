//! Protocol-version compatibility rules.
//!
//! Each observed feature maps to a minimum protocol version
//! ([version compatibility]). Rules are checked during strict decoding and
//! used by the façade mutators to raise a playlist's declared version.
//!
//! [version compatibility]: https://datatracker.ietf.org/doc/html/draft-pantos-hls-rfc8216bis-16#section-8

use crate::attribute::is_integer_str;

/// An observed feature that requires a higher protocol version than the
/// playlist declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMismatch {
    pub actual: u8,
    pub required: u8,
    pub description: String,
}

impl From<VersionMismatch> for crate::Error {
    fn from(m: VersionMismatch) -> Self {
        crate::Error::VersionMismatch {
            actual: m.actual,
            required: m.required,
            description: m.description,
        }
    }
}

/// A single version-compatibility rule.
pub trait VersionRule {
    /// Minimum protocol version the observed feature requires.
    fn required(&self) -> u8;

    /// Whether the feature is present at all. Absent features validate
    /// against any version.
    fn triggered(&self) -> bool {
        true
    }

    fn description(&self) -> String;

    fn validate(&self, actual: u8) -> Option<VersionMismatch> {
        if !self.triggered() || actual >= self.required() {
            return None;
        }
        Some(VersionMismatch {
            actual,
            required: self.required(),
            description: self.description(),
        })
    }
}

/// A non-empty IV attribute on EXT-X-KEY requires version 2.
pub struct IvInKey<'a> {
    pub iv: &'a str,
}

impl VersionRule for IvInKey<'_> {
    fn required(&self) -> u8 {
        2
    }

    fn triggered(&self) -> bool {
        !self.iv.is_empty()
    }

    fn description(&self) -> String {
        "IV attribute in EXT-X-KEY".to_string()
    }
}

/// A fractional EXTINF duration requires version 3.
pub struct FloatPointDuration<'a> {
    pub duration: &'a str,
}

impl VersionRule for FloatPointDuration<'_> {
    fn required(&self) -> u8 {
        3
    }

    fn triggered(&self) -> bool {
        !is_integer_str(self.duration)
    }

    fn description(&self) -> String {
        "floating point EXTINF duration".to_string()
    }
}

/// EXT-X-BYTERANGE or EXT-X-I-FRAMES-ONLY requires version 4.
pub struct ByteRangeOrIframesOnly;

impl VersionRule for ByteRangeOrIframesOnly {
    fn required(&self) -> u8 {
        4
    }

    fn description(&self) -> String {
        "EXT-X-BYTERANGE or EXT-X-I-FRAMES-ONLY tag".to_string()
    }
}

/// KEYFORMAT or KEYFORMATVERSIONS on EXT-X-KEY requires version 5.
pub struct KeyFormat<'a> {
    pub keyformat: &'a str,
    pub keyformatversions: &'a str,
}

impl VersionRule for KeyFormat<'_> {
    fn required(&self) -> u8 {
        5
    }

    fn triggered(&self) -> bool {
        !self.keyformat.is_empty() || !self.keyformatversions.is_empty()
    }

    fn description(&self) -> String {
        "KEYFORMAT or KEYFORMATVERSIONS attribute in EXT-X-KEY".to_string()
    }
}

/// EXT-X-MAP requires version 5 in an I-frames-only playlist, 6 otherwise.
pub struct MapInPlaylist {
    pub iframes_only: bool,
}

impl VersionRule for MapInPlaylist {
    fn required(&self) -> u8 {
        if self.iframes_only { 5 } else { 6 }
    }

    fn description(&self) -> String {
        "EXT-X-MAP tag".to_string()
    }
}

/// EXT-X-DEFINE (variable substitution) requires version 8.
pub struct DefineVariables;

impl VersionRule for DefineVariables {
    fn required(&self) -> u8 {
        8
    }

    fn description(&self) -> String {
        "EXT-X-DEFINE tag".to_string()
    }
}

/// EXT-X-SKIP (playlist delta updates) requires version 9.
pub struct SkipTag;

impl VersionRule for SkipTag {
    fn required(&self) -> u8 {
        9
    }

    fn description(&self) -> String {
        "EXT-X-SKIP tag".to_string()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1, "", true)]
    #[case(1, "someIV", false)]
    #[case(2, "someIV", true)]
    fn test_iv_in_key(#[case] actual: u8, #[case] iv: &str, #[case] valid: bool) {
        let rule = IvInKey { iv };
        assert_eq!(rule.validate(actual).is_none(), valid);
        if let Some(mismatch) = rule.validate(actual) {
            assert_eq!(mismatch.actual, actual);
            assert_eq!(mismatch.required, 2);
        }
    }

    #[rstest]
    #[case(1, "10", true)]
    #[case(2, "10.5", false)]
    #[case(3, "10.5", true)]
    fn test_float_point_duration(#[case] actual: u8, #[case] duration: &str, #[case] valid: bool) {
        let rule = FloatPointDuration { duration };
        assert_eq!(rule.validate(actual).is_none(), valid);
        if let Some(mismatch) = rule.validate(actual) {
            assert_eq!(mismatch.required, 3);
        }
    }

    #[rstest]
    #[case(3, false)]
    #[case(4, true)]
    #[case(5, true)]
    fn test_byte_range_or_iframes_only(#[case] actual: u8, #[case] valid: bool) {
        assert_eq!(ByteRangeOrIframesOnly.validate(actual).is_none(), valid);
    }

    #[rstest]
    #[case("", "", 3, true)]
    #[case("Format", "", 3, false)]
    #[case("", "Version", 3, false)]
    #[case("Format", "Version", 5, true)]
    fn test_key_format(
        #[case] keyformat: &str,
        #[case] keyformatversions: &str,
        #[case] actual: u8,
        #[case] valid: bool,
    ) {
        let rule = KeyFormat {
            keyformat,
            keyformatversions,
        };
        assert_eq!(rule.validate(actual).is_none(), valid);
    }

    #[rstest]
    #[case(false, 5, false)]
    #[case(false, 6, true)]
    #[case(true, 5, true)]
    fn test_map_in_playlist(#[case] iframes_only: bool, #[case] actual: u8, #[case] valid: bool) {
        let rule = MapInPlaylist { iframes_only };
        assert_eq!(rule.validate(actual).is_none(), valid);
    }

    #[test]
    fn test_define_and_skip() {
        assert_eq!(DefineVariables.validate(7).unwrap().required, 8);
        assert!(DefineVariables.validate(8).is_none());
        assert_eq!(SkipTag.validate(8).unwrap().required, 9);
        assert!(SkipTag.validate(9).is_none());
    }
}
