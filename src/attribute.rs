/// A raw key/value pair from a tag's attribute list.
///
/// The value is kept verbatim: wrapping quotes stay in place for quoted
/// strings and the `0x` prefix stays in place for hexadecimal literals, so
/// re-encoding reproduces the original bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    /// The value with wrapping quotes removed, if any.
    pub fn unquoted(&self) -> &str {
        self.value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(&self.value)
    }
}

fn is_key_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'-'
}

/// Split the attribute-list portion of a tag line into ordered key/value
/// pairs.
///
/// Keys match `[A-Za-z0-9_-]+`; bytes that cannot start a key are skipped
/// and scanning resynchronizes on the next key character. A key without `=`
/// is discarded, except at end of input where `key=` yields an empty value.
/// Values run to the next unquoted comma. Empty input yields an empty list.
pub fn decode_attributes(line: &str) -> Vec<Attribute> {
    let bytes = line.as_bytes();
    let n = bytes.len();
    let mut attrs = Vec::new();
    let mut i = 0;

    while i < n {
        let start = i;
        while i < n && is_key_char(bytes[i]) {
            i += 1;
        }
        if i == start {
            // not a key character, resynchronize
            i += 1;
            continue;
        }
        let key = &line[start..i];

        if i >= n || bytes[i] != b'=' {
            continue;
        }
        i += 1; // '='
        if i >= n {
            attrs.push(Attribute {
                key: key.to_string(),
                value: String::new(),
            });
            break;
        }

        let start = i;
        let mut in_quote = bytes[i] == b'"';
        while i < n && (bytes[i] != b',' || in_quote) {
            if i > start && bytes[i] == b'"' {
                in_quote = false;
            }
            i += 1;
        }
        attrs.push(Attribute {
            key: key.to_string(),
            value: line[start..i].to_string(),
        });
        i += 1; // ','
    }

    attrs
}

/// Find the last run of ASCII digits in `s`. Returns the run (with leading
/// zeroes) and whether `s` ends with it.
pub fn find_ends_in_number(s: &str) -> (&str, bool) {
    let bytes = s.as_bytes();
    let mut start = 0;
    let mut end = 0;
    let mut in_run = false;

    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            if !in_run {
                start = i;
                in_run = true;
            }
            end = i + 1;
        } else {
            in_run = false;
        }
    }

    (&s[start..end], in_run && end == s.len())
}

/// Whether `partial_uri` names a part of the segment at `seg_uri`.
///
/// A partial URI like `filePart249.3.m4s` belongs to `fileSequence249.m4s`:
/// same extension, the parent's trailing number reappears right before the
/// part index, and neither number has extra digits attached.
pub fn is_part_of(partial_uri: &str, seg_uri: &str) -> bool {
    let (seg_stem, seg_ext) = match seg_uri.rsplit_once('.') {
        Some(parts) => parts,
        None => return false,
    };
    let (partial_stem, partial_ext) = match partial_uri.rsplit_once('.') {
        Some(parts) => parts,
        None => return false,
    };
    if seg_ext != partial_ext {
        return false;
    }

    let (seg_num, seg_ends_in_num) = find_ends_in_number(seg_stem);
    if !seg_ends_in_num {
        return false;
    }

    // The partial stem must itself end in the part index...
    let (_, partial_ends_in_num) = find_ends_in_number(partial_stem);
    if !partial_ends_in_num {
        return false;
    }
    // ...preceded by the parent sequence number.
    let base = match partial_stem.rsplit_once('.') {
        Some((base, _part_index)) => base,
        None => return false,
    };
    let (base_num, base_ends_in_num) = find_ends_in_number(base);
    base_ends_in_num && base_num.trim_start_matches('0') == seg_num.trim_start_matches('0')
}

/// Whether the string parses as a plain (sign-less) decimal integer.
pub(crate) fn is_integer_str(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn attr(key: &str, value: &str) -> Attribute {
        Attribute {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_decode_attributes_normal() {
        let got = decode_attributes(
            r#"AVERAGE-BANDWIDTH=20985770,VIDEO-RANGE=SDR,CODECS="hvc1.2.4.L150.B0",RESOLUTION=3840x2160"#,
        );
        assert_eq!(
            got,
            vec![
                attr("AVERAGE-BANDWIDTH", "20985770"),
                attr("VIDEO-RANGE", "SDR"),
                attr("CODECS", r#""hvc1.2.4.L150.B0""#),
                attr("RESOLUTION", "3840x2160"),
            ]
        );
    }

    #[test]
    fn test_decode_attributes_with_spaces() {
        let got = decode_attributes(r#" AVERAGE-BANDWIDTH=20985770, VIDEO-RANGE=SDR, CODECS="hvc1.2.4.L150.B0""#);
        assert_eq!(
            got,
            vec![
                attr("AVERAGE-BANDWIDTH", "20985770"),
                attr("VIDEO-RANGE", "SDR"),
                attr("CODECS", r#""hvc1.2.4.L150.B0""#),
            ]
        );
    }

    #[test]
    fn test_decode_attributes_missing_value() {
        let got = decode_attributes("AVERAGE-BANDWIDTH=,VIDEO-RANGE=SDR");
        assert_eq!(
            got,
            vec![attr("AVERAGE-BANDWIDTH", ""), attr("VIDEO-RANGE", "SDR")]
        );
    }

    #[test]
    fn test_decode_attributes_comma_in_quoted_value() {
        let got = decode_attributes(r#"TEST="abc,123""#);
        assert_eq!(got, vec![attr("TEST", r#""abc,123""#)]);
    }

    #[test]
    fn test_decode_attributes_empty_input() {
        assert_eq!(decode_attributes(""), Vec::new());
    }

    #[test]
    fn test_decode_attributes_malformed_key() {
        let got = decode_attributes("CODECÅÄÖ=123,VIDEO-RANGE=SDR");
        assert_eq!(got, vec![attr("VIDEO-RANGE", "SDR")]);
    }

    #[test]
    fn test_decode_attributes_no_key() {
        let got = decode_attributes(r#"123"hello",VIDEO-RANGE=SDR"#);
        assert_eq!(got, vec![attr("VIDEO-RANGE", "SDR")]);
    }

    #[test]
    fn test_decode_attributes_no_value_on_last_entry() {
        let got = decode_attributes("CODEC=123,VIDEO-RANGE=");
        assert_eq!(got, vec![attr("CODEC", "123"), attr("VIDEO-RANGE", "")]);
    }

    #[rstest]
    #[case("This is a string with 100% potential", "100", false)]
    #[case("This is a string with 100% potential, but 50% success rate", "50", false)]
    #[case("This is a string with no potential", "", false)]
    #[case("This is a string has not 1 number, but 2", "2", true)]
    #[case("", "", false)]
    fn test_find_ends_in_number(
        #[case] input: &str,
        #[case] want: &str,
        #[case] want_ends: bool,
    ) {
        let (num, ends) = find_ends_in_number(input);
        assert_eq!((num, ends), (want, want_ends));
    }

    #[rstest]
    #[case("filePart249.1.m4s", "fileSequence249.m4s", true)]
    #[case("filePart249.2.m4s", "fileSequence249.m4s", true)]
    #[case("chunk249.1.m4s", "fileSequence249.m4s", true)]
    #[case("filePart0249.1.m4s", "fileSequence249.m4s", true)]
    #[case("filePart249.1.m4s", "fileSequence2490.m4s", false)]
    #[case("filePart2490.1.m4s", "fileSequence249.m4s", false)]
    #[case("filePart1249.1.m4s", "fileSequence249.m4s", false)]
    #[case("filePart249.1.ts", "fileSequence249.m4s", false)]
    #[case("filePart249.m4s", "fileSequence249.m4s", false)]
    #[case("filePart249.m4s", "fileSequence249.1.m4s", false)]
    fn test_is_part_of(#[case] partial: &str, #[case] seg: &str, #[case] want: bool) {
        assert_eq!(is_part_of(partial, seg), want);
    }

    #[test]
    fn test_unquoted() {
        assert_eq!(attr("CODECS", r#""avc1,mp4a""#).unquoted(), "avc1,mp4a");
        assert_eq!(attr("BANDWIDTH", "1000").unquoted(), "1000");
    }
}
