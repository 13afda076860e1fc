use chrono::{DateTime, FixedOffset, SecondsFormat};

use super::minimal_float;
use crate::attribute::Attribute;
use crate::{Error, Result};

/// An `EXT-X-DATERANGE` tag: a range of time carrying attribute/value pairs.
///
/// Used for interstitials and other timed metadata. Date ranges whose
/// attributes signal SCTE-35 are instead attached to segments as
/// [`crate::tag::Scte`] records; the ones kept here are playlist-scoped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRange {
    /// Mandatory quoted-string ID.
    pub id: String,
    /// Client-defined class.
    pub class: String,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub end_date: Option<DateTime<FixedOffset>>,
    /// Enumerated-string-list of trigger identifiers: PRE, POST, or ONCE.
    pub cue: String,
    pub duration: Option<f64>,
    pub planned_duration: Option<f64>,
    /// `X-<client-attribute>` pairs, verbatim and in order.
    pub x_attrs: Vec<Attribute>,
    pub scte35_cmd: String,
    pub scte35_out: String,
    pub scte35_in: String,
    pub end_on_next: bool,
}

impl DateRange {
    /// Build from a decoded attribute list. The ID and a parseable
    /// START-DATE are required.
    pub(crate) fn from_attributes(attrs: &[Attribute]) -> Result<Self> {
        let mut dr = Self::default();
        for attr in attrs {
            match attr.key.as_str() {
                "ID" => dr.id = attr.unquoted().to_string(),
                "CLASS" => dr.class = attr.unquoted().to_string(),
                "START-DATE" => {
                    dr.start_date = Some(parse_date(attr.unquoted())?);
                }
                "END-DATE" => {
                    dr.end_date = Some(parse_date(attr.unquoted())?);
                }
                "CUE" => dr.cue = attr.unquoted().to_string(),
                "DURATION" => dr.duration = Some(parse_float(attr.unquoted())?),
                "PLANNED-DURATION" => dr.planned_duration = Some(parse_float(attr.unquoted())?),
                "SCTE35-CMD" => dr.scte35_cmd = attr.value.clone(),
                "SCTE35-OUT" => dr.scte35_out = attr.value.clone(),
                "SCTE35-IN" => dr.scte35_in = attr.value.clone(),
                "END-ON-NEXT" => dr.end_on_next = attr.unquoted() == "YES",
                key if key.starts_with("X-") => dr.x_attrs.push(attr.clone()),
                _ => {}
            }
        }
        if dr.id.is_empty() {
            return Err(Error::BadFormat(
                "EXT-X-DATERANGE without mandatory ID attribute".to_string(),
            ));
        }
        Ok(dr)
    }

    /// Whether any SCTE-35 attribute is present.
    pub fn has_scte35(&self) -> bool {
        !self.scte35_cmd.is_empty() || !self.scte35_out.is_empty() || !self.scte35_in.is_empty()
    }

    /// Append `#EXT-X-DATERANGE:...` to the output.
    pub(crate) fn write_line(&self, out: &mut String) {
        out.push_str("#EXT-X-DATERANGE:ID=\"");
        out.push_str(&self.id);
        out.push('"');
        if !self.class.is_empty() {
            out.push_str(",CLASS=\"");
            out.push_str(&self.class);
            out.push('"');
        }
        if let Some(start) = &self.start_date {
            out.push_str(",START-DATE=\"");
            out.push_str(&start.to_rfc3339_opts(SecondsFormat::AutoSi, true));
            out.push('"');
        }
        if !self.cue.is_empty() {
            out.push_str(",CUE=\"");
            out.push_str(&self.cue);
            out.push('"');
        }
        if let Some(end) = &self.end_date {
            out.push_str(",END-DATE=\"");
            out.push_str(&end.to_rfc3339_opts(SecondsFormat::AutoSi, true));
            out.push('"');
        }
        if let Some(duration) = self.duration {
            out.push_str(",DURATION=");
            out.push_str(&minimal_float(duration));
        }
        if let Some(planned) = self.planned_duration {
            out.push_str(",PLANNED-DURATION=");
            out.push_str(&minimal_float(planned));
        }
        for attr in &self.x_attrs {
            out.push(',');
            out.push_str(&attr.key);
            out.push('=');
            out.push_str(&attr.value);
        }
        if !self.scte35_cmd.is_empty() {
            out.push_str(",SCTE35-CMD=");
            out.push_str(&self.scte35_cmd);
        }
        if !self.scte35_out.is_empty() {
            out.push_str(",SCTE35-OUT=");
            out.push_str(&self.scte35_out);
        }
        if !self.scte35_in.is_empty() {
            out.push_str(",SCTE35-IN=");
            out.push_str(&self.scte35_in);
        }
        if self.end_on_next {
            out.push_str(",END-ON-NEXT=YES");
        }
        out.push('\n');
    }
}

pub(crate) fn parse_date(s: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::BadFormat(format!("invalid RFC 3339 date {s:?}: {e}")))
}

fn parse_float(s: &str) -> Result<f64> {
    s.parse()
        .map_err(|_| Error::BadFormat(format!("invalid decimal value {s:?}")))
}
