//! SCTE-35 ad-signaling carriage.
//!
//! Cue messages are carried verbatim (base64 text); this crate never decodes
//! the splice payload. Three syntaxes are round-tripped: the SCTE-67 2014
//! `#EXT-SCTE35` form, the OATCLS `#EXT-OATCLS-SCTE35` / `#EXT-X-CUE-*`
//! family, and `#EXT-X-DATERANGE` tags with `SCTE35-*` attributes.

use chrono::{DateTime, FixedOffset, SecondsFormat};

use super::minimal_float;
use crate::attribute::Attribute;

/// Wire syntax of an SCTE-35 cue point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scte35Syntax {
    /// `#EXT-SCTE35:CUE="..."`, the default for backwards compatibility.
    #[default]
    Scte67_2014,
    /// `#EXT-OATCLS-SCTE35` with `#EXT-X-CUE-OUT`/`-CONT`/`-IN` markers.
    Oatcls,
    /// `#EXT-X-DATERANGE` carrying `SCTE35-CMD`/`-OUT`/`-IN` attributes.
    DateRange,
}

/// Position of a cue point within a break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scte35CueType {
    /// Cue-out point.
    #[default]
    Start,
    /// A segment between the start and end cue points.
    Mid,
    /// Cue-in point.
    End,
    /// A splice command that is neither in, out, nor mid.
    Cmd,
}

/// An SCTE-35 cue attached to a media segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scte {
    pub syntax: Scte35Syntax,
    pub cue_type: Scte35CueType,
    /// Base64-encoded cue message, carried verbatim.
    pub cue: String,
    pub id: String,
    /// TIME for SCTE-67 signalling.
    pub time: f64,
    /// ElapsedTime for OATCLS continuation markers.
    pub elapsed: f64,
    /// PLANNED-DURATION for DATERANGE signalling.
    pub planned_duration: Option<f64>,
    /// Duration for OATCLS and DATERANGE signalling.
    pub duration: Option<f64>,
    /// START-DATE for DATERANGE signalling.
    pub start_date: Option<DateTime<FixedOffset>>,
    /// END-DATE for DATERANGE signalling.
    pub end_date: Option<DateTime<FixedOffset>>,
}

impl Scte {
    /// Build the SCTE-67 2014 form from an `#EXT-SCTE35:` attribute list.
    pub(crate) fn from_scte67_attributes(attrs: &[Attribute]) -> Self {
        let mut scte = Self {
            syntax: Scte35Syntax::Scte67_2014,
            cue_type: Scte35CueType::Start,
            ..Self::default()
        };
        for attr in attrs {
            match attr.key.as_str() {
                "CUE" => scte.cue = attr.unquoted().to_string(),
                "ID" => scte.id = attr.unquoted().to_string(),
                "TIME" => scte.time = attr.unquoted().parse().unwrap_or(0.0),
                _ => {}
            }
        }
        scte
    }

    /// Append the tag line(s) for this cue to the output.
    pub(crate) fn write_lines(&self, out: &mut String) {
        match self.syntax {
            Scte35Syntax::Scte67_2014 => {
                out.push_str("#EXT-SCTE35:CUE=\"");
                out.push_str(&self.cue);
                out.push('"');
                if !self.id.is_empty() {
                    out.push_str(",ID=\"");
                    out.push_str(&self.id);
                    out.push('"');
                }
                if self.time != 0.0 {
                    out.push_str(",TIME=");
                    out.push_str(&minimal_float(self.time));
                }
                out.push('\n');
            }
            Scte35Syntax::Oatcls => match self.cue_type {
                Scte35CueType::Start => {
                    out.push_str("#EXT-OATCLS-SCTE35:");
                    out.push_str(&self.cue);
                    out.push('\n');
                    out.push_str("#EXT-X-CUE-OUT:");
                    out.push_str(&minimal_float(self.duration.unwrap_or(0.0)));
                    out.push('\n');
                }
                Scte35CueType::Mid => {
                    out.push_str("#EXT-X-CUE-OUT-CONT:ElapsedTime=");
                    out.push_str(&minimal_float(self.elapsed));
                    out.push_str(",Duration=");
                    out.push_str(&minimal_float(self.duration.unwrap_or(0.0)));
                    out.push_str(",SCTE35=");
                    out.push_str(&self.cue);
                    out.push('\n');
                }
                Scte35CueType::End => {
                    out.push_str("#EXT-X-CUE-IN\n");
                }
                Scte35CueType::Cmd => {
                    out.push_str("#EXT-OATCLS-SCTE35:");
                    out.push_str(&self.cue);
                    out.push('\n');
                }
            },
            Scte35Syntax::DateRange => {
                out.push_str("#EXT-X-DATERANGE:ID=\"");
                out.push_str(&self.id);
                out.push('"');
                if let Some(start) = &self.start_date {
                    out.push_str(",START-DATE=\"");
                    out.push_str(&start.to_rfc3339_opts(SecondsFormat::AutoSi, true));
                    out.push('"');
                }
                if let Some(end) = &self.end_date {
                    out.push_str(",END-DATE=\"");
                    out.push_str(&end.to_rfc3339_opts(SecondsFormat::AutoSi, true));
                    out.push('"');
                }
                if let Some(planned) = self.planned_duration {
                    out.push_str(",PLANNED-DURATION=");
                    out.push_str(&minimal_float(planned));
                }
                if let Some(duration) = self.duration {
                    out.push_str(",DURATION=");
                    out.push_str(&minimal_float(duration));
                }
                let attr = match self.cue_type {
                    Scte35CueType::Start => ",SCTE35-OUT=",
                    Scte35CueType::End => ",SCTE35-IN=",
                    Scte35CueType::Cmd | Scte35CueType::Mid => ",SCTE35-CMD=",
                };
                out.push_str(attr);
                out.push_str(&self.cue);
                out.push('\n');
            }
        }
    }
}
