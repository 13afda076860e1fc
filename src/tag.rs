pub mod daterange;
pub mod define;
pub mod key;
pub mod lowlatency;
pub mod map;
pub mod scte;

pub use daterange::DateRange;
pub use define::{Define, DefineKind};
pub use key::Key;
pub use lowlatency::{PartialSegment, PreloadHint, ServerControl};
pub use map::Map;
pub use scte::{Scte, Scte35CueType, Scte35Syntax};

/// Shortest decimal form that round-trips, e.g. `3`, `3.1`, `3.141`.
pub(crate) fn minimal_float(v: f64) -> String {
    format!("{v}")
}

/// Fixed three-decimal form, e.g. `3.006`, `25.000`.
pub(crate) fn fixed3(v: f64) -> String {
    format!("{v:.3}")
}
