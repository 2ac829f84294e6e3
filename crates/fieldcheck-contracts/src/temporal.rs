//! Temporal kinds, format specifications, and parsed temporal values.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Which component of a point in time a rule cares about.
///
/// The kind decides the default format and the shape check applied after
/// parsing: a `Date` must sit exactly on midnight, a `Time` must sit on the
/// epoch date 1970-01-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalKind {
    Date,
    Time,
    DateTime,
}

impl TemporalKind {
    pub const ALL: [TemporalKind; 3] = [TemporalKind::Date, TemporalKind::Time, TemporalKind::DateTime];

    /// Tag kind and symbol prefix: `date`, `time`, `datetime`.
    pub fn as_str(self) -> &'static str {
        match self {
            TemporalKind::Date => "date",
            TemporalKind::Time => "time",
            TemporalKind::DateTime => "datetime",
        }
    }

    /// Pattern synthesized when the rule author gave none. `DateTime` has no
    /// fixed shape and falls back to a permissive parse.
    pub fn default_pattern(self) -> Option<&'static str> {
        match self {
            TemporalKind::Date => Some("Y-m-d"),
            TemporalKind::Time => Some("H:i:s"),
            TemporalKind::DateTime => None,
        }
    }
}

impl fmt::Display for TemporalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemporalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(TemporalKind::Date),
            "time" => Ok(TemporalKind::Time),
            "datetime" => Ok(TemporalKind::DateTime),
            other => Err(format!("unknown temporal kind '{other}'")),
        }
    }
}

/// A format as given by the rule author or synthesized as a default.
///
/// `text` is either an alias name (`RFC3339`, `ATOM`, …) or a literal
/// pattern. Whether it was `explicit` changes which failure tag a mismatch
/// produces, so the flag travels with the format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    pub text: String,
    pub explicit: bool,
}

impl FormatSpec {
    pub fn explicit(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            explicit: true,
        }
    }

    pub fn synthesized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            explicit: false,
        }
    }
}

/// An absolute point in time together with the kind it was parsed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalValue {
    pub instant: DateTime<FixedOffset>,
    pub kind: TemporalKind,
}

impl TemporalValue {
    pub fn new(instant: DateTime<FixedOffset>, kind: TemporalKind) -> Self {
        Self { instant, kind }
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.instant.timestamp()
    }
}
