//! Floor-area buckets for housing layouts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three floor-area categories a layout may be filed under.
///
/// The set is closed: any other string is rejected by validation, however
/// well-formed it looks (`"60-70"` is not a bucket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AreaRange {
    #[serde(rename = "80-90")]
    Sqm80To90,
    #[serde(rename = "90-100")]
    Sqm90To100,
    #[serde(rename = "100-120")]
    Sqm100To120,
}

impl AreaRange {
    pub const ALL: [AreaRange; 3] = [
        AreaRange::Sqm80To90,
        AreaRange::Sqm90To100,
        AreaRange::Sqm100To120,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AreaRange::Sqm80To90 => "80-90",
            AreaRange::Sqm90To100 => "90-100",
            AreaRange::Sqm100To120 => "100-120",
        }
    }

    /// Bucket labels joined for messages: `80-90, 90-100, 100-120`.
    pub fn allowed_list() -> String {
        AreaRange::ALL
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for AreaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAreaRange(pub String);

impl fmt::Display for UnknownAreaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown area range `{}` (expected one of {})",
            self.0,
            AreaRange::allowed_list()
        )
    }
}

impl std::error::Error for UnknownAreaRange {}

impl FromStr for AreaRange {
    type Err = UnknownAreaRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AreaRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownAreaRange(s.to_string()))
    }
}

/// The area range as stored on a normalized layout.
///
/// Validated loads only ever hold `Bucket`. `Other` keeps a latent bad value
/// visible when a record was normalized without passing validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AreaRangeValue {
    Bucket(AreaRange),
    Other(String),
}

impl AreaRangeValue {
    pub fn from_raw(raw: &str) -> Self {
        match raw.parse::<AreaRange>() {
            Ok(range) => AreaRangeValue::Bucket(range),
            Err(_) => AreaRangeValue::Other(raw.to_string()),
        }
    }

    pub fn bucket(&self) -> Option<AreaRange> {
        match self {
            AreaRangeValue::Bucket(range) => Some(*range),
            AreaRangeValue::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AreaRangeValue::Bucket(range) => range.as_str(),
            AreaRangeValue::Other(raw) => raw,
        }
    }
}

impl fmt::Display for AreaRangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
