//! Model-year ranges parsed from signalset file names.
//!
//! A vehicle repository carries `signalsets/v3/default.json` plus optional
//! year-scoped variants named `<start>-<end>.json` (for example
//! `2015-2019.json`). Records produced from a variant carry the range;
//! records from `default.json` carry none.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// An inclusive model-year range, serialized as a two-element
/// `[start, end]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u16, u16)", into = "(u16, u16)")]
pub struct ModelYearRange {
    /// First model year covered, inclusive.
    pub start: u16,
    /// Last model year covered, inclusive.
    pub end: u16,
}

impl ModelYearRange {
    /// Create a range from explicit start and end years.
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// Parse a range from a file stem ending in `<start>-<end>`, where
    /// both parts are four-digit years. Returns `None` for stems without
    /// a trailing year-range pattern (for example `default`).
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        let caps = year_pattern().captures(stem)?;
        let start = caps[1].parse().ok()?;
        let end = caps[2].parse().ok()?;
        Some(Self { start, end })
    }
}

impl From<(u16, u16)> for ModelYearRange {
    fn from((start, end): (u16, u16)) -> Self {
        Self { start, end }
    }
}

impl From<ModelYearRange> for (u16, u16) {
    fn from(range: ModelYearRange) -> (u16, u16) {
        (range.start, range.end)
    }
}

impl std::fmt::Display for ModelYearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{4})-(\d{4})$").expect("valid year pattern"))
}
