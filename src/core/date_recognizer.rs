//! Recognises service dates in loosely formatted page text.
//!
//! Two strategies run in order and the first hit wins:
//!
//! 1. A whole fragment is matched against [`STRUCTURAL_FORMATS`], which may or
//!    may not carry a time of day.
//! 2. A longer text is scanned for the first `Month D, YYYY H:MM AM|PM`
//!    substring. Only that first occurrence is ever considered, even if it
//!    turns out not to be a valid date.
//!
//! Neither strategy fails loudly: anything unrecognised is `None`.

use crate::domain::model::RecognizedDate;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// `January 20, 2026 11:00 AM`
pub const DATE_TIME_FORMAT: &str = "%B %d, %Y %I:%M %p";
/// `January 20, 2026`
pub const DATE_ONLY_FORMAT: &str = "%B %d, %Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    DateTime(&'static str),
    DateOnly(&'static str),
}

impl DateFormat {
    pub fn parse(&self, fragment: &str) -> Option<RecognizedDate> {
        match self {
            DateFormat::DateTime(fmt) => NaiveDateTime::parse_from_str(fragment, fmt)
                .ok()
                .map(RecognizedDate::DateTime),
            DateFormat::DateOnly(fmt) => NaiveDate::parse_from_str(fragment, fmt)
                .ok()
                .map(RecognizedDate::DateOnly),
        }
    }
}

/// Tried top to bottom; append new layouts here.
pub const STRUCTURAL_FORMATS: &[DateFormat] = &[
    DateFormat::DateTime(DATE_TIME_FORMAT),
    DateFormat::DateOnly(DATE_ONLY_FORMAT),
];

const FULL_MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";

static EMBEDDED_DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b({FULL_MONTHS})\s+(\d{{1,2}}),\s*(\d{{4}})\s+(\d{{1,2}}):(\d{{2}})\s*([AaPp][Mm])\b"
    ))
    .expect("embedded date pattern is valid")
});

// chrono's `%B` also parses "Jan", so the full name is checked up front.
static FULL_MONTH_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^({FULL_MONTHS})\s")).expect("month pattern is valid")
});

/// Matches a whole fragment against the structural formats.
pub fn parse_structural(fragment: &str) -> Option<RecognizedDate> {
    let fragment = fragment.trim();
    if !FULL_MONTH_PREFIX.is_match(fragment) {
        return None;
    }
    STRUCTURAL_FORMATS
        .iter()
        .find_map(|format| format.parse(fragment))
}

/// Finds the first date-and-time substring in `text`.
pub fn search_embedded(text: &str) -> Option<NaiveDateTime> {
    let caps = EMBEDDED_DATE_TIME.captures(text)?;
    let normalized = format!(
        "{} {}, {} {}:{} {}",
        &caps[1],
        &caps[2],
        &caps[3],
        &caps[4],
        &caps[5],
        caps[6].to_ascii_uppercase()
    );
    NaiveDateTime::parse_from_str(&normalized, DATE_TIME_FORMAT).ok()
}

pub fn recognize(text: &str) -> Option<RecognizedDate> {
    parse_structural(text).or_else(|| search_embedded(text).map(RecognizedDate::DateTime))
}
