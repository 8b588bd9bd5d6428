use crate::utils::error::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};
use url::Url;

/// Wire format of `date` in the JSON feed, e.g. `2026-01-20T11:00:00`.
pub const FEED_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// ISO layouts accepted when reading a feed back, tried in order. Date-only
/// values fall through to [`parse_feed_date`] and land at midnight.
const FEED_DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn parse_feed_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    FEED_DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Result of recognising a date in free text. Date-only matches are kept
/// distinct so callers can tell whether a time of day was present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizedDate {
    DateOnly(NaiveDate),
    DateTime(NaiveDateTime),
}

impl RecognizedDate {
    pub fn has_time(&self) -> bool {
        matches!(self, RecognizedDate::DateTime(_))
    }

    /// Date-only values are placed at midnight.
    pub fn to_datetime(self) -> NaiveDateTime {
        match self {
            RecognizedDate::DateOnly(date) => date.and_time(NaiveTime::MIN),
            RecognizedDate::DateTime(date_time) => date_time,
        }
    }
}

/// One upcoming service, as published in both feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEvent {
    pub name: String,
    #[serde(rename = "date", serialize_with = "serialize_feed_date")]
    pub date_time: NaiveDateTime,
    #[serde(rename = "link", skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
}

impl ServiceEvent {
    /// Returns `None` when the name is blank after trimming.
    pub fn new(
        name: &str,
        date_time: NaiveDateTime,
        source_link: Option<String>,
    ) -> Option<Self> {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            date_time,
            source_link,
        })
    }
}

fn serialize_feed_date<S: Serializer>(
    date_time: &NaiveDateTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&date_time.format(FEED_DATE_FORMAT))
}

/// Site-relative path of a detail page, compared by exact text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DetailReference(String);

impl DetailReference {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn resolve(&self, base: &Url) -> Result<Url> {
        Ok(base.join(&self.0)?)
    }
}

/// An entry read back from a published JSON feed. The date stays textual so
/// one malformed entry can be skipped without rejecting the whole feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl FeedEntry {
    /// Reads a published feed. Only a body that is not a JSON array is an
    /// error; entries with the wrong shape are logged and dropped.
    pub fn parse_feed(body: &str) -> Result<Vec<FeedEntry>> {
        let values: Vec<serde_json::Value> = serde_json::from_str(body)?;
        Ok(values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<FeedEntry>(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping malformed feed entry: {}", e);
                    None
                }
            })
            .collect())
    }

    pub fn to_event(&self) -> Option<ServiceEvent> {
        let date_time = parse_feed_date(self.date.as_deref()?)?;
        ServiceEvent::new(&self.name, date_time, self.link.clone())
    }
}

/// How the listing page exposes its services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ListingMode {
    /// Links to detail pages, one fetch per obituary.
    #[default]
    Links,
    /// Inline cards carrying name and service date.
    Cards,
}

#[derive(Debug, Clone)]
pub struct FeedResult {
    pub events: Vec<ServiceEvent>,
    pub json_output: String,
    pub ics_output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_blank_names_are_rejected() {
        assert!(ServiceEvent::new("   ", at(2026, 1, 20, 11, 0), None).is_none());
        let event = ServiceEvent::new("  Jane \n Doe ", at(2026, 1, 20, 11, 0), None).unwrap();
        assert_eq!(event.name, "Jane Doe");
    }

    #[test]
    fn test_event_serializes_to_feed_shape() {
        let event = ServiceEvent::new("Jane Doe", at(2026, 1, 20, 11, 0), None).unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Jane Doe", "date": "2026-01-20T11:00:00"})
        );

        let linked = ServiceEvent::new(
            "John Roe",
            at(2026, 1, 21, 14, 30),
            Some("https://example.com/obituary/john-roe".to_string()),
        )
        .unwrap();
        let json = serde_json::to_value(&linked).unwrap();
        assert_eq!(json["link"], "https://example.com/obituary/john-roe");
    }

    #[test]
    fn test_feed_entry_to_event() {
        let entry: FeedEntry =
            serde_json::from_str(r#"{"name": "Jane Doe", "date": "2026-01-20T11:00:00"}"#).unwrap();
        let event = entry.to_event().unwrap();
        assert_eq!(event.date_time, at(2026, 1, 20, 11, 0));

        let broken: FeedEntry =
            serde_json::from_str(r#"{"name": "Jane Doe", "date": "next Tuesday"}"#).unwrap();
        assert!(broken.to_event().is_none());

        let undated: FeedEntry = serde_json::from_str(r#"{"name": "Jane Doe"}"#).unwrap();
        assert!(undated.to_event().is_none());
    }

    #[test]
    fn test_feed_dates_accept_shorter_iso_forms() {
        assert_eq!(parse_feed_date("2026-01-21T11:00"), Some(at(2026, 1, 21, 11, 0)));
        assert_eq!(parse_feed_date("2026-01-21 11:00:00"), Some(at(2026, 1, 21, 11, 0)));
        assert_eq!(
            parse_feed_date("2026-01-21T11:00:00.250"),
            Some(at(2026, 1, 21, 11, 0) + chrono::Duration::milliseconds(250))
        );
        assert_eq!(parse_feed_date("2026-01-21"), Some(at(2026, 1, 21, 0, 0)));
        assert_eq!(parse_feed_date("January 21, 2026"), None);
    }

    #[test]
    fn test_parse_feed_drops_mistyped_entries() {
        let entries = FeedEntry::parse_feed(
            r#"[
                {"name": "Jane Doe", "date": "2026-01-20T11:00:00"},
                {"name": "Bad Type", "date": 20260120},
                {"name": 42, "date": "2026-01-20T12:00:00"},
                "not an object",
                {"name": "John Roe", "date": "2026-01-21T11:00"}
            ]"#,
        )
        .unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Jane Doe", "John Roe"]);
        assert!(entries.iter().all(|e| e.to_event().is_some()));

        assert!(FeedEntry::parse_feed(r#"{"name": "Jane Doe"}"#).is_err());
    }

    #[test]
    fn test_recognized_date_midnight() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let recognized = RecognizedDate::DateOnly(date);
        assert!(!recognized.has_time());
        assert_eq!(recognized.to_datetime(), at(2026, 1, 20, 0, 0));
    }

    #[test]
    fn test_reference_resolves_against_listing() {
        let base = Url::parse("https://example.com/obituaries/listing?page=1").unwrap();
        let reference = DetailReference::new("/obituary/jane-doe");
        assert_eq!(
            reference.resolve(&base).unwrap().as_str(),
            "https://example.com/obituary/jane-doe"
        );
    }
}
