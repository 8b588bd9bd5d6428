//! iCalendar (RFC 5545) rendering of service events.
//!
//! Each service becomes a one-hour `VEVENT` whose start and end carry the
//! configured `TZID`. Every content line ends in CRLF and long lines are
//! folded at 75 octets.

use crate::domain::model::{FeedEntry, ServiceEvent};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

pub const DEFAULT_TIME_ZONE: &str = "America/New_York";
pub const DEFAULT_PRODUCT_ID: &str = "-//Obit Calendar Feed//EN";

const CRLF: &str = "\r\n";
const MAX_LINE_OCTETS: usize = 75;
const LOCAL_STAMP_FORMAT: &str = "%Y%m%dT%H%M%S";
const UTC_STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

#[derive(Debug, Clone)]
pub struct CalendarOptions {
    pub time_zone: String,
    pub product_id: String,
    /// Written as `DTSTAMP` on every event.
    pub stamp: DateTime<Utc>,
}

impl CalendarOptions {
    pub fn new(time_zone: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            time_zone: time_zone.into(),
            product_id: product_id.into(),
            stamp: Utc::now(),
        }
    }

    pub fn with_stamp(mut self, stamp: DateTime<Utc>) -> Self {
        self.stamp = stamp;
        self
    }
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_ZONE, DEFAULT_PRODUCT_ID)
    }
}

pub fn render_calendar(events: &[ServiceEvent], options: &CalendarOptions) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", options.product_id),
        "CALSCALE:GREGORIAN".to_string(),
    ];

    for event in events {
        let Some(end) = event.date_time.checked_add_signed(Duration::hours(1)) else {
            tracing::warn!("Skipping '{}': end time out of range", event.name);
            continue;
        };
        let start = event.date_time.format(LOCAL_STAMP_FORMAT).to_string();
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}", event_uid(&event.name, event.date_time)));
        lines.push(format!(
            "DTSTAMP:{}",
            options.stamp.format(UTC_STAMP_FORMAT)
        ));
        lines.push(format!("SUMMARY:{}", escape_text(&event.name)));
        lines.push(format!("DTSTART;TZID={}:{}", options.time_zone, start));
        lines.push(format!(
            "DTEND;TZID={}:{}",
            options.time_zone,
            end.format(LOCAL_STAMP_FORMAT)
        ));
        lines.push(format!(
            "DESCRIPTION:{}",
            escape_text(&format!("Service for {}", event.name))
        ));
        if let Some(link) = &event.source_link {
            lines.push(format!("URL:{}", link));
        }
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());

    let mut document = String::new();
    for line in &lines {
        document.push_str(&fold_line(line));
        document.push_str(CRLF);
    }
    document
}

/// Renders entries read back from a JSON feed, skipping any whose date does
/// not parse.
pub fn render_feed_entries(entries: &[FeedEntry], options: &CalendarOptions) -> String {
    let events: Vec<ServiceEvent> = entries
        .iter()
        .filter_map(|entry| {
            let event = entry.to_event();
            if event.is_none() {
                tracing::warn!(
                    "Skipping feed entry '{}' with unusable date {:?}",
                    entry.name,
                    entry.date
                );
            }
            event
        })
        .collect();
    render_calendar(&events, options)
}

/// Stable across runs so calendar clients update events in place.
fn event_uid(name: &str, start: NaiveDateTime) -> String {
    let slug = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    format!("{}-{}@obit-feed", start.format(LOCAL_STAMP_FORMAT), slug)
}

pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Splits on character boundaries; continuation lines start with one space.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }
    let mut folded = String::with_capacity(line.len() + line.len() / 24);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            folded.push_str(CRLF);
            folded.push(' ');
            width = 1;
        }
        folded.push(c);
        width += len;
    }
    folded
}
