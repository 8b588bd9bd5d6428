use chrono::{Duration, NaiveDateTime};

pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Inclusive `[now, now + span]` interval of upcoming services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceWindow {
    span: Duration,
}

impl RelevanceWindow {
    pub fn days(days: u32) -> Self {
        Self {
            span: Duration::days(i64::from(days)),
        }
    }

    pub fn contains(&self, now: NaiveDateTime, date_time: NaiveDateTime) -> bool {
        if date_time < now {
            return false;
        }
        match now.checked_add_signed(self.span) {
            Some(end) => date_time <= end,
            None => true,
        }
    }
}

impl Default for RelevanceWindow {
    fn default() -> Self {
        Self::days(DEFAULT_WINDOW_DAYS)
    }
}

pub fn is_within_window(now: NaiveDateTime, date_time: NaiveDateTime) -> bool {
    RelevanceWindow::default().contains(now, date_time)
}
