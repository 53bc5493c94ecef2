// src/utils/time.rs

use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (taken as UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Renders an instant the way Postgres renders `timestamptz` inside JSON,
/// so stored and filter values compare consistently.
pub fn timestamp_value(instant: DateTime<Utc>) -> Value {
    Value::String(instant.to_rfc3339_opts(SecondsFormat::Micros, false))
}

/// Reporting window used by leaderboard and analytics operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    Daily,
    Weekly,
    Monthly,
    #[default]
    AllTime,
}

impl TimePeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::Daily => "daily",
            TimePeriod::Weekly => "weekly",
            TimePeriod::Monthly => "monthly",
            TimePeriod::AllTime => "all_time",
        }
    }

    /// First instant inside the window ending at `now`, or `None` when unbounded.
    ///
    /// Weeks start on Sunday.
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let midnight = |date: NaiveDate| {
            date.and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive))
        };
        let today = now.date_naive();
        match self {
            TimePeriod::Daily => midnight(today),
            TimePeriod::Weekly => {
                let back = i64::from(today.weekday().num_days_from_sunday());
                midnight(today - Duration::days(back))
            }
            TimePeriod::Monthly => today.with_day(1).and_then(midnight),
            TimePeriod::AllTime => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn parses_plain_dates_as_utc_midnight() {
        assert_eq!(at("2025-02-03"), at("2025-02-03T00:00:00Z"));
        assert!(parse_timestamp("next tuesday").is_none());
    }

    #[test]
    fn weekly_window_starts_on_sunday() {
        // 2025-06-12 is a Thursday.
        let now = at("2025-06-12T15:45:00Z");
        assert_eq!(TimePeriod::Weekly.start(now), Some(at("2025-06-08T00:00:00Z")));
    }

    #[test]
    fn daily_and_monthly_windows() {
        let now = at("2025-06-12T15:45:00Z");
        assert_eq!(TimePeriod::Daily.start(now), Some(at("2025-06-12T00:00:00Z")));
        assert_eq!(TimePeriod::Monthly.start(now), Some(at("2025-06-01T00:00:00Z")));
        assert_eq!(TimePeriod::AllTime.start(now), None);
    }

    #[test]
    fn timestamp_value_round_trips_through_parser() {
        let now = at("2025-06-12T15:45:00Z");
        let rendered = timestamp_value(now);
        assert_eq!(parse_timestamp(rendered.as_str().unwrap()), Some(now));
    }
}
