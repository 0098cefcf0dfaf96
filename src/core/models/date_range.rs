use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, WikitrackError};

/// Inclusive calendar date range for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `from > to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(WikitrackError::InvalidDateRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// First to last day of the month containing `today`.
    pub fn month_of(today: NaiveDate) -> Self {
        let first = today.with_day(1).unwrap_or(today);
        let (next_year, next_month) = if today.month() == 12 {
            (today.year() + 1, 1)
        } else {
            (today.year(), today.month() + 1)
        };
        let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(today);
        Self {
            from: first,
            to: last,
        }
    }

    /// Resolve optional CLI bounds against the current month.
    pub fn resolve(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Result<Self> {
        let month = Self::month_of(today);
        let from = from.map(parse_date).transpose()?.unwrap_or(month.from);
        let to = to.map(parse_date).transpose()?.unwrap_or(month.to);
        Self::new(from, to)
    }

    /// Earliest instant of the range, as the API expects it.
    pub fn start_marker(&self) -> String {
        format!("{}T00:00:00Z", self.from.format("%Y-%m-%d"))
    }

    /// Latest instant of the range, as the API expects it.
    pub fn end_marker(&self) -> String {
        format!("{}T23:59:59Z", self.to.format("%Y-%m-%d"))
    }
}

/// Parse a date string (ISO 8601: `YYYY-MM-DD`).
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| WikitrackError::InvalidDate {
        value: s.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn markers_cover_whole_days() {
        let range = DateRange::new(date(2026, 1, 5), date(2026, 1, 9)).unwrap();
        assert_eq!(range.start_marker(), "2026-01-05T00:00:00Z");
        assert_eq!(range.end_marker(), "2026-01-09T23:59:59Z");
    }

    #[test]
    fn single_day_range_is_valid() {
        assert!(DateRange::new(date(2026, 2, 1), date(2026, 2, 1)).is_ok());
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = DateRange::new(date(2026, 2, 2), date(2026, 2, 1)).unwrap_err();
        assert!(matches!(err, WikitrackError::InvalidDateRange { .. }));
    }

    #[test]
    fn month_of_handles_february_and_december() {
        let feb = DateRange::month_of(date(2024, 2, 14));
        assert_eq!(feb.from, date(2024, 2, 1));
        assert_eq!(feb.to, date(2024, 2, 29));

        let dec = DateRange::month_of(date(2025, 12, 31));
        assert_eq!(dec.from, date(2025, 12, 1));
        assert_eq!(dec.to, date(2025, 12, 31));
    }

    #[test]
    fn resolve_fills_missing_bounds_from_current_month() {
        let today = date(2026, 10, 19);
        let range = DateRange::resolve(Some("2026-10-10"), None, today).unwrap();
        assert_eq!(range.from, date(2026, 10, 10));
        assert_eq!(range.to, date(2026, 10, 31));
    }

    #[test]
    fn resolve_rejects_bad_dates() {
        let today = date(2026, 10, 19);
        let err = DateRange::resolve(Some("10/10/2026"), None, today).unwrap_err();
        assert!(matches!(err, WikitrackError::InvalidDate { .. }));
    }

    #[test]
    fn serializes_as_plain_dates() {
        let range = DateRange::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, r#"{"from":"2026-01-01","to":"2026-01-31"}"#);
    }
}
