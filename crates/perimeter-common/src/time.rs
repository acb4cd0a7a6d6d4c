//! Date handling for feature timestamps.
//!
//! Feature services report dates as UTC epoch milliseconds. Descriptions show
//! them as US-Pacific civil time using a fixed-offset approximation: UTC-7
//! from the second Sunday of March up to (excluding) the first Sunday of
//! November, UTC-8 otherwise. Boundaries are compared against the UTC
//! instant at midnight, not at the 02:00 local switch-over, and only the
//! post-2007 US rule is applied.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Rendered when no timestamp is present.
pub const NONE_MARKER: &str = "None";
/// Rendered for negative timestamps.
pub const INVALID_MARKER: &str = "Invalid Date";
/// Rendered for values that are not a usable number.
pub const UNPARSEABLE_MARKER: &str = " ";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of formatting a timestamp attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedDate {
    /// `YYYY-MM-DD HH:MM:SS` in Pacific time.
    Civil(String),
    /// Missing, null, zero or empty.
    Absent,
    /// Negative epoch value.
    Negative,
    /// Not numeric, or outside the representable range.
    Unparseable,
}

impl FormattedDate {
    pub fn as_str(&self) -> &str {
        match self {
            FormattedDate::Civil(s) => s,
            FormattedDate::Absent => NONE_MARKER,
            FormattedDate::Negative => INVALID_MARKER,
            FormattedDate::Unparseable => UNPARSEABLE_MARKER,
        }
    }
}

impl fmt::Display for FormattedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format an attribute value holding epoch milliseconds.
///
/// Falsy values (missing, null, `0`, `false`, `""`) count as absent.
pub fn format_date(value: Option<&Value>) -> FormattedDate {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => FormattedDate::Absent,
        Some(Value::String(s)) if s.is_empty() => FormattedDate::Absent,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(millis) => format_epoch_millis(millis),
            None => FormattedDate::Unparseable,
        },
        Some(_) => FormattedDate::Unparseable,
    }
}

/// Format UTC epoch milliseconds as Pacific civil time.
pub fn format_epoch_millis(millis: f64) -> FormattedDate {
    if !millis.is_finite() {
        return FormattedDate::Unparseable;
    }
    if millis == 0.0 {
        return FormattedDate::Absent;
    }
    if millis < 0.0 {
        return FormattedDate::Negative;
    }

    let Some(utc) = DateTime::<Utc>::from_timestamp_millis(millis.floor() as i64) else {
        return FormattedDate::Unparseable;
    };
    let utc = utc.naive_utc();

    let offset = Duration::hours(pacific_offset_hours(&utc));
    match utc.checked_sub_signed(offset) {
        Some(local) => FormattedDate::Civil(local.format(DISPLAY_FORMAT).to_string()),
        None => FormattedDate::Unparseable,
    }
}

/// Hours to subtract from UTC for Pacific time at the given instant.
pub fn pacific_offset_hours(utc: &NaiveDateTime) -> i64 {
    if is_pacific_dst(utc) {
        7
    } else {
        8
    }
}

/// Whether the UTC instant falls in the daylight saving window of its year.
pub fn is_pacific_dst(utc: &NaiveDateTime) -> bool {
    let year = utc.year();
    let start = sunday_on_or_after(year, 3, 8);
    let end = sunday_on_or_after(year, 11, 1);

    match (start, end) {
        (Some(start), Some(end)) => {
            let start = start.and_hms_opt(0, 0, 0);
            let end = end.and_hms_opt(0, 0, 0);
            matches!((start, end), (Some(s), Some(e)) if s <= *utc && *utc < e)
        }
        _ => false,
    }
}

/// First Sunday on or after the given calendar day.
fn sunday_on_or_after(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let days_until_sunday = (7 - date.weekday().num_days_from_sunday()) % 7;
    date.checked_add_signed(Duration::days(days_until_sunday as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DISPLAY_FORMAT).unwrap()
    }

    #[test]
    fn test_absent_and_invalid_markers() {
        assert_eq!(format_date(None).to_string(), "None");
        assert_eq!(format_date(Some(&Value::Null)).to_string(), "None");
        assert_eq!(format_date(Some(&json!(0))).to_string(), "None");
        assert_eq!(format_date(Some(&json!(""))).to_string(), "None");
        assert_eq!(format_date(Some(&json!(-1))).to_string(), "Invalid Date");
        assert_eq!(format_date(Some(&json!("yesterday"))).to_string(), " ");
        assert_eq!(format_date(Some(&json!([1, 2]))), FormattedDate::Unparseable);
    }

    #[test]
    fn test_summer_uses_seven_hour_offset() {
        // 2024-07-03 09:46:40 UTC
        let formatted = format_date(Some(&json!(1_720_000_000_000_i64)));
        assert_eq!(formatted, FormattedDate::Civil("2024-07-03 02:46:40".into()));
    }

    #[test]
    fn test_winter_uses_eight_hour_offset() {
        // 2024-01-01 00:00:00 UTC
        let formatted = format_date(Some(&json!(1_704_067_200_000_i64)));
        assert_eq!(formatted.as_str(), "2023-12-31 16:00:00");
    }

    #[test]
    fn test_fractional_millis_truncate_to_seconds() {
        assert_eq!(
            format_epoch_millis(1_704_067_200_999.5).as_str(),
            "2023-12-31 16:00:00"
        );
    }

    #[test]
    fn test_dst_window_boundaries() {
        // 2024: second Sunday of March is the 10th, first Sunday of November the 3rd.
        assert!(!is_pacific_dst(&utc("2024-03-09 23:59:59")));
        assert!(is_pacific_dst(&utc("2024-03-10 00:00:00")));
        assert!(is_pacific_dst(&utc("2024-11-02 23:59:59")));
        assert!(!is_pacific_dst(&utc("2024-11-03 00:00:00")));

        // 2023: March 12 and November 5.
        assert!(!is_pacific_dst(&utc("2023-03-11 12:00:00")));
        assert!(is_pacific_dst(&utc("2023-03-12 00:00:00")));
        assert!(!is_pacific_dst(&utc("2023-11-05 00:00:00")));
    }

    #[test]
    fn test_window_start_when_march_eighth_is_sunday() {
        // March 8, 2026 is a Sunday.
        assert!(is_pacific_dst(&utc("2026-03-08 00:00:00")));
        assert!(!is_pacific_dst(&utc("2026-03-07 23:59:59")));
    }

    #[test]
    fn test_out_of_range_is_unparseable() {
        assert_eq!(format_epoch_millis(1e30), FormattedDate::Unparseable);
        assert_eq!(format_epoch_millis(f64::NAN), FormattedDate::Unparseable);
    }
}
