//! Date parsing and formatting.
//!
//! Front-matter dates are strings parsed with a caller-supplied chrono format
//! string and interpreted in a fixed timezone. Parsed dates are stored as
//! seconds since the UNIX epoch.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
    format::{Item, StrftimeItems},
};

/// Format and timezone used to interpret front-matter dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLocale {
    /// Default chrono format for date properties without their own format
    pub format: String,
    /// Offset applied to dates that carry no offset themselves
    pub offset: FixedOffset,
}

impl Default for DateLocale {
    fn default() -> Self {
        Self {
            format: "%Y-%m-%d".into(),
            offset: utc(),
        }
    }
}

impl DateLocale {
    pub fn new(format: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            format: format.into(),
            offset,
        }
    }

    /// Parse `value` with `format` (or the locale's default format).
    ///
    /// Accepts formats that yield a full datetime with offset, a naive
    /// datetime, or a date only (midnight in the locale's offset).
    pub fn parse(&self, value: &str, format: Option<&str>) -> Option<f64> {
        let format = format.unwrap_or(&self.format);
        let value = value.trim();

        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(to_epoch(&dt));
        }
        let naive = NaiveDateTime::parse_from_str(value, format).ok().or_else(|| {
            NaiveDate::parse_from_str(value, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
        let local = self.offset.from_local_datetime(&naive).single()?;
        Some(to_epoch(&local))
    }

    /// Format an epoch timestamp in the locale's offset.
    ///
    /// Returns `None` for an invalid format string or out-of-range timestamp.
    pub fn format(&self, timestamp: f64, format: &str) -> Option<String> {
        let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return None;
        }
        let dt = from_epoch(timestamp)?.with_timezone(&self.offset);
        Some(dt.format_with_items(items.into_iter()).to_string())
    }

    /// RFC 3339 rendering of an epoch timestamp in the locale's offset.
    pub fn iso8601(&self, timestamp: f64) -> Option<String> {
        Some(from_epoch(timestamp)?.with_timezone(&self.offset).to_rfc3339())
    }
}

/// Parse an offset such as `+02:00` or `Z`.
pub fn parse_offset(s: &str) -> Option<FixedOffset> {
    match s.trim() {
        "" | "Z" | "z" | "UTC" | "utc" => Some(utc()),
        other => other.parse().ok(),
    }
}

#[inline]
fn utc() -> FixedOffset {
    Utc.fix()
}

#[allow(clippy::cast_precision_loss)]
fn to_epoch<Tz: TimeZone>(dt: &DateTime<Tz>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_millis()) / 1000.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn from_epoch(timestamp: f64) -> Option<DateTime<Utc>> {
    if !timestamp.is_finite() {
        return None;
    }
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9).round() as u32;
    DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_only() {
        let locale = DateLocale::default();
        // 2025-01-01 = day 20089 since epoch
        assert_eq!(locale.parse("2025-01-01", None), Some(20089.0 * 86400.0));
    }

    #[test]
    fn test_parse_applies_offset() {
        let locale = DateLocale::new("%Y-%m-%d %H:%M", parse_offset("+02:00").unwrap());
        let utc = DateLocale::new("%Y-%m-%d %H:%M", parse_offset("Z").unwrap());
        let a = locale.parse("2024-06-15 12:00", None).unwrap();
        let b = utc.parse("2024-06-15 12:00", None).unwrap();
        assert_eq!(b - a, 7200.0);
    }

    #[test]
    fn test_parse_with_explicit_offset_in_value() {
        let locale = DateLocale::default();
        let parsed = locale.parse("2024-01-01T00:00:00+01:00", Some("%Y-%m-%dT%H:%M:%S%:z"));
        let midnight_utc = locale.parse("2024-01-01", None).unwrap();
        assert_eq!(parsed, Some(midnight_utc - 3600.0));
    }

    #[test]
    fn test_parse_rejects_mismatch() {
        let locale = DateLocale::default();
        assert_eq!(locale.parse("15/06/2024", None), None);
        assert_eq!(locale.parse("2024-02-30", None), None);
    }

    #[test]
    fn test_format_and_iso() {
        let locale = DateLocale::default();
        let ts = locale.parse("2024-06-15", None).unwrap();
        assert_eq!(locale.format(ts, "%Y/%m/%d").as_deref(), Some("2024/06/15"));
        assert_eq!(
            locale.iso8601(ts).as_deref(),
            Some("2024-06-15T00:00:00+00:00")
        );
    }

    #[test]
    fn test_format_invalid_pattern() {
        let locale = DateLocale::default();
        assert_eq!(locale.format(0.0, "%Y-%"), None);
    }

    #[test]
    fn test_parse_offset_variants() {
        assert_eq!(parse_offset("Z"), Some(utc()));
        assert_eq!(
            parse_offset("-05:00"),
            FixedOffset::west_opt(5 * 3600)
        );
        assert_eq!(parse_offset("bogus"), None);
    }
}
