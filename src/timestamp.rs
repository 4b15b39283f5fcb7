use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Storage format for normalized timestamps. Seconds are always present so
/// that dedup comparison stays a plain string equality.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp must match dd/mm/yyyy HH:MM[:SS]")]
    InvalidFormat,
    #[error("timestamp fields do not form a valid calendar date")]
    InvalidCalendarDate,
}

static PATTERN: OnceLock<Regex> = OnceLock::new();

fn pattern() -> &'static Regex {
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{2})/(\d{2})/(\d{4}) (\d{2}):(\d{2})(?::(\d{2}))?$").expect("valid regex")
    })
}

/// Parses a `dd/mm/yyyy HH:MM[:SS]` detection timestamp, interprets it as
/// UTC and re-renders it in `reference` as `dd/mm/yyyy HH:MM:SS`.
///
/// The date is rebuilt from its numeric components; chrono refuses impossible
/// dates (31/02, hour 25) instead of rolling them over, which is exactly the
/// guard we need between "wrong shape" and "wrong calendar".
pub fn normalize(raw: &str, reference: FixedOffset) -> Result<String, TimestampError> {
    let caps = pattern()
        .captures(raw.trim())
        .ok_or(TimestampError::InvalidFormat)?;

    let field = |i: usize| caps.get(i).map_or("0", |m| m.as_str());
    let day: u32 = field(1).parse().map_err(|_| TimestampError::InvalidFormat)?;
    let month: u32 = field(2).parse().map_err(|_| TimestampError::InvalidFormat)?;
    let year: i32 = field(3).parse().map_err(|_| TimestampError::InvalidFormat)?;
    let hour: u32 = field(4).parse().map_err(|_| TimestampError::InvalidFormat)?;
    let minute: u32 = field(5).parse().map_err(|_| TimestampError::InvalidFormat)?;
    let second: u32 = field(6).parse().map_err(|_| TimestampError::InvalidFormat)?;

    let date =
        NaiveDate::from_ymd_opt(year, month, day).ok_or(TimestampError::InvalidCalendarDate)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or(TimestampError::InvalidCalendarDate)?;

    let detected = NaiveDateTime::new(date, time).and_utc();
    Ok(detected
        .with_timezone(&reference)
        .format(DISPLAY_FORMAT)
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sao_paulo() -> FixedOffset {
        FixedOffset::east_opt(-3 * 3600).unwrap()
    }

    #[test]
    fn test_accepts_full_timestamp() {
        let out = normalize("08/12/2025 20:00:00", sao_paulo()).unwrap();
        assert_eq!(out, "08/12/2025 17:00:00");
    }

    #[test]
    fn test_seconds_default_to_zero() {
        let out = normalize("08/12/2025 20:00", sao_paulo()).unwrap();
        assert_eq!(out, "08/12/2025 17:00:00");
    }

    #[test]
    fn test_conversion_can_cross_midnight() {
        let out = normalize("01/01/2025 01:30", sao_paulo()).unwrap();
        assert_eq!(out, "31/12/2024 22:30:00");
    }

    #[test]
    fn test_rejects_impossible_calendar_date() {
        assert_eq!(
            normalize("31/02/2025 10:00:00", sao_paulo()),
            Err(TimestampError::InvalidCalendarDate)
        );
    }

    #[test]
    fn test_rejects_impossible_time() {
        assert_eq!(
            normalize("08/12/2025 25:00:00", sao_paulo()),
            Err(TimestampError::InvalidCalendarDate)
        );
    }

    #[test]
    fn test_rejects_iso_format() {
        assert_eq!(
            normalize("2025-02-31T10:00:00Z", sao_paulo()),
            Err(TimestampError::InvalidFormat)
        );
    }

    #[test]
    fn test_rejects_one_digit_day() {
        assert_eq!(
            normalize("8/12/2025 20:00", sao_paulo()),
            Err(TimestampError::InvalidFormat)
        );
    }

    #[test]
    fn test_leap_day() {
        assert!(normalize("29/02/2024 12:00", sao_paulo()).is_ok());
        assert_eq!(
            normalize("29/02/2025 12:00", sao_paulo()),
            Err(TimestampError::InvalidCalendarDate)
        );
    }
}
