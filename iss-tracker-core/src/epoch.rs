//! Day-of-year epoch strings used by CCSDS ephemerides
//!
//! Epochs look like `2023-061T12:00:00.000Z`: four-digit year, three-digit
//! day of year, then the UTC time of day with optional fractional seconds.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};

/// Parse an epoch string into a UTC instant.
///
/// Fractional seconds are dropped, two epochs within the same second compare
/// equal. Returns a human readable reason on failure.
pub fn parse_epoch(epoch: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = epoch.trim().trim_end_matches('Z');

    let (date, time) = trimmed
        .split_once('T')
        .ok_or_else(|| format!("missing 'T' separator in '{}'", epoch))?;

    let (year, ordinal) = date
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-DDD date in '{}'", epoch))?;
    let year: i32 = year
        .parse()
        .map_err(|_| format!("invalid year '{}'", year))?;
    let ordinal: u32 = ordinal
        .parse()
        .map_err(|_| format!("invalid day of year '{}'", ordinal))?;
    let date = NaiveDate::from_yo_opt(year, ordinal)
        .ok_or_else(|| format!("day {} does not exist in {}", ordinal, year))?;

    let time = NaiveTime::parse_from_str(time, "%H:%M:%S%.f")
        .map_err(|e| format!("invalid time of day '{}': {}", time, e))?;
    let time = time.with_nanosecond(0).unwrap_or(time);

    Ok(date.and_time(time).and_utc())
}

/// Format an instant back into the day-of-year epoch form (millisecond precision).
pub fn format_epoch(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%jT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_parse_epoch_day_of_year() {
        let instant = parse_epoch("2023-061T12:04:30.000Z").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2023, 3, 2, 12, 4, 30).unwrap());
        assert_eq!(instant.ordinal(), 61);
    }

    #[test]
    fn test_parse_epoch_ignores_fraction() {
        let a = parse_epoch("2023-061T12:00:00.000Z").unwrap();
        let b = parse_epoch("2023-061T12:00:00.999Z").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_epoch_leap_year() {
        assert!(parse_epoch("2024-366T00:00:00.000Z").is_ok());
        assert!(parse_epoch("2023-366T00:00:00.000Z").is_err());
    }

    #[test]
    fn test_parse_epoch_rejects_garbage() {
        assert!(parse_epoch("").is_err());
        assert!(parse_epoch("2023-061").is_err());
        assert!(parse_epoch("2023-03-02T12:00:00Z").is_err());
        assert!(parse_epoch("2023-061T25:00:00.000Z").is_err());
        assert!(parse_epoch("yesterday").is_err());
    }

    #[test]
    fn test_format_epoch() {
        let instant = Utc.with_ymd_and_hms(2023, 3, 2, 12, 4, 0).unwrap();
        assert_eq!(format_epoch(&instant), "2023-061T12:04:00.000Z");
    }
}
