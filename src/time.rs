//! Time scale helpers.
//!
//! Two representations coexist in the crate:
//! * **Ephemeris time** ([`Et`], TDB seconds past J2000) drives the geometric scan.
//! * **UTC** (`chrono::DateTime<Utc>`) tags catalog records, artifacts and alignment keys.
//!
//! Conversions between both go through [`hifitime`], which carries the leap-second table.
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use hifitime::Epoch;

use crate::constants::Et;
use crate::radiocc_errors::RadioccError;

/// Format used for the plain-text artifacts (`2024-03-01 12:00:00`).
pub const TABLE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert an ephemeris time to a UTC timestamp (microsecond resolution).
///
/// Arguments
/// -----------------
/// * `et`: TDB seconds past J2000.
///
/// Return
/// ----------
/// * The corresponding UTC instant, or [`RadioccError::InvalidTimeFormat`] if it falls
///   outside the range representable by `chrono`.
pub fn et_to_utc(et: Et) -> Result<DateTime<Utc>, RadioccError> {
    let unix = Epoch::from_et_seconds(et).to_unix_seconds();
    let micros = (unix * 1e6).round() as i64;
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| RadioccError::InvalidTimeFormat(format!("ET {et} out of range")))
}

/// Convert a UTC timestamp to ephemeris time.
pub fn utc_to_et(utc: &DateTime<Utc>) -> Et {
    let unix = utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) * 1e-9;
    Epoch::from_unix_seconds(unix).to_et_seconds()
}

/// Parse a UTC timestamp as found in catalog records and configuration files.
///
/// Accepted forms
/// -----------------
/// * RFC 3339 with offset or `Z` (`2024-01-01T00:10:00Z`, `2024-01-01T00:10:00.5+00:00`)
/// * Naive ISO 8601, interpreted as UTC (`2024-01-01T00:10:00`, `2024-01-01 00:10:00.250`)
/// * A bare calendar date, taken at midnight UTC (`2024-01-01`)
pub fn parse_utc(s: &str) -> Result<DateTime<Utc>, RadioccError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| RadioccError::InvalidTimeFormat(s.to_string()))
}

/// Parse a one-way light time given as `MM:SS[.f]` or `HH:MM:SS[.f]`.
///
/// The catalog reports OWLT without an hour field as long as it stays below one hour.
pub fn parse_owlt(s: &str) -> Result<TimeDelta, RadioccError> {
    let err = || RadioccError::InvalidTimeFormat(format!("OWLT '{s}'"));

    let parts: Vec<&str> = s.trim().split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, sec] => ("0", *m, *sec),
        [h, m, sec] => (*h, *m, *sec),
        _ => return Err(err()),
    };

    let hours: i64 = hours.parse().map_err(|_| err())?;
    let minutes: i64 = minutes.parse().map_err(|_| err())?;
    let seconds: f64 = seconds.parse().map_err(|_| err())?;
    if hours < 0 || !(0..60).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(err());
    }

    let micros = hours
        .checked_mul(3600)
        .and_then(|s| s.checked_add(minutes * 60))
        .and_then(|s| s.checked_mul(1_000_000))
        .and_then(|us| us.checked_add((seconds * 1e6).round() as i64))
        .ok_or_else(err)?;
    Ok(TimeDelta::microseconds(micros))
}

/// Render a timestamp for the plain-text tables.
pub fn fmt_table(dt: &DateTime<Utc>) -> String {
    dt.format(TABLE_FORMAT).to_string()
}

/// Render a timestamp as ISO calendar with `prec` fractional digits (`2024-01-01T00:10:00.000`).
///
/// Fractional seconds are truncated, at most nanosecond digits are printed.
pub fn fmt_isoc(dt: &DateTime<Utc>, prec: usize) -> String {
    let base = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    if prec == 0 {
        return base;
    }
    let prec = prec.min(9);
    let frac = dt.timestamp_subsec_nanos() / 10u32.pow(9 - prec as u32);
    format!("{base}.{frac:0prec$}")
}

/// Generation stamp written at the top of every artifact.
pub fn generation_stamp(now: &DateTime<Utc>) -> String {
    format!("{} UTC", now.format(TABLE_FORMAT))
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    #[test]
    fn test_utc_to_et_at_j2000() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        // 32 leap seconds + 32.184 s (TT - TAI) at J2000
        assert_abs_diff_eq!(utc_to_et(&j2000), 64.184, epsilon = 1e-2);
    }

    #[test]
    fn test_et_utc_round_trip() {
        let t = Utc.with_ymd_and_hms(2023, 6, 15, 3, 4, 5).unwrap();
        let back = et_to_utc(utc_to_et(&t)).unwrap();
        assert!((back - t).num_microseconds().unwrap().abs() <= 1);
    }

    #[test]
    fn test_parse_utc_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 10, 0).unwrap();
        assert_eq!(parse_utc("2024-01-01T00:10:00Z").unwrap(), expected);
        assert_eq!(parse_utc("2024-01-01T00:10:00+00:00").unwrap(), expected);
        assert_eq!(parse_utc("2024-01-01T00:10:00").unwrap(), expected);
        assert_eq!(parse_utc("2024-01-01 00:10:00.000").unwrap(), expected);
        assert_eq!(
            parse_utc("2024-01-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(matches!(
            parse_utc("01.01.2024"),
            Err(RadioccError::InvalidTimeFormat(_))
        ));
    }

    #[test]
    fn test_parse_owlt() {
        assert_eq!(parse_owlt("12:30").unwrap(), TimeDelta::seconds(750));
        assert_eq!(parse_owlt("01:00:01").unwrap(), TimeDelta::seconds(3601));
        assert_eq!(
            parse_owlt("03:20.5").unwrap(),
            TimeDelta::milliseconds(200_500)
        );
        assert!(parse_owlt("abc").is_err());
        assert!(parse_owlt("61:00").is_err());
        assert!(parse_owlt("1:2:3:4").is_err());
        assert_eq!(
            parse_owlt("9999999999999999:00:00").unwrap_err(),
            RadioccError::InvalidTimeFormat("OWLT '9999999999999999:00:00'".into())
        );
        assert!(parse_owlt("3000000000000:00:00").is_err());
    }

    #[test]
    fn test_formatting() {
        let t = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 58).unwrap()
            + TimeDelta::milliseconds(125);
        assert_eq!(fmt_table(&t), "2024-02-29 23:59:58");
        assert_eq!(fmt_isoc(&t, 3), "2024-02-29T23:59:58.125");
        assert_eq!(fmt_isoc(&t, 0), "2024-02-29T23:59:58");
        assert_eq!(generation_stamp(&t), "2024-02-29 23:59:58 UTC");
    }
}
