//! Day-granularity calendar math. No time zones, no time of day.

use chrono::{NaiveDate, TimeDelta};

use crate::error::{BookingError, Result};

pub const ISO_FORMAT: &str = "%Y-%m-%d";

pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_FORMAT).map_err(|_| BookingError::InvalidDate {
        value: value.to_string(),
    })
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// `date + days`, saturating at chrono's representable range.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

pub fn previous_day(date: NaiveDate) -> NaiveDate {
    add_days(date, -1)
}

pub fn next_day(date: NaiveDate) -> NaiveDate {
    add_days(date, 1)
}

/// True when `target` falls in `[start, start + nights - 1]`. Zero nights covers nothing.
pub fn is_within_range(start: NaiveDate, nights: u32, target: NaiveDate) -> bool {
    if nights == 0 || target < start {
        return false;
    }
    (target - start).num_days() < i64::from(nights)
}

/// Every date of a stay, first night first.
pub fn stay_dates(start: NaiveDate, nights: u32) -> impl Iterator<Item = NaiveDate> {
    (0..i64::from(nights)).map(move |offset| add_days(start, offset))
}

pub fn add_days_iso(date: &str, days: i64) -> Result<String> {
    let parsed = parse_iso_date(date)?;
    let shifted = TimeDelta::try_days(days)
        .and_then(|delta| parsed.checked_add_signed(delta))
        .ok_or_else(|| BookingError::DateOutOfRange {
            date: date.to_string(),
            days,
        })?;
    Ok(format_iso_date(shifted))
}

pub fn previous_day_iso(date: &str) -> Result<String> {
    add_days_iso(date, -1)
}

pub fn next_day_iso(date: &str) -> Result<String> {
    add_days_iso(date, 1)
}

pub fn is_within_range_iso(start: &str, nights: u32, target: &str) -> Result<bool> {
    Ok(is_within_range(
        parse_iso_date(start)?,
        nights,
        parse_iso_date(target)?,
    ))
}
