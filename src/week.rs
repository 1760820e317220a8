//! Week arithmetic for weekly entries and insights. Weeks start on Monday
//! and dates travel as `YYYY-MM-DD` strings.

use crate::error::{JournalError, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| JournalError::Other(format!("Invalid date '{}', expected YYYY-MM-DD", date)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn get_week_start(date: &str) -> Result<String> {
    Ok(format_date(week_start(parse_date(date)?)))
}

/// Sunday of the week containing `date`.
pub fn get_week_end(date: &str) -> Result<String> {
    Ok(format_date(week_start(parse_date(date)?) + Duration::days(6)))
}

/// Monday of the following week.
pub fn get_next_week(date: &str) -> Result<String> {
    Ok(format_date(week_start(parse_date(date)?) + Duration::days(7)))
}

/// Monday of the preceding week.
pub fn get_previous_week(date: &str) -> Result<String> {
    Ok(format_date(week_start(parse_date(date)?) - Duration::days(7)))
}

pub fn is_future_week(date: &str) -> Result<bool> {
    is_future_week_from(date, today())
}

pub fn is_future_week_from(date: &str, today: NaiveDate) -> Result<bool> {
    Ok(week_start(parse_date(date)?) > week_start(today))
}

pub fn is_current_week(date: &str) -> Result<bool> {
    is_current_week_from(date, today())
}

pub fn is_current_week_from(date: &str, today: NaiveDate) -> Result<bool> {
    Ok(week_start(parse_date(date)?) == week_start(today))
}

/// `Jan 1 - Jan 7, 2024`, or with both years when the week spans two.
pub fn format_week_range(date: &str) -> Result<String> {
    let start = week_start(parse_date(date)?);
    let end = start + Duration::days(6);
    if start.year() == end.year() {
        Ok(format!(
            "{} - {}, {}",
            start.format("%b %-d"),
            end.format("%b %-d"),
            end.year()
        ))
    } else {
        Ok(format!(
            "{} - {}",
            start.format("%b %-d, %Y"),
            end.format("%b %-d, %Y")
        ))
    }
}
