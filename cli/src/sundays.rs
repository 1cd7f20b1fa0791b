/// Calendar helpers for the weekly prep run.
///
/// Everything here is pure: the wall clock is read once in `main` and passed in,
/// so every function can be tested against fixed dates.
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

use crate::error::PrepError;

/// Returns the day-of-month of every Sunday in `month` of `year`, ascending.
///
/// The day count comes from chrono, so leap-year Februaries are handled by the
/// calendar rather than by a hard-coded table. Months outside `1..=12` are
/// rejected instead of being rolled into the following year.
pub fn sundays_in_month(month: u32, year: i32) -> Result<Vec<u32>, PrepError> {
    let last = days_in_month(month, year)?;

    let sundays = (1..=last)
        .filter(|&day| {
            NaiveDate::from_ymd_opt(year, month, day)
                .is_some_and(|date| date.weekday() == Weekday::Sun)
        })
        .collect();

    Ok(sundays)
}

/// Number of days in `month` of `year` (proleptic Gregorian).
pub fn days_in_month(month: u32, year: i32) -> Result<u32, PrepError> {
    if !(1..=12).contains(&month) {
        return Err(PrepError::InvalidArgument(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        PrepError::InvalidArgument(format!("year {year} is out of range"))
    })?;
    // Day 0 of the following month.
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .ok_or_else(|| PrepError::InvalidArgument(format!("year {year} is out of range")))
}

/// Month and year one week after `today`, so the run always targets the
/// month of next Sunday's presentation.
pub fn next_week(today: NaiveDate) -> (u32, i32) {
    let future = today + Duration::days(7);
    (future.month(), future.year())
}

/// `YYYY-MM-DD` with zero-padded month and day.
pub fn sunday_stem(year: i32, month: u32, day: u32) -> String {
    format!("{year}-{month:02}-{day:02}")
}

/// Per-date folder name: the stem without dashes (`YYYYMMDD`).
pub fn folder_name(stem: &str) -> String {
    stem.replace('-', "")
}

/// English month name, e.g. `"February"`.
pub fn month_name(month: u32) -> Option<&'static str> {
    let month = u8::try_from(month).ok()?;
    chrono::Month::try_from(month).ok().map(|m| m.name())
}
