//! Local-date helpers for the date input and the date label.
//!
//! The date input holds `YYYY-MM-DD` text. The label shows the month and
//! day only, as `M月D日`. Dates are parsed as plain calendar dates, never
//! as instants, so the label can not drift to a neighbouring day when the
//! local offset is negative.

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use onthisday_types::MonthDay;

use crate::error::DateError;

/// Source of the current local date.
///
/// Injected into the controller so tests can pin "today".
pub trait Clock: Send + Sync + 'static {
    /// Today's date in the user's local time zone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Today's date as zero-padded `YYYY-MM-DD`.
pub fn current_date(clock: &impl Clock) -> String {
    clock.today().format("%Y-%m-%d").to_string()
}

/// Parse the date input value.
///
/// Accepts `YYYY-MM-DD`, optionally followed by a time part (`T...` or a
/// space), which is ignored.
pub fn parse_date(input: &str) -> Result<NaiveDate, DateError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DateError::Empty);
    }
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| DateError::Invalid {
        input: input.to_owned(),
        reason: e.to_string(),
    })
}

/// Month and day of a parsed date.
pub fn month_day(date: NaiveDate) -> Result<MonthDay, DateError> {
    Ok(MonthDay::new(date.month(), date.day())?)
}

/// Render a `YYYY-MM-DD` string as the `M月D日` label.
pub fn format_date(input: &str) -> Result<String, DateError> {
    let date = parse_date(input)?;
    Ok(month_day(date)?.label())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fixed(y: i32, m: u32, d: u32) -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn current_date_is_zero_padded() {
        assert_eq!(current_date(&fixed(2024, 3, 5)), "2024-03-05");
        assert_eq!(current_date(&fixed(2024, 11, 30)), "2024-11-30");
    }

    #[test]
    fn format_date_drops_leading_zeros() {
        assert_eq!(format_date("2024-03-05"), Ok("3月5日".to_owned()));
        assert_eq!(format_date("1999-12-31"), Ok("12月31日".to_owned()));
    }

    #[test]
    fn format_date_ignores_time_part() {
        assert_eq!(format_date("2024-07-01T23:30:00"), Ok("7月1日".to_owned()));
    }

    #[test]
    fn empty_input_is_reported() {
        assert_eq!(parse_date("   "), Err(DateError::Empty));
    }

    #[test]
    fn garbage_input_is_invalid() {
        assert!(matches!(parse_date("not-a-date"), Err(DateError::Invalid { .. })));
        assert!(matches!(parse_date("2024-02-30"), Err(DateError::Invalid { .. })));
    }

    #[test]
    fn leap_day_maps_to_month_day() {
        let md = parse_date("2024-02-29").and_then(month_day);
        assert_eq!(md.map(|md| (md.month(), md.day())), Ok((2, 29)));
    }
}
