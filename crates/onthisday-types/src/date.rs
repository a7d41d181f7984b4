//! Validated month/day pair.
//!
//! Events are keyed by calendar month and day only; the year a user picks is
//! irrelevant to the lookup. Bounds are the loose ones the API enforces
//! (day 1-31 for every month), so `2月31日` is accepted and simply yields an
//! empty list upstream.

use std::fmt;

/// Errors produced when a month or day is out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonthDayError {
    /// Month outside `1..=12`.
    #[error("month {0} is outside 1-12")]
    Month(u32),

    /// Day outside `1..=31`.
    #[error("day {0} is outside 1-31")]
    Day(u32),
}

/// A calendar month and day, without a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Create a month/day pair, validating both bounds.
    ///
    /// The month is checked first, matching the order the API reports
    /// validation failures in.
    pub const fn new(month: u32, day: u32) -> Result<Self, MonthDayError> {
        if month < 1 || month > 12 {
            return Err(MonthDayError::Month(month));
        }
        if day < 1 || day > 31 {
            return Err(MonthDayError::Day(day));
        }
        Ok(Self { month, day })
    }

    /// Month number, 1-12.
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Day of month, 1-31.
    pub const fn day(self) -> u32 {
        self.day
    }

    /// Display label in the fixed `M月D日` format, no leading zeros.
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}月{}日", self.month, self.day)
    }
}
