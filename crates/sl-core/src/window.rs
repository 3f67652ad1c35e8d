//! Calendar months and the half-open partition windows built from them.

use crate::error::{CoreError, CoreResult};
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> CoreResult<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CoreError::InvalidMonth {
                value: format!("{}-{:02}", year, month),
            });
        }
        Ok(Self { year, month })
    }

    /// Month containing the given date
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Validated in the constructor
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn window(&self) -> PartitionWindow {
        PartitionWindow {
            month: *self,
            start: self.first_day(),
            end: self.next().first_day(),
        }
    }
}

impl FromStr for YearMonth {
    type Err = CoreError;

    /// Parse `YYYY-MM`. A trailing day (`YYYY-MM-DD`) is accepted and ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidMonth {
            value: s.to_string(),
        };
        let mut parts = s.trim().splitn(3, '-');
        let year = parts
            .next()
            .filter(|p| p.len() == 4)
            .and_then(|p| p.parse::<i32>().ok())
            .ok_or_else(invalid)?;
        let month = parts
            .next()
            .filter(|p| (1..=2).contains(&p.len()))
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        if let Some(day) = parts.next() {
            if day.is_empty() || !day.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
        }
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Inclusive range of months, iterated in chronological order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    start: YearMonth,
    end: YearMonth,
}

impl MonthRange {
    pub fn new(start: YearMonth, end: YearMonth) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidMonthRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM` arguments
    pub fn parse(start: &str, end: &str) -> CoreResult<Self> {
        Self::new(start.parse()?, end.parse()?)
    }

    /// A range holding only one month
    pub fn single(month: YearMonth) -> Self {
        Self {
            start: month,
            end: month,
        }
    }

    pub fn start(&self) -> YearMonth {
        self.start
    }

    pub fn end(&self) -> YearMonth {
        self.end
    }

    pub fn months(&self) -> impl Iterator<Item = YearMonth> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |m| {
            let next = m.next();
            (next <= end).then_some(next)
        })
    }

    pub fn windows(&self) -> impl Iterator<Item = PartitionWindow> {
        self.months().map(|m| m.window())
    }
}

/// Half-open interval `[first-of-month, first-of-next-month)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionWindow {
    month: YearMonth,
    start: NaiveDate,
    end: NaiveDate,
}

impl PartitionWindow {
    pub fn month(&self) -> YearMonth {
        self.month
    }

    /// Inclusive lower bound
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Exclusive upper bound
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Remote `$filter` predicate selecting this window on `field`.
    ///
    /// Bounds are local midnights written as `YYYY-MM-DDTHH:MM:SS±HH:MM`.
    pub fn remote_filter(&self, field: &str, tz_offset: &str) -> String {
        format!(
            "({field} ge {}T00:00:00{tz} and {field} lt {}T00:00:00{tz})",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d"),
            field = field,
            tz = tz_offset,
        )
    }
}

#[cfg(test)]
#[path = "window_test.rs"]
mod tests;
