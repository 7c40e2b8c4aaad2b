//! Pay periods.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::error::PayrollError;
use crate::leave::DateRange;

/// Inclusive date range a payrun covers.
///
/// A payrun is keyed by the calendar year and month of its start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPeriod {
    /// First day of the period.
    pub start: NaiveDate,
    /// Last day of the period.
    pub end: NaiveDate,
}

impl PayPeriod {
    /// Creates a period, rejecting an end before the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PayrollError> {
        if end < start {
            return Err(PayrollError::Validation(format!(
                "period end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The full calendar month.
    pub fn calendar_month(year: i32, month: u32) -> Result<Self, PayrollError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| PayrollError::Validation(format!("invalid month {year}-{month}")))?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| PayrollError::Validation(format!("invalid month {year}-{month}")))?;
        Self::new(start, end)
    }

    /// Calendar year of the period start.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Calendar month (1-12) of the period start.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// Monday-to-Friday days in the period.
    #[must_use]
    pub fn working_days(&self) -> u32 {
        let mut count = 0;
        let mut day = self.start;
        while day <= self.end {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                count += 1;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        count
    }

    /// Returns true if the date falls inside the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The period as a leave date range.
    #[must_use]
    pub fn as_range(&self) -> DateRange {
        DateRange {
            start: self.start,
            end: self.end,
        }
    }
}
