//! Calendar-aware bin steps for `chrono` dates and date-times.
//!
//! Bins are counted from the Unix epoch in multiples of the step, so a
//! 5-day bin always starts on a day whose epoch offset is divisible by 5 and
//! weeks start on Thursday (1970-01-01 was a Thursday). Month and year bins
//! start on the first of the month.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta};

use super::{BinKey, Edges};
use crate::error::{Error, Result};

/// Calendar resolution of a bin step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeUnit {
    /// Calendar years.
    Year,
    /// Calendar months.
    Month,
    /// Seven-day weeks.
    Week,
    /// Days.
    Day,
    /// Hours.
    Hour,
    /// Minutes.
    Minute,
    /// Seconds.
    Second,
}

impl TimeUnit {
    /// Length in seconds of fixed-duration units; `None` for months and years.
    #[must_use]
    pub const fn seconds(self) -> Option<i64> {
        match self {
            Self::Year | Self::Month => None,
            Self::Week => Some(7 * 86_400),
            Self::Day => Some(86_400),
            Self::Hour => Some(3_600),
            Self::Minute => Some(60),
            Self::Second => Some(1),
        }
    }
}

/// `measure` units of calendar time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalendarStep {
    /// Number of units per bin.
    pub measure: u32,
    /// Unit of the step.
    pub unit: TimeUnit,
}

impl CalendarStep {
    /// Create a calendar step.
    #[must_use]
    pub const fn new(measure: u32, unit: TimeUnit) -> Self {
        Self { measure, unit }
    }

    /// Length in calendar months, `None` for fixed-length units.
    fn months(self) -> Result<Option<u32>> {
        match self.unit {
            TimeUnit::Year => self
                .measure
                .checked_mul(12)
                .map(Some)
                .ok_or_else(|| Error::InvalidBinStep(format!("{self:?} overflows a month count"))),
            TimeUnit::Month => Ok(Some(self.measure)),
            _ => Ok(None),
        }
    }
}

fn epoch() -> NaiveDateTime {
    NaiveDateTime::default()
}

fn out_of_range(step: CalendarStep) -> Error {
    Error::InvalidBinStep(format!("{step:?} edge outside the supported calendar range"))
}

impl BinKey for NaiveDateTime {
    type Step = CalendarStep;

    fn check_step(step: &CalendarStep) -> Result<()> {
        if step.measure == 0 {
            return Err(Error::InvalidBinStep(format!("{step:?} has zero measure")));
        }
        step.months()?;
        Ok(())
    }

    fn truncate(self, step: &CalendarStep) -> Result<Self> {
        let step = *step;
        if let Some(span) = step.months()? {
            let months = i64::from(self.year() - 1970) * 12 + i64::from(self.month0());
            let start = months.div_euclid(i64::from(span)) * i64::from(span);
            let year = i32::try_from(1970 + start.div_euclid(12)).map_err(|_| out_of_range(step))?;
            let month = start.rem_euclid(12) as u32 + 1;
            return NaiveDate::from_ymd_opt(year, month, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .ok_or_else(|| out_of_range(step));
        }

        let span = step.unit.seconds().unwrap_or(1) * i64::from(step.measure);
        let elapsed = self.signed_duration_since(epoch()).num_seconds();
        let start = elapsed.div_euclid(span) * span;
        TimeDelta::try_seconds(start)
            .and_then(|d| epoch().checked_add_signed(d))
            .ok_or_else(|| out_of_range(step))
    }

    fn align(self, step: &CalendarStep) -> Result<Self> {
        self.truncate(step)
    }

    fn nth_edge(self, step: &CalendarStep, i: u32) -> Result<Self> {
        let step = *step;
        if let Some(span) = step.months()? {
            return span
                .checked_mul(i)
                .and_then(|m| self.checked_add_months(Months::new(m)))
                .ok_or_else(|| out_of_range(step));
        }
        let span = step.unit.seconds().unwrap_or(1) * i64::from(step.measure);
        span.checked_mul(i64::from(i))
            .and_then(TimeDelta::try_seconds)
            .and_then(|d| self.checked_add_signed(d))
            .ok_or_else(|| out_of_range(step))
    }

    fn into_edges(edges: Vec<Self>) -> Edges {
        Edges::Calendar(edges)
    }
}

impl BinKey for NaiveDate {
    type Step = CalendarStep;

    fn check_step(step: &CalendarStep) -> Result<()> {
        NaiveDateTime::check_step(step)
    }

    fn truncate(self, step: &CalendarStep) -> Result<Self> {
        Ok(NaiveDateTime::from(self).truncate(step)?.date())
    }

    fn align(self, step: &CalendarStep) -> Result<Self> {
        self.truncate(step)
    }

    fn nth_edge(self, step: &CalendarStep, i: u32) -> Result<Self> {
        Ok(NaiveDateTime::from(self).nth_edge(step, i)?.date())
    }

    fn into_edges(edges: Vec<Self>) -> Edges {
        Edges::Calendar(edges.into_iter().map(NaiveDateTime::from).collect())
    }
}
