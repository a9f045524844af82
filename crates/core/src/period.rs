//! Relative time windows used to filter and aggregate revenues.
//!
//! Windows are counted back from `now` in whole periods. Offset 1 is the
//! current period; offset 2 is the one immediately before it, used for trend
//! comparison.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Period-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    /// Offsets start at 1.
    #[error("Period offset must be at least 1, got {0}")]
    InvalidOffset(u32),

    /// Unknown period name.
    #[error("Unknown period: {0}")]
    Unknown(String),
}

/// Period selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevenuePeriod {
    /// Last 7 days.
    LastWeek,
    /// Last 30 days.
    #[default]
    LastMonth,
    /// Last 90 days.
    LastThreeMonths,
    /// Last 180 days.
    LastSixMonths,
    /// Last 365 days.
    LastYear,
    /// No lower bound.
    All,
}

/// Half-open time range `[from, until)`; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodWindow {
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub until: Option<DateTime<Utc>>,
}

impl PeriodWindow {
    /// A window with no bounds.
    pub const UNBOUNDED: Self = Self {
        from: None,
        until: None,
    };

    /// True if `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.until.is_none_or(|until| at < until)
    }
}

impl RevenuePeriod {
    /// Length of the period in days; `None` for [`RevenuePeriod::All`].
    #[must_use]
    pub const fn days(self) -> Option<i64> {
        match self {
            Self::LastWeek => Some(7),
            Self::LastMonth => Some(30),
            Self::LastThreeMonths => Some(90),
            Self::LastSixMonths => Some(180),
            Self::LastYear => Some(365),
            Self::All => None,
        }
    }

    /// Lower bound `offset` periods before `now`; `None` means unbounded.
    pub fn from_date(
        self,
        now: DateTime<Utc>,
        offset: u32,
    ) -> Result<Option<DateTime<Utc>>, PeriodError> {
        if offset == 0 {
            return Err(PeriodError::InvalidOffset(offset));
        }
        Ok(self
            .days()
            .map(|days| now - TimeDelta::days(days * i64::from(offset))))
    }

    /// Window `offset` periods into the past.
    ///
    /// Offset 1 has no upper bound so future-dated revenues are counted in
    /// the current period. Returns `None` when no such window exists, which is
    /// the case for [`RevenuePeriod::All`] past offset 1.
    pub fn window(
        self,
        now: DateTime<Utc>,
        offset: u32,
    ) -> Result<Option<PeriodWindow>, PeriodError> {
        let from = self.from_date(now, offset)?;
        if offset == 1 {
            return Ok(Some(PeriodWindow { from, until: None }));
        }
        if from.is_none() {
            return Ok(None);
        }
        let until = self.from_date(now, offset - 1)?;
        Ok(Some(PeriodWindow { from, until }))
    }

    /// The current period's window.
    #[must_use]
    pub fn current_window(self, now: DateTime<Utc>) -> PeriodWindow {
        PeriodWindow {
            from: self
                .days()
                .map(|days| now - TimeDelta::days(days)),
            until: None,
        }
    }

    /// The window immediately before the current one.
    #[must_use]
    pub fn previous_window(self, now: DateTime<Utc>) -> Option<PeriodWindow> {
        self.window(now, 2).ok().flatten()
    }

    /// Stable name, as accepted by [`std::str::FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LastWeek => "LAST_WEEK",
            Self::LastMonth => "LAST_MONTH",
            Self::LastThreeMonths => "LAST_THREE_MONTHS",
            Self::LastSixMonths => "LAST_SIX_MONTHS",
            Self::LastYear => "LAST_YEAR",
            Self::All => "ALL",
        }
    }
}

impl std::fmt::Display for RevenuePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for RevenuePeriod {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LAST_WEEK" => Ok(Self::LastWeek),
            "LAST_MONTH" => Ok(Self::LastMonth),
            "LAST_THREE_MONTHS" => Ok(Self::LastThreeMonths),
            "LAST_SIX_MONTHS" => Ok(Self::LastSixMonths),
            "LAST_YEAR" => Ok(Self::LastYear),
            "ALL" => Ok(Self::All),
            _ => Err(PeriodError::Unknown(s.to_string())),
        }
    }
}
