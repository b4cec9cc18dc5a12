//! Daily reset clock for the free credit quota.
//!
//! Free credits are restored once per day at a fixed wall-clock hour. The
//! hour is interpreted in a fixed UTC offset so results do not depend on the
//! host time zone.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use serde::{Deserialize, Serialize};

use crate::error::{KolgateError, Result};

/// Default daily reset hour.
pub const DEFAULT_RESET_HOUR: u32 = 4;

/// How `should_reset` decides that the calendar day has advanced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateComparison {
    /// Reset once `now` reaches the first reset boundary after `last_reset`.
    #[default]
    Calendar,
    /// Compatibility mode: `now` must be past `last_reset`'s date at the reset
    /// hour and one of year, month or day must be greater, each compared on
    /// its own. A reset taken before the reset hour is not renewed that day.
    FieldWise,
}

impl DateComparison {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "calendar" => Some(Self::Calendar),
            "field-wise" | "fieldwise" | "field_wise" => Some(Self::FieldWise),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::FieldWise => "field-wise",
        }
    }
}

/// Time remaining until the next reset, floored to whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetCountdown {
    pub hours: i64,
    pub minutes: i64,
}

impl ResetCountdown {
    fn from_duration(duration: Duration) -> Self {
        let total = duration.num_minutes().max(0);
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }
}

impl std::fmt::Display for ResetCountdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

/// Computes reset boundaries for a fixed daily hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetClock {
    reset_time: NaiveTime,
    offset: FixedOffset,
    comparison: DateComparison,
}

impl ResetClock {
    /// Clock resetting at `reset_hour` UTC.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the hour is not in `0..=23`.
    pub fn new(reset_hour: u32) -> Result<Self> {
        let reset_time =
            NaiveTime::from_hms_opt(reset_hour, 0, 0).ok_or_else(|| KolgateError::ConfigInvalid {
                key: "credits.reset_hour".to_string(),
                value: reset_hour.to_string(),
                message: "reset hour must be between 0 and 23".to_string(),
            })?;
        Ok(Self {
            reset_time,
            offset: Utc.fix(),
            comparison: DateComparison::default(),
        })
    }

    /// Interpret the reset hour in the given offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Interpret the reset hour `minutes` east of UTC.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the offset is outside ±24 hours.
    pub fn with_offset_minutes(self, minutes: i32) -> Result<Self> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| KolgateError::ConfigInvalid {
                key: "credits.utc_offset_minutes".to_string(),
                value: minutes.to_string(),
                message: "offset must be within ±1439 minutes".to_string(),
            })?;
        Ok(self.with_offset(offset))
    }

    #[must_use]
    pub const fn with_comparison(mut self, comparison: DateComparison) -> Self {
        self.comparison = comparison;
        self
    }

    #[must_use]
    pub fn reset_hour(&self) -> u32 {
        self.reset_time.hour()
    }

    #[must_use]
    pub const fn comparison(&self) -> DateComparison {
        self.comparison
    }

    /// Offset east of UTC in which the reset hour is read, in minutes.
    #[must_use]
    pub fn utc_offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// Reset instant on a local calendar date.
    fn reset_on(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(self.reset_time);
        let utc = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }

    /// Next reset strictly after `now`.
    #[must_use]
    pub fn next_reset_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = self.reset_on(now.with_timezone(&self.offset).date_naive());
        if now >= today {
            today + Duration::days(1)
        } else {
            today
        }
    }

    /// Countdown to the next reset.
    #[must_use]
    pub fn time_until_reset(&self, now: DateTime<Utc>) -> ResetCountdown {
        ResetCountdown::from_duration(self.next_reset_at(now) - now)
    }

    /// Whether state last reset at `last_reset` is stale at `now`.
    #[must_use]
    pub fn should_reset(&self, last_reset: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.comparison {
            DateComparison::Calendar => now >= self.next_reset_at(last_reset),
            DateComparison::FieldWise => {
                let last = last_reset.with_timezone(&self.offset);
                let current = now.with_timezone(&self.offset);
                let normalized = self.reset_on(last.date_naive());
                now > normalized
                    && (current.year() > last.year()
                        || current.month() > last.month()
                        || current.day() > last.day())
            }
        }
    }
}

impl Default for ResetClock {
    fn default() -> Self {
        Self {
            reset_time: NaiveTime::from_hms_opt(DEFAULT_RESET_HOUR, 0, 0).unwrap_or(NaiveTime::MIN),
            offset: Utc.fix(),
            comparison: DateComparison::default(),
        }
    }
}
