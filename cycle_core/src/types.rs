//! Core domain types for the cycle prediction system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Calendar dates without a time-of-day component
//! - Cycle parameters and the fertile window offsets
//! - Predictions and the event tags projected onto a calendar

use chrono::{DateTime, Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Calendar Dates
// ============================================================================

/// A calendar day with no time-of-day component.
///
/// Two dates are equal iff they share year, month and day. Values coming from
/// the host as full timestamps are reduced to the calendar day they were
/// written in, ignoring the offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn naive(self) -> NaiveDate {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// Shift by a signed number of days; `None` past the representable range
    pub fn add_days(self, days: i64) -> Option<Self> {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        shifted.map(Self)
    }

    /// The following day
    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// Signed number of days from `self` to `other`
    pub fn days_until(self, other: CalendarDate) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Days since the most recent Sunday (Sunday = 0)
    pub fn weekday_from_sunday(self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    pub fn first_of_month(self) -> Self {
        self.0.with_day(1).map(Self).unwrap_or(self)
    }

    /// Last day of this date's month
    pub fn last_of_month(self) -> Option<Self> {
        self.first_of_month().shift_months(1)?.add_days(-1)
    }

    /// First day of the month `delta` months away (negative moves back)
    pub fn shift_months(self, delta: i32) -> Option<Self> {
        let first = self.first_of_month().0;
        let months = Months::new(delta.unsigned_abs());
        let shifted = if delta >= 0 {
            first.checked_add_months(months)
        } else {
            first.checked_sub_months(months)
        };
        shifted.map(Self)
    }

    pub fn same_month(self, other: CalendarDate) -> bool {
        self.year() == other.year() && self.month() == other.month()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDate {
    type Err = chrono::ParseError;

    /// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => Ok(Self(date)),
            Err(plain_err) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Self(dt.date_naive()))
                .map_err(|_| plain_err),
        }
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Cycle Parameters
// ============================================================================

pub const MIN_CYCLE_LENGTH: u32 = 21;
pub const MAX_CYCLE_LENGTH: u32 = 35;
pub const DEFAULT_CYCLE_LENGTH: u32 = 28;
pub const MIN_LUTEAL_PHASE: u32 = 10;
pub const DEFAULT_LUTEAL_PHASE: u32 = 14;
/// Days that must separate cycle start from ovulation
pub const MIN_FOLLICULAR_DAYS: u32 = 5;
pub const MIN_PREDICTION_COUNT: u32 = 1;
pub const MAX_PREDICTION_COUNT: u32 = 12;
pub const DEFAULT_PREDICTION_COUNT: u32 = 3;

/// Fertile window placement relative to the ovulation day.
///
/// Earlier plugin revisions used 3 days before ovulation, later ones 5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FertileWindowOffsets {
    pub days_before_ovulation: u32,
    pub days_after_ovulation: u32,
}

impl Default for FertileWindowOffsets {
    fn default() -> Self {
        Self {
            days_before_ovulation: 5,
            days_after_ovulation: 1,
        }
    }
}

/// Inputs to the prediction engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleParameters {
    pub start_date: CalendarDate,
    pub cycle_length: u32,
    pub luteal_phase: u32,
    pub prediction_count: u32,
    #[serde(default)]
    pub fertile_window: FertileWindowOffsets,
}

impl CycleParameters {
    /// Parameters with the default cycle shape starting at `start_date`
    pub fn new(start_date: CalendarDate) -> Self {
        Self {
            start_date,
            cycle_length: DEFAULT_CYCLE_LENGTH,
            luteal_phase: DEFAULT_LUTEAL_PHASE,
            prediction_count: DEFAULT_PREDICTION_COUNT,
            fertile_window: FertileWindowOffsets::default(),
        }
    }

    /// Largest luteal phase allowed for this cycle length
    pub fn max_luteal_phase(&self) -> u32 {
        self.cycle_length.saturating_sub(MIN_FOLLICULAR_DAYS)
    }
}

// ============================================================================
// Predictions and Calendar Events
// ============================================================================

/// Inclusive date interval of the fertile window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FertileWindow {
    pub start: CalendarDate,
    pub end: CalendarDate,
}

impl FertileWindow {
    pub fn contains(&self, date: CalendarDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One forecast cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclePrediction {
    pub cycle_start: CalendarDate,
    pub next_cycle_start: CalendarDate,
    pub ovulation_date: CalendarDate,
    pub fertile_window: FertileWindow,
}

/// Tag projected onto a calendar day.
///
/// Declaration order is display priority: a day that is both a period start
/// and fertile shows as a period start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTag {
    Period,
    Ovulation,
    Fertile,
}

impl EventTag {
    pub fn label(self) -> &'static str {
        match self {
            EventTag::Period => "period",
            EventTag::Ovulation => "ovulation",
            EventTag::Fertile => "fertile",
        }
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
