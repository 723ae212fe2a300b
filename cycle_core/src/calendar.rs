//! Calendar grid helpers.
//!
//! Builds Sunday-first week rows covering a month, including the filler days
//! from adjacent months, and provides a terminating inclusive day iterator.

use crate::CalendarDate;

/// Seven consecutive days, Sunday first
pub type Week = [CalendarDate; 7];

/// Inclusive range of calendar days.
///
/// Empty when `start > end`, and stops at the last representable date.
#[derive(Clone, Debug)]
pub struct DateRange {
    next: Option<CalendarDate>,
    end: CalendarDate,
}

impl DateRange {
    pub fn inclusive(start: CalendarDate, end: CalendarDate) -> Self {
        Self {
            next: (start <= end).then_some(start),
            end,
        }
    }
}

impl Iterator for DateRange {
    type Item = CalendarDate;

    fn next(&mut self) -> Option<CalendarDate> {
        let current = self.next?;
        self.next = if current < self.end { current.succ() } else { None };
        Some(current)
    }
}

/// Weeks fully covering the month that contains `month`
///
/// Any day of the month may be passed; only its year and month matter.
/// Returns an empty grid for months at the edge of the representable
/// calendar, where the filler days do not exist.
pub fn month_grid(month: CalendarDate) -> Vec<Week> {
    let first = month.first_of_month();

    let bounds = month.last_of_month().and_then(|last| {
        let grid_start = first.add_days(-i64::from(first.weekday_from_sunday()))?;
        let grid_end = last.add_days(i64::from(6 - last.weekday_from_sunday()))?;
        Some((grid_start, grid_end))
    });

    let Some((grid_start, grid_end)) = bounds else {
        tracing::warn!("No calendar grid for {}-{:02}", month.year(), month.month());
        return Vec::new();
    };

    let days: Vec<CalendarDate> = DateRange::inclusive(grid_start, grid_end).collect();
    let weeks: Vec<Week> = days
        .chunks_exact(7)
        .map(|chunk| [chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6]])
        .collect();

    tracing::debug!(
        "Built {}-week grid for {}-{:02} ({} to {})",
        weeks.len(),
        month.year(),
        month.month(),
        grid_start,
        grid_end
    );

    weeks
}
