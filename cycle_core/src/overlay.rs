//! Calendar overlay projection.
//!
//! Turns a set of cycle predictions into a day → event-tags index that any
//! calendar grid can be painted from, and answers per-date questions.
//!
//! Within one prediction a day carries a single tag, by priority: the cycle
//! start is a period day, the ovulation day is not also reported as fertile.
//! Across predictions tags union. Projection is total: an inverted fertile
//! window simply contributes no days.

use crate::calendar::DateRange;
use crate::{CalendarDate, CyclePrediction, EventTag};
use std::collections::{BTreeSet, HashMap};

/// Mapping from calendar day to the set of tags on that day
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventTagMap {
    days: HashMap<CalendarDate, BTreeSet<EventTag>>,
}

impl EventTagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag to a day, keeping any tags already there
    pub fn tag(&mut self, date: CalendarDate, tag: EventTag) {
        self.days.entry(date).or_default().insert(tag);
    }

    /// Tags on `date`; empty for days without events
    pub fn classify(&self, date: CalendarDate) -> BTreeSet<EventTag> {
        self.days.get(&date).cloned().unwrap_or_default()
    }

    /// Highest-priority tag on `date`, for displays showing a single event
    pub fn primary(&self, date: CalendarDate) -> Option<EventTag> {
        self.days.get(&date).and_then(|tags| tags.iter().next().copied())
    }

    pub fn has(&self, date: CalendarDate, tag: EventTag) -> bool {
        self.days.get(&date).is_some_and(|tags| tags.contains(&tag))
    }

    /// Number of days carrying at least one tag
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Tagged days in calendar order
    pub fn dates(&self) -> Vec<CalendarDate> {
        let mut dates: Vec<_> = self.days.keys().copied().collect();
        dates.sort();
        dates
    }
}

/// Project predictions onto calendar days
pub fn build_event_map(predictions: &[CyclePrediction]) -> EventTagMap {
    let mut map = EventTagMap::new();

    for prediction in predictions {
        let period = prediction.cycle_start;
        let ovulation = prediction.ovulation_date;

        map.tag(period, EventTag::Period);
        if ovulation != period {
            map.tag(ovulation, EventTag::Ovulation);
        }

        let window = prediction.fertile_window;
        for day in DateRange::inclusive(window.start, window.end) {
            if day != period && day != ovulation {
                map.tag(day, EventTag::Fertile);
            }
        }
    }

    tracing::debug!(
        "Projected {} predictions onto {} calendar days",
        predictions.len(),
        map.len()
    );

    map
}

/// The prediction whose cycle contains `date`, else the closest one
///
/// A cycle covers `[cycle_start, next_cycle_start)`. Outside every cycle the
/// prediction with the nearest boundary wins, earliest first on ties.
pub fn nearest_prediction(
    date: CalendarDate,
    predictions: &[CyclePrediction],
) -> Option<&CyclePrediction> {
    predictions.iter().min_by_key(|p| distance_to_cycle(date, p))
}

/// 1-based day of the cycle containing `date`, if any prediction contains it
pub fn cycle_day(date: CalendarDate, predictions: &[CyclePrediction]) -> Option<u32> {
    let prediction = nearest_prediction(date, predictions)?;
    if distance_to_cycle(date, prediction) != 0 {
        return None;
    }
    u32::try_from(prediction.cycle_start.days_until(date) + 1).ok()
}

fn distance_to_cycle(date: CalendarDate, prediction: &CyclePrediction) -> i64 {
    if date < prediction.cycle_start {
        date.days_until(prediction.cycle_start)
    } else if date >= prediction.next_cycle_start {
        prediction.next_cycle_start.days_until(date) + 1
    } else {
        0
    }
}
