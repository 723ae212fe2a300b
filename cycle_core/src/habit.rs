//! Host habit entity carrying the shared plugin data bag.
//!
//! The host owns storage; this model only mirrors the fields the core reads
//! and the partial-update call the host exposes. Host fields the core does
//! not know about are carried through untouched, and `startDate` is written
//! back exactly as the host sent it.

use crate::{CalendarDate, Error, PluginDataBag, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    /// Host value, either a plain date or a full timestamp
    pub start_date: String,
    #[serde(default)]
    pub plugin_data: PluginDataBag,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields to overwrite on a habit; `None` leaves the field as is
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub start_date: Option<CalendarDate>,
    pub plugin_data: Option<PluginDataBag>,
}

impl Habit {
    /// A new habit with a fresh id and an empty plugin data bag
    pub fn new(title: impl Into<String>, start_date: CalendarDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            start_date: start_date.to_string(),
            plugin_data: PluginDataBag::new(),
            extra: Map::new(),
        }
    }

    /// Return a copy with the given fields replaced
    pub fn apply_partial_update(&self, update: HabitUpdate) -> Habit {
        let mut habit = self.clone();
        if let Some(title) = update.title {
            habit.title = title;
        }
        if let Some(start_date) = update.start_date {
            habit.start_date = start_date.to_string();
        }
        if let Some(plugin_data) = update.plugin_data {
            habit.plugin_data = plugin_data;
        }
        tracing::debug!("Applied partial update to habit {}", habit.id);
        habit
    }

    /// Calendar day of `start_date`
    pub fn start_day(&self) -> Result<CalendarDate> {
        self.start_date.parse::<CalendarDate>().map_err(|e| {
            Error::Other(format!(
                "Habit {} has an unreadable startDate {:?}: {}",
                self.id, self.start_date, e
            ))
        })
    }

    /// Load a habit exported by the host as JSON
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let habit: Habit = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded habit {} from {:?}", habit.id, path);
        Ok(habit)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::NOTES_PLUGIN_ID;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_new_habit_has_empty_bag() {
        let habit = Habit::new("Cycle", date(2024, 1, 1));
        assert!(habit.plugin_data.is_empty());
        assert!(Uuid::parse_str(&habit.id).is_ok());
    }

    #[test]
    fn test_partial_update_only_touches_given_fields() {
        let habit = Habit::new("Cycle", date(2024, 1, 1));
        let bag = PluginDataBag::new().merge_namespace(NOTES_PLUGIN_ID, json!([]));

        let updated = habit.apply_partial_update(HabitUpdate {
            plugin_data: Some(bag.clone()),
            ..HabitUpdate::default()
        });

        assert_eq!(updated.title, "Cycle");
        assert_eq!(updated.start_day().unwrap(), date(2024, 1, 1));
        assert_eq!(updated.plugin_data, bag);
        assert!(habit.plugin_data.is_empty());
    }

    #[test]
    fn test_host_fields_survive_round_trip() {
        let raw = json!({
            "id": "h1",
            "title": "Cycle",
            "startDate": "2024-01-01T18:30:00.000Z",
            "frequency": "daily",
            "completedDates": ["2024-01-02"],
            "pluginData": { "wakatime-plugin": { "apiKey": "k" } }
        });

        let habit: Habit = serde_json::from_value(raw).unwrap();
        assert_eq!(habit.start_day().unwrap(), date(2024, 1, 1));
        assert_eq!(habit.extra["frequency"], json!("daily"));

        let back = serde_json::to_value(&habit).unwrap();
        assert_eq!(back["completedDates"], json!(["2024-01-02"]));
        assert_eq!(back["pluginData"]["wakatime-plugin"]["apiKey"], json!("k"));
        assert_eq!(back["startDate"], json!("2024-01-01T18:30:00.000Z"));
    }

    #[test]
    fn test_plugin_update_keeps_host_start_timestamp() {
        let habit: Habit = serde_json::from_value(json!({
            "id": "h1",
            "title": "Cycle",
            "startDate": "2024-01-01T18:30:00.000Z"
        }))
        .unwrap();

        let updated = habit.apply_partial_update(HabitUpdate {
            plugin_data: Some(PluginDataBag::new().merge_namespace(NOTES_PLUGIN_ID, json!([]))),
            ..HabitUpdate::default()
        });
        assert_eq!(updated.start_date, "2024-01-01T18:30:00.000Z");

        let moved = updated.apply_partial_update(HabitUpdate {
            start_date: Some(date(2024, 2, 1)),
            ..HabitUpdate::default()
        });
        assert_eq!(moved.start_date, "2024-02-01");
    }

    #[test]
    fn test_unreadable_start_date_reported() {
        let mut habit = Habit::new("Cycle", date(2024, 1, 1));
        habit.start_date = "someday".into();
        assert!(matches!(habit.start_day(), Err(Error::Other(ref msg)) if msg.contains("someday")));
    }

    #[test]
    fn test_missing_plugin_data_defaults_to_empty() {
        let habit: Habit =
            serde_json::from_value(json!({ "id": "h", "title": "t", "startDate": "2024-05-05" }))
                .unwrap();
        assert!(habit.plugin_data.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("habit.json");
        let habit = Habit::new("Cycle", date(2024, 1, 1));
        std::fs::write(&path, habit.to_json_pretty().unwrap()).unwrap();

        assert_eq!(Habit::load_from(&path).unwrap(), habit);
    }
}
