#![forbid(unsafe_code)]

//! Core domain model and logic for the Cycle Kit habit plugins.
//!
//! This crate provides:
//! - Domain types (calendar dates, cycle parameters, predictions, event tags)
//! - Prediction engine
//! - Calendar overlay projection and month grids
//! - Namespaced plugin data merging
//! - Plugin capabilities, namespace schemas and settings form transitions
//!
//! Everything here is pure: no I/O beyond configuration and habit loading.

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod engine;
pub mod calendar;
pub mod overlay;
pub mod plugin_data;
pub mod plugin;
pub mod cycle_plugin;
pub mod notes;
pub mod form;
pub mod habit;

// Re-export commonly used types
pub use error::{Error, ParameterField, Result, ValidationError};
pub use types::*;
pub use config::Config;
pub use engine::{generate_predictions, predict_single};
pub use calendar::{month_grid, DateRange, Week};
pub use overlay::{build_event_map, cycle_day, nearest_prediction, EventTagMap};
pub use plugin_data::{merge_namespace, PluginDataBag};
pub use plugin::{default_registry, Plugin, PluginRegistry, CYCLE_PLUGIN_ID, NOTES_PLUGIN_ID};
pub use form::{apply_edit, FieldEdit, FormState};
pub use habit::{Habit, HabitUpdate};
