//! Plugin descriptors and the registry of built-in plugins.
//!
//! A plugin's capabilities are explicit optional fields resolved once at
//! registration, so callers check `plugin.prediction.is_some()` instead of
//! probing the plugin's shape on every render.

use crate::{
    Error, FertileWindowOffsets, Result, DEFAULT_CYCLE_LENGTH, DEFAULT_LUTEAL_PHASE,
    MAX_CYCLE_LENGTH, MIN_CYCLE_LENGTH,
};
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const CYCLE_PLUGIN_ID: &str = "menstrual-cycle-plugin";
pub const NOTES_PLUGIN_ID: &str = "core-notes";

/// Display information shown by the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
}

/// Cycle prediction support and its form bounds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredictionCapability {
    pub min_cycle_length: u32,
    pub max_cycle_length: u32,
    pub default_cycle_length: u32,
    pub default_luteal_phase: u32,
    pub fertile_window: FertileWindowOffsets,
}

impl Default for PredictionCapability {
    fn default() -> Self {
        Self {
            min_cycle_length: MIN_CYCLE_LENGTH,
            max_cycle_length: MAX_CYCLE_LENGTH,
            default_cycle_length: DEFAULT_CYCLE_LENGTH,
            default_luteal_phase: DEFAULT_LUTEAL_PHASE,
            fertile_window: FertileWindowOffsets::default(),
        }
    }
}

/// Dated note-taking support
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteCapability {
    pub max_length: usize,
}

impl Default for NoteCapability {
    fn default() -> Self {
        Self { max_length: 500 }
    }
}

/// A registered plugin. Its `id` doubles as its data namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plugin {
    pub id: String,
    pub metadata: PluginMetadata,
    pub prediction: Option<PredictionCapability>,
    pub notes: Option<NoteCapability>,
}

/// Plugins keyed by id
#[derive(Clone, Debug, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Plugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin; ids must be unique
    pub fn register(&mut self, plugin: Plugin) -> Result<()> {
        if plugin.id.trim().is_empty() {
            return Err(Error::Registry("Plugin id must not be empty".into()));
        }
        if self.plugins.contains_key(&plugin.id) {
            return Err(Error::Registry(format!(
                "Plugin '{}' is already registered",
                plugin.id
            )));
        }

        tracing::debug!(
            "Registered plugin '{}' (prediction: {}, notes: {})",
            plugin.id,
            plugin.prediction.is_some(),
            plugin.notes.is_some()
        );
        self.plugins.insert(plugin.id.clone(), plugin);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Plugin> {
        self.plugins.get(id)
    }

    /// Plugins sorted by id
    pub fn plugins(&self) -> Vec<&Plugin> {
        let mut plugins: Vec<_> = self.plugins.values().collect();
        plugins.sort_by(|a, b| a.id.cmp(&b.id));
        plugins
    }

    pub fn with_prediction(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.values().filter(|p| p.prediction.is_some())
    }

    /// Validate capability settings of every plugin
    ///
    /// Returns a list of problems; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for plugin in self.plugins() {
            if let Some(ref prediction) = plugin.prediction {
                if prediction.min_cycle_length < MIN_CYCLE_LENGTH
                    || prediction.max_cycle_length > MAX_CYCLE_LENGTH
                {
                    errors.push(format!(
                        "Plugin '{}': cycle length bounds {}..={} exceed {}..={}",
                        plugin.id,
                        prediction.min_cycle_length,
                        prediction.max_cycle_length,
                        MIN_CYCLE_LENGTH,
                        MAX_CYCLE_LENGTH
                    ));
                }
                if !(prediction.min_cycle_length..=prediction.max_cycle_length)
                    .contains(&prediction.default_cycle_length)
                {
                    errors.push(format!(
                        "Plugin '{}': default cycle length {} outside {}..={}",
                        plugin.id,
                        prediction.default_cycle_length,
                        prediction.min_cycle_length,
                        prediction.max_cycle_length
                    ));
                }
            }

            if let Some(ref notes) = plugin.notes {
                if notes.max_length == 0 {
                    errors.push(format!("Plugin '{}': note max length is zero", plugin.id));
                }
            }

            if plugin.prediction.is_none() && plugin.notes.is_none() {
                errors.push(format!("Plugin '{}' has no capabilities", plugin.id));
            }
        }

        errors
    }
}

/// Cached registry of built-in plugins
static DEFAULT_REGISTRY: Lazy<PluginRegistry> = Lazy::new(build_default_registry);

/// Get a reference to the cached built-in registry
pub fn default_registry() -> &'static PluginRegistry {
    &DEFAULT_REGISTRY
}

/// Builds a registry holding the built-in cycle tracker and notes plugins
pub fn build_default_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();

    let builtins = [
        Plugin {
            id: CYCLE_PLUGIN_ID.into(),
            metadata: PluginMetadata {
                name: "Cycle Tracker".into(),
                description: "Track and predict menstrual cycles".into(),
                version: "1.1.0".into(),
            },
            prediction: Some(PredictionCapability::default()),
            notes: None,
        },
        Plugin {
            id: NOTES_PLUGIN_ID.into(),
            metadata: PluginMetadata {
                name: "Notes".into(),
                description: "Add notes and reflections to your habit completions".into(),
                version: "1.0.0".into(),
            },
            prediction: None,
            notes: Some(NoteCapability::default()),
        },
    ];

    for plugin in builtins {
        if let Err(e) = registry.register(plugin) {
            tracing::error!("Failed to register built-in plugin: {}", e);
        }
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_contents() {
        let registry = default_registry();
        assert_eq!(registry.plugins().len(), 2);

        let cycle = registry.get(CYCLE_PLUGIN_ID).unwrap();
        assert!(cycle.prediction.is_some());
        assert!(cycle.notes.is_none());

        let notes = registry.get(NOTES_PLUGIN_ID).unwrap();
        assert_eq!(notes.notes.as_ref().unwrap().max_length, 500);
        assert_eq!(registry.with_prediction().count(), 1);
    }

    #[test]
    fn test_default_registry_validates() {
        let errors = build_default_registry().validate();
        assert!(errors.is_empty(), "Built-in plugins invalid: {:?}", errors);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = build_default_registry();
        let duplicate = registry.get(NOTES_PLUGIN_ID).unwrap().clone();

        assert!(matches!(registry.register(duplicate), Err(Error::Registry(_))));
    }

    #[test]
    fn test_validate_flags_bad_capabilities() {
        let mut registry = PluginRegistry::new();
        registry
            .register(Plugin {
                id: "bare".into(),
                metadata: PluginMetadata {
                    name: "Bare".into(),
                    description: String::new(),
                    version: "0.1.0".into(),
                },
                prediction: Some(PredictionCapability {
                    default_cycle_length: 40,
                    ..PredictionCapability::default()
                }),
                notes: Some(NoteCapability { max_length: 0 }),
            })
            .unwrap();

        let errors = registry.validate();
        assert_eq!(errors.len(), 2, "{:?}", errors);
    }
}
