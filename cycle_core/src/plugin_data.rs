//! Namespaced plugin data attached to a host entity.
//!
//! Each plugin owns exactly one namespace (its plugin id) inside the shared
//! bag. Writes are pure-functional: they return a new bag in which only the
//! target namespace changed and every other entry is the same shared
//! allocation as before, so no plugin can observe or corrupt a sibling.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Mapping from plugin id to an opaque JSON value owned by that plugin
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginDataBag {
    entries: BTreeMap<String, Arc<Value>>,
}

impl PluginDataBag {
    /// An empty bag, as created alongside a new entity
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, namespace: &str) -> Option<&Arc<Value>> {
        self.entries.get(namespace)
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.entries.contains_key(namespace)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace `namespace` in full, sharing every other entry
    pub fn merge_namespace(&self, namespace: &str, value: Value) -> PluginDataBag {
        let mut entries = self.entries.clone();
        entries.insert(namespace.to_string(), Arc::new(value));

        tracing::debug!(
            "Merged plugin namespace '{}' ({} namespaces total)",
            namespace,
            entries.len()
        );

        PluginDataBag { entries }
    }

    /// Drop `namespace`, sharing every other entry
    pub fn remove_namespace(&self, namespace: &str) -> PluginDataBag {
        let mut entries = self.entries.clone();
        if entries.remove(namespace).is_some() {
            tracing::debug!("Removed plugin namespace '{}'", namespace);
        }
        PluginDataBag { entries }
    }

    /// Read and validate a namespace against the plugin's schema
    ///
    /// Returns `Ok(None)` when the namespace is absent.
    pub fn read<T: DeserializeOwned>(&self, namespace: &str) -> Result<Option<T>> {
        let Some(value) = self.entries.get(namespace) else {
            return Ok(None);
        };

        T::deserialize(value.as_ref())
            .map(Some)
            .map_err(|e| Error::PluginData {
                namespace: namespace.to_string(),
                message: e.to_string(),
            })
    }

    /// Serialize `value` and merge it into `namespace`
    pub fn write<T: Serialize>(&self, namespace: &str, value: &T) -> Result<PluginDataBag> {
        let value = serde_json::to_value(value)?;
        Ok(self.merge_namespace(namespace, value))
    }
}

/// Free-function form of [`PluginDataBag::merge_namespace`]
pub fn merge_namespace(bag: &PluginDataBag, namespace: &str, value: Value) -> PluginDataBag {
    bag.merge_namespace(namespace, value)
}
