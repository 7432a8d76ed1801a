//! Dataset files: the bulk input set a server builds its store from

use serde::{Deserialize, Serialize};

use crate::{Key, Variant};

/// One key with its associated value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueEntry {
    pub key: Key,
    pub value: String,
}

/// Input set for building the shard store
///
/// JSON layout (tagged by variant):
/// ```text
/// {"variant": "presence", "keys": [9846819001, 9846819002]}
/// {"variant": "value", "entries": [{"key": 8065889001, "value": "Ammu"}]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum Dataset {
    /// Keys whose presence bit is set
    Presence { keys: Vec<Key> },
    /// Keys with their associated values
    Value { entries: Vec<ValueEntry> },
}

impl Dataset {
    /// Presence dataset from a list of keys
    pub fn from_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        Dataset::Presence {
            keys: keys.into_iter().collect(),
        }
    }

    /// Value dataset from key/value pairs
    pub fn from_entries<V: Into<String>>(entries: impl IntoIterator<Item = (Key, V)>) -> Self {
        Dataset::Value {
            entries: entries
                .into_iter()
                .map(|(key, value)| ValueEntry {
                    key,
                    value: value.into(),
                })
                .collect(),
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            Dataset::Presence { .. } => Variant::Presence,
            Dataset::Value { .. } => Variant::Value,
        }
    }

    /// Number of records in the set
    pub fn len(&self) -> usize {
        match self {
            Dataset::Presence { keys } => keys.len(),
            Dataset::Value { entries } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load dataset from JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let dataset = serde_json::from_str(&content)?;
        Ok(dataset)
    }

    /// Save dataset to JSON file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
