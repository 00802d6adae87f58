use std::{collections::HashMap, fs, path::PathBuf, sync::RwLock};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::KeyValueStore;

/// Page-local fallback store: a JSON map, optionally mirrored to a file.
pub struct LocalStore {
    path: Option<PathBuf>,
    data: RwLock<HashMap<String, Value>>,
}

impl LocalStore {
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let data = match &path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read local store from {}", path.display()))?;
                serde_json::from_str(&contents).unwrap_or_default()
            }
            _ => HashMap::new(),
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn persist(&self, data: &HashMap<String, Value>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write local store to {}", path.display()))
    }
}

#[async_trait]
impl KeyValueStore for LocalStore {
    async fn get_raw(&self, key: &str) -> Result<Option<Value>> {
        let guard = match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(guard.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: Value) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.insert(key.to_string(), value);
        self.persist(&guard)
    }
}
