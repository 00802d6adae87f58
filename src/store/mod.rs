//! Uniform key-value persistence over two interchangeable backends.
//!
//! [`SqliteStore`] is the persistent store shared by every page; [`LocalStore`]
//! is the page-local fallback. Which one backs a [`Store`] is decided once, at
//! construction, from [`StoreBackend`].

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::config::StoreBackend;

mod local;
mod sqlite;

pub use local::LocalStore;
pub use sqlite::SqliteStore;

/// Raw capability both backends provide. Values are JSON documents.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<Value>>;
    async fn set_raw(&self, key: &str, value: Value) -> Result<()>;
}

/// Typed facade with per-key defaults. Failures are logged and never surfaced.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn open(backend: &StoreBackend) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match backend {
            StoreBackend::Sqlite { path } => Arc::new(SqliteStore::new(path.clone())?),
            StoreBackend::Local { path } => Arc::new(LocalStore::new(path.clone())?),
        };
        Ok(Self::new(store))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(LocalStore::in_memory()))
    }

    /// Reads `key`, falling back to `default` on a miss, a stored `null`,
    /// a backend failure or a value of the wrong shape.
    pub async fn get<T>(&self, key: &str, default: T) -> T
    where
        T: DeserializeOwned,
    {
        match self.backend.get_raw(key).await {
            Ok(Some(Value::Null)) | Ok(None) => default,
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|err| {
                warn!("Stored value for '{key}' has unexpected shape: {err}");
                default
            }),
            Err(err) => {
                warn!("Failed to read '{key}' from store: {err:?}");
                default
            }
        }
    }

    pub async fn set<T>(&self, key: &str, value: &T)
    where
        T: Serialize + ?Sized,
    {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(err) => {
                warn!("Failed to encode value for '{key}': {err}");
                return;
            }
        };

        if let Err(err) = self.backend.set_raw(key, value).await {
            warn!("Failed to write '{key}' to store: {err:?}");
        }
    }
}
