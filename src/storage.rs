//! Key/value slots holding serialized jars and settings.
//!
//! Each slot write replaces the whole value at once. Implementations must be
//! shareable between threads; [`crate::db::Database`] is the on-disk backend and
//! [`MemoryStorage`] the in-process one used by tests.

use crate::errors::{AppError, AppResult};
use std::collections::BTreeMap;
use std::sync::Mutex;

pub trait SlotStorage: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// All slot keys, in no particular order.
    fn keys(&self) -> AppResult<Vec<String>>;

    fn contains(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> AppResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|_| AppError::Internal("memory storage mutex poisoned".to_string()))
    }
}

impl SlotStorage for MemoryStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.slots()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.slots()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self) -> AppResult<Vec<String>> {
        Ok(self.slots()?.keys().cloned().collect())
    }

    fn contains(&self, key: &str) -> AppResult<bool> {
        Ok(self.slots()?.contains_key(key))
    }
}
