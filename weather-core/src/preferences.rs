use anyhow::Result;
use std::{
    collections::HashMap,
    fmt::Debug,
    path::PathBuf,
    sync::{Mutex, MutexGuard},
};

use crate::config::Config;

/// Preference key holding the user's default city.
pub const CITY_KEY: &str = "city";

/// City used when nothing has been stored yet.
pub const FALLBACK_CITY: &str = "Paris";

/// Small string key/value store for user preferences.
pub trait PreferenceStore: Send + Sync + Debug {
    fn get_string(&self, key: &str) -> Option<String>;

    fn set_string(&self, key: &str, value: &str) -> Result<()>;
}

/// Stored default city, or the built-in fallback.
pub fn default_city(store: &dyn PreferenceStore) -> String {
    store
        .get_string(CITY_KEY)
        .filter(|city| !city.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_CITY.to_string())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::new();
        lock(&store.values).insert(key.to_string(), value.to_string());
        store
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_string(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept in the `[preferences]` table of the config file.
/// Every write is saved immediately.
#[derive(Debug)]
pub struct ConfigPreferences {
    path: PathBuf,
    config: Mutex<Config>,
}

impl ConfigPreferences {
    pub fn new(path: PathBuf, config: Config) -> Self {
        Self { path, config: Mutex::new(config) }
    }

    /// Preferences backed by the platform config file.
    pub fn open() -> Result<Self> {
        let path = Config::config_file_path()?;
        let config = Config::load_from(&path)?;
        Ok(Self::new(path, config))
    }
}

impl PreferenceStore for ConfigPreferences {
    fn get_string(&self, key: &str) -> Option<String> {
        lock(&self.config).preferences.get(key).cloned()
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        let mut config = lock(&self.config);
        config.preferences.insert(key.to_string(), value.to_string());
        config.save_to(&self.path)
    }
}
