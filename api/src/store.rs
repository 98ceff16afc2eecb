//! Local persistence for favorites and user settings.
//!
//! Both sit on a tiny key-value backend. Backend failures never reach the
//! caller: they are logged and answered with empty favorites or default
//! settings, so browsing keeps working when persistence does not.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const FAVORITES_KEY: &str = "favorites";
pub const SETTINGS_KEY: &str = "userSettings";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error, PathBuf),
    Serde(serde_json::Error, String),
    Poisoned(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e, path) => write!(f, "I/O error for {}: {e}", path.display()),
            StoreError::Serde(e, key) => write!(f, "invalid JSON under {key}: {e}"),
            StoreError::Poisoned(key) => write!(f, "store lock poisoned while accessing {key}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// User settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub dark_mode: bool,
    pub compact_mode: bool,
    pub show_odds: bool,
    pub show_half_time_score: bool,
    /// Seconds between list refreshes; see [`UserSettings::REFRESH_STEP`].
    pub auto_refresh_interval: u16,
    pub sound_alerts: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            compact_mode: false,
            show_odds: true,
            show_half_time_score: true,
            auto_refresh_interval: 60,
            sound_alerts: true,
        }
    }
}

impl UserSettings {
    pub const MIN_REFRESH: u16 = 15;
    pub const MAX_REFRESH: u16 = 120;
    pub const REFRESH_STEP: u16 = 15;

    /// Snap `secs` onto the 15..=120 grid, rounding down between steps.
    pub fn clamp_refresh(secs: u16) -> u16 {
        let clamped = secs.clamp(Self::MIN_REFRESH, Self::MAX_REFRESH);
        clamped - clamped % Self::REFRESH_STEP
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(Self::clamp_refresh(self.auto_refresh_interval)))
    }

    pub fn step_refresh_up(&mut self) {
        let current = Self::clamp_refresh(self.auto_refresh_interval);
        self.auto_refresh_interval = Self::clamp_refresh(current.saturating_add(Self::REFRESH_STEP));
    }

    pub fn step_refresh_down(&mut self) {
        let current = Self::clamp_refresh(self.auto_refresh_interval);
        self.auto_refresh_interval = Self::clamp_refresh(current.saturating_sub(Self::REFRESH_STEP));
    }
}

// ---------------------------------------------------------------------------
// Store contracts
// ---------------------------------------------------------------------------

pub trait FavoritesStore: Send + Sync {
    fn list(&self) -> HashSet<String>;
    /// No-op when `id` is already a favorite.
    fn add(&self, id: &str);
    /// No-op when `id` is not a favorite.
    fn remove(&self, id: &str);

    fn contains(&self, id: &str) -> bool {
        self.list().contains(id)
    }

    /// Flip membership; returns whether `id` is a favorite afterwards.
    fn toggle(&self, id: &str) -> bool {
        if self.contains(id) {
            self.remove(id);
            false
        } else {
            self.add(id);
            true
        }
    }
}

pub trait SettingsStore: Send + Sync {
    fn get(&self) -> UserSettings;
    fn save(&self, settings: &UserSettings);
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$XDG_CONFIG_HOME/livescore`, else `$HOME/.config/livescore`, else `./livescore`.
    pub fn default_dir() -> PathBuf {
        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
            && !config_dir.trim().is_empty()
        {
            return PathBuf::from(config_dir).join("livescore");
        }
        if let Ok(home) = std::env::var("HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home).join(".config").join("livescore");
        }
        PathBuf::from("livescore")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e, path)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::Io(e, self.dir.clone()))?;
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(|e| StoreError::Io(e, path))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned(key.to_owned()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned(key.to_owned()))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON-on-key-value adapter
// ---------------------------------------------------------------------------

/// Favorites as a JSON array and settings as a JSON object over any backend.
#[derive(Debug, Default)]
pub struct JsonStore<S> {
    backend: S,
}

impl<S: KeyValueStore> JsonStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn read<T: serde::de::DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Serde(e, key.to_owned()))
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let payload = serde_json::to_string(value).map_err(|e| StoreError::Serde(e, key.to_owned()))?;
        self.backend.set(key, &payload)
    }

    /// Favorite ids in insertion order; empty on any backend failure.
    fn favorite_ids(&self) -> Vec<String> {
        match self.read::<Vec<String>>(FAVORITES_KEY) {
            Ok(ids) => ids.unwrap_or_default(),
            Err(e) => {
                warn!("favorites unavailable, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    fn write_favorites(&self, ids: &[String]) {
        if let Err(e) = self.write(FAVORITES_KEY, &ids) {
            warn!("failed to persist favorites: {e}");
        }
    }
}

impl<S: KeyValueStore> FavoritesStore for JsonStore<S> {
    fn list(&self) -> HashSet<String> {
        self.favorite_ids().into_iter().collect()
    }

    fn add(&self, id: &str) {
        let mut ids = self.favorite_ids();
        if ids.iter().any(|existing| existing == id) {
            return;
        }
        ids.push(id.to_owned());
        self.write_favorites(&ids);
    }

    fn remove(&self, id: &str) {
        let mut ids = self.favorite_ids();
        let Some(index) = ids.iter().position(|existing| existing == id) else {
            return;
        };
        ids.remove(index);
        self.write_favorites(&ids);
    }
}

impl<S: KeyValueStore> SettingsStore for JsonStore<S> {
    fn get(&self) -> UserSettings {
        match self.read::<UserSettings>(SETTINGS_KEY) {
            Ok(settings) => settings.unwrap_or_default(),
            Err(e) => {
                warn!("settings unavailable, using defaults: {e}");
                UserSettings::default()
            }
        }
    }

    fn save(&self, settings: &UserSettings) {
        if let Err(e) = self.write(SETTINGS_KEY, settings) {
            warn!("failed to persist settings: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend that fails every call, standing in for broken persistence.
    struct Broken;

    impl KeyValueStore for Broken {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Poisoned(key.to_owned()))
        }
        fn set(&self, key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Poisoned(key.to_owned()))
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("livescore-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn add_is_idempotent() {
        let store = JsonStore::new(MemoryStore::default());
        store.add("1");
        let once = store.backend().get(FAVORITES_KEY).unwrap();
        store.add("1");
        let twice = store.backend().get(FAVORITES_KEY).unwrap();
        assert_eq!(once, twice);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn remove_absent_is_noop() {
        let store = JsonStore::new(MemoryStore::default());
        store.remove("nope");
        assert_eq!(store.backend().get(FAVORITES_KEY).unwrap(), None);

        store.add("1");
        store.add("2");
        store.remove("nope");
        assert_eq!(store.list(), HashSet::from(["1".to_string(), "2".to_string()]));
        store.remove("1");
        assert!(!store.contains("1"));
        assert!(store.contains("2"));
    }

    #[test]
    fn favorites_persist_as_json_array_in_insertion_order() {
        let store = JsonStore::new(MemoryStore::default());
        store.add("b");
        store.add("a");
        store.add("c");
        store.remove("a");
        let raw = store.backend().get(FAVORITES_KEY).unwrap();
        assert_eq!(raw.as_deref(), Some(r#"["b","c"]"#));
    }

    #[test]
    fn toggle_flips_membership() {
        let store = JsonStore::new(MemoryStore::default());
        assert!(store.toggle("7"));
        assert!(store.contains("7"));
        assert!(!store.toggle("7"));
        assert!(store.list().is_empty());
    }

    #[test]
    fn settings_default_when_nothing_saved() {
        let store = JsonStore::new(MemoryStore::default());
        assert_eq!(store.get(), UserSettings::default());
        assert_eq!(store.get().auto_refresh_interval, 60);
        assert!(store.get().show_odds);
    }

    #[test]
    fn settings_round_trip_and_replace_wholesale() {
        let store = JsonStore::new(MemoryStore::default());
        let first = UserSettings {
            dark_mode: true,
            compact_mode: true,
            show_odds: false,
            show_half_time_score: false,
            auto_refresh_interval: 15,
            sound_alerts: false,
        };
        store.save(&first);
        assert_eq!(store.get(), first);

        let second = UserSettings {
            auto_refresh_interval: 120,
            ..UserSettings::default()
        };
        store.save(&second);
        assert_eq!(store.get(), second);
    }

    #[test]
    fn settings_use_camel_case_keys() {
        let store = JsonStore::new(MemoryStore::default());
        store.save(&UserSettings::default());
        let raw = store.backend().get(SETTINGS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"autoRefreshInterval\":60"), "{raw}");
        assert!(raw.contains("\"showHalfTimeScore\":true"), "{raw}");
    }

    #[test]
    fn corrupt_payloads_degrade() {
        let backend = MemoryStore::default();
        backend.set(FAVORITES_KEY, "{not json").unwrap();
        backend.set(SETTINGS_KEY, "[1,2,3]").unwrap();
        let store = JsonStore::new(backend);
        assert!(store.list().is_empty());
        assert_eq!(store.get(), UserSettings::default());
    }

    #[test]
    fn broken_backend_degrades_without_panicking() {
        let store = JsonStore::new(Broken);
        store.add("1");
        store.remove("1");
        assert!(store.list().is_empty());
        store.toggle("1");
        assert!(store.list().is_empty());
        store.save(&UserSettings::default());
        assert_eq!(store.get(), UserSettings::default());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = temp_dir("files");
        {
            let store = JsonStore::new(FileStore::new(&dir));
            assert!(store.list().is_empty(), "missing file reads as empty");
            store.add("42");
            store.save(&UserSettings {
                dark_mode: true,
                ..UserSettings::default()
            });
        }
        let reopened = JsonStore::new(FileStore::new(&dir));
        assert!(reopened.contains("42"));
        assert!(reopened.get().dark_mode);
        assert!(dir.join("favorites.json").exists());
        assert!(dir.join("userSettings.json").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn refresh_interval_stays_on_the_grid() {
        assert_eq!(UserSettings::clamp_refresh(0), 15);
        assert_eq!(UserSettings::clamp_refresh(44), 30);
        assert_eq!(UserSettings::clamp_refresh(500), 120);

        let mut settings = UserSettings::default();
        for _ in 0..10 {
            settings.step_refresh_up();
        }
        assert_eq!(settings.auto_refresh_interval, 120);
        for _ in 0..10 {
            settings.step_refresh_down();
        }
        assert_eq!(settings.auto_refresh_interval, 15);
        assert_eq!(settings.refresh_interval(), std::time::Duration::from_secs(15));
    }
}
