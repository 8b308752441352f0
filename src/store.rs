use crate::segment::{Minutes, Segment, SegmentName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(test)]
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Key under which the timer defaults are kept.
pub const DEFAULTS_KEY: &str = "timerDefaults";

/// Durations and switches the form is pre-filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerDefaults {
    pub lectio: Minutes,
    pub meditatio: Minutes,
    pub oratio: Minutes,
    pub contemplatio: Minutes,
    pub lectio_enabled: bool,
    pub contemplatio_enabled: bool,
}

impl Default for TimerDefaults {
    fn default() -> Self {
        TimerDefaults {
            lectio: Minutes::DEFAULT,
            meditatio: Minutes::DEFAULT,
            oratio: Minutes::DEFAULT,
            contemplatio: Minutes::DEFAULT,
            lectio_enabled: true,
            contemplatio_enabled: true,
        }
    }
}

impl TimerDefaults {
    pub fn duration(&self, name: SegmentName) -> Minutes {
        match name {
            SegmentName::Lectio => self.lectio,
            SegmentName::Meditatio => self.meditatio,
            SegmentName::Oratio => self.oratio,
            SegmentName::Contemplatio => self.contemplatio,
        }
    }

    pub fn set_duration(&mut self, name: SegmentName, minutes: Minutes) {
        match name {
            SegmentName::Lectio => self.lectio = minutes,
            SegmentName::Meditatio => self.meditatio = minutes,
            SegmentName::Oratio => self.oratio = minutes,
            SegmentName::Contemplatio => self.contemplatio = minutes,
        }
    }

    /// Mandatory segments always report `true`.
    pub fn is_enabled(&self, name: SegmentName) -> bool {
        match name {
            SegmentName::Lectio => self.lectio_enabled,
            SegmentName::Contemplatio => self.contemplatio_enabled,
            SegmentName::Meditatio | SegmentName::Oratio => true,
        }
    }

    /// Returns `false` when `name` cannot be switched off.
    pub fn set_enabled(&mut self, name: SegmentName, enabled: bool) -> bool {
        match name {
            SegmentName::Lectio => self.lectio_enabled = enabled,
            SegmentName::Contemplatio => self.contemplatio_enabled = enabled,
            SegmentName::Meditatio | SegmentName::Oratio => return false,
        }
        true
    }

    pub fn segments(&self) -> [Segment; 4] {
        SegmentName::ALL.map(|name| {
            let segment = Segment::new(name, self.duration(name));
            if self.is_enabled(name) {
                segment
            } else {
                segment.disabled()
            }
        })
    }

    pub fn enabled_segments(&self) -> Vec<Segment> {
        self.segments().into_iter().filter(|s| s.enabled).collect()
    }
}

/// A string-to-string store, written through on every `set`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys live in one JSON object on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> FileStore {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(StoreError::Read(self.path.clone(), err)),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&text).map_err(|e| StoreError::Corrupt(self.path.clone(), e))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Write(self.path.clone(), e))?;
        }
        let text = serde_json::to_string_pretty(&entries).map_err(StoreError::Serialize)?;
        std::fs::write(&self.path, text).map_err(|e| StoreError::Write(self.path.clone(), e))?;

        debug!(key, path = %self.path.display(), "stored value");
        Ok(())
    }
}

/// Reads the defaults, falling back to the built-in ones when nothing usable
/// is stored.
pub fn load_defaults(store: &impl KeyValueStore) -> Result<TimerDefaults, StoreError> {
    let Some(raw) = store.get(DEFAULTS_KEY)? else {
        return Ok(TimerDefaults::default());
    };

    match serde_json::from_str(&raw) {
        Ok(defaults) => Ok(defaults),
        Err(err) => {
            warn!("ignoring unreadable timer defaults: {err}");
            Ok(TimerDefaults::default())
        }
    }
}

pub fn save_defaults(
    store: &mut impl KeyValueStore,
    defaults: &TimerDefaults,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(defaults).map_err(StoreError::Serialize)?;
    store.set(DEFAULTS_KEY, &raw)
}

/// `<config dir>/lectio`, or the working directory if there is no config dir.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lectio")
}

pub fn default_store_path() -> PathBuf {
    config_dir().join("storage.json")
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, io::Error),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, io::Error),
    #[error("{0} is not a valid store file: {1}")]
    Corrupt(PathBuf, serde_json::Error),
    #[error("failed to serialize value: {0}")]
    Serialize(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn minutes(m: u32) -> Minutes {
        Minutes::new(m).unwrap()
    }

    #[test]
    fn missing_record_falls_back_to_five_minutes() {
        let store = MemoryStore::default();
        let defaults = load_defaults(&store).unwrap();

        assert_eq!(defaults, TimerDefaults::default());
        assert!(defaults.segments().iter().all(|s| s.enabled && s.duration.get() == 5));
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let json = serde_json::to_value(TimerDefaults::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "lectio": 5,
                "meditatio": 5,
                "oratio": 5,
                "contemplatio": 5,
                "lectioEnabled": true,
                "contemplatioEnabled": true,
            })
        );
    }

    #[test]
    fn partial_record_fills_in_defaults() {
        let mut store = MemoryStore::default();
        store.set(DEFAULTS_KEY, r#"{"oratio": 12, "lectioEnabled": false}"#).unwrap();

        let defaults = load_defaults(&store).unwrap();

        assert_eq!(defaults.oratio.get(), 12);
        assert!(!defaults.lectio_enabled);
        assert_eq!(defaults.meditatio, Minutes::DEFAULT);
        assert!(defaults.contemplatio_enabled);
    }

    #[test]
    fn unreadable_record_falls_back() {
        let mut store = MemoryStore::default();
        store.set(DEFAULTS_KEY, r#"{"oratio": 0}"#).unwrap();
        assert_eq!(load_defaults(&store).unwrap(), TimerDefaults::default());

        store.set(DEFAULTS_KEY, "not json").unwrap();
        assert_eq!(load_defaults(&store).unwrap(), TimerDefaults::default());
    }

    #[test]
    fn mandatory_segments_cannot_be_disabled() {
        let mut defaults = TimerDefaults::default();

        assert!(!defaults.set_enabled(SegmentName::Meditatio, false));
        assert!(!defaults.set_enabled(SegmentName::Oratio, false));
        assert!(defaults.set_enabled(SegmentName::Lectio, false));

        let names: Vec<_> = defaults.enabled_segments().iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            [SegmentName::Meditatio, SegmentName::Oratio, SegmentName::Contemplatio]
        );
    }

    #[test]
    fn file_store_round_trips_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut defaults = TimerDefaults::default();
        defaults.set_duration(SegmentName::Meditatio, minutes(20));
        defaults.set_enabled(SegmentName::Contemplatio, false);

        let mut store = FileStore::open(&path);
        save_defaults(&mut store, &defaults).unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(load_defaults(&reopened).unwrap(), defaults);
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("storage.json"));

        store.set("theme", "dark").unwrap();
        save_defaults(&mut store, &TimerDefaults::default()).unwrap();

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert!(store.get(DEFAULTS_KEY).unwrap().is_some());
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("absent.json"));

        assert_eq!(load_defaults(&store).unwrap(), TimerDefaults::default());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let store = FileStore::open(&path);
        assert!(matches!(store.get(DEFAULTS_KEY), Err(StoreError::Corrupt(..))));
    }
}
