//! Save/load persistence of credits and ship upgrades
//!
//! Features:
//! - Versioned JSON document
//! - Atomic replace (tmp → save)
//! - Unreadable or missing saves fall back to a fresh profile

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::sim::Upgrades;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub credits: u64,
    #[serde(default)]
    pub upgrades: Upgrades,
}

fn default_version() -> u32 {
    SAVE_VERSION
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            credits: 0,
            upgrades: Upgrades::default(),
        }
    }
}

#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    Format(serde_json::Error),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Io(e) => write!(f, "save i/o failed: {e}"),
            PersistError::Format(e) => write!(f, "save format invalid: {e}"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io(e) => Some(e),
            PersistError::Format(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        PersistError::Io(e)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        PersistError::Format(e)
    }
}

/// Where the profile lives. Failures never reach the caller.
pub trait SaveStore {
    /// Stored profile, or defaults if there is none or it can't be read
    fn load(&self) -> SaveData;
    /// Persist the profile; failures are logged and swallowed
    fn save(&mut self, data: &SaveData);
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn read(&self) -> Result<SaveData, PersistError> {
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn write(&self, data: &SaveData) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SaveStore for JsonFileStore {
    fn load(&self) -> SaveData {
        match self.read() {
            Ok(data) => {
                log::info!(
                    "Loaded save from {} ({} credits)",
                    self.path.display(),
                    data.credits
                );
                data
            }
            Err(e) => {
                log::debug!("Using fresh save ({e})");
                SaveData::default()
            }
        }
    }

    fn save(&mut self, data: &SaveData) {
        match self.write(data) {
            Ok(()) => log::info!("Saved to {}", self.path.display()),
            Err(e) => log::warn!("Could not save to {}: {e}", self.path.display()),
        }
    }
}

/// In-memory store. Clones share the same slot, so a test can keep a handle
/// and inspect what the game saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<SaveData>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: SaveData) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(data))),
        }
    }

    /// Last saved profile, if any
    pub fn snapshot(&self) -> Option<SaveData> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl SaveStore for MemoryStore {
    fn load(&self) -> SaveData {
        self.snapshot().unwrap_or_default()
    }

    fn save(&mut self, data: &SaveData) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(data.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nova-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_file_round_trip() {
        let dir = temp_dir("roundtrip");
        let path = dir.join("save_2d.json");
        let mut store = JsonFileStore::new(&path);
        let data = SaveData {
            credits: 250,
            upgrades: Upgrades {
                speed: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        store.save(&data);
        assert!(!store.tmp_path().exists());
        assert_eq!(JsonFileStore::new(&path).load(), data);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_fresh_profile() {
        let store = JsonFileStore::new("/nonexistent/nova-strike/save_2d.json");
        assert_eq!(store.load(), SaveData::default());
    }

    #[test]
    fn test_corrupt_file_is_fresh_profile() {
        let dir = temp_dir("corrupt");
        let path = dir.join("save_2d.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(JsonFileStore::new(&path).load(), SaveData::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_upgrades_default() {
        let data: SaveData = serde_json::from_str(r#"{"credits": 40}"#).unwrap();
        assert_eq!(data.credits, 40);
        assert_eq!(data.upgrades, Upgrades::default());
        assert_eq!(data.version, SAVE_VERSION);
    }

    #[test]
    fn test_unwritable_path_is_swallowed() {
        let mut store = JsonFileStore::new("/nonexistent/nova-strike/save_2d.json");
        store.save(&SaveData::default());
    }

    #[test]
    fn test_memory_store_shared_handle() {
        let handle = MemoryStore::new();
        let mut store = handle.clone();
        assert_eq!(store.load(), SaveData::default());
        store.save(&SaveData {
            credits: 7,
            ..Default::default()
        });
        assert_eq!(handle.snapshot().map(|d| d.credits), Some(7));
    }
}
