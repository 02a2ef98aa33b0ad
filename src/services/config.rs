//! Saved driver profiles
//!
//! Profiles live in `~/.equipment/config.json`. The file is written
//! atomically (temp file + rename) under an exclusive lock so several
//! terminals can share it.

use crate::drivers::{open_driver, DriverKind, EcrDriver};
use crate::types::{EquipmentError, Result};
use directories::BaseDirs;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// A named driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub kind: DriverKind,
    /// Driver settings exactly as the driver packs them
    pub settings: serde_json::Value,
}

impl Profile {
    pub fn open(&self) -> Result<Box<dyn EcrDriver>> {
        open_driver(self.kind, &self.settings.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
    #[serde(default)]
    pub updated_at: i64,
}

impl Config {
    /// Profile by name, or the default one when `name` is None
    pub fn profile(&self, name: Option<&str>) -> Result<&Profile> {
        let name = name
            .or(self.default_profile.as_deref())
            .ok_or_else(|| EquipmentError::Config("no profile selected and no default".into()))?;
        self.profiles
            .get(name)
            .ok_or_else(|| EquipmentError::Config(format!("unknown profile '{}'", name)))
    }

    /// Add or replace a profile; the first one becomes the default
    pub fn set_profile(&mut self, name: &str, profile: Profile) {
        self.profiles.insert(name.to_string(), profile);
        if self.default_profile.is_none() {
            self.default_profile = Some(name.to_string());
        }
    }
}

pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| EquipmentError::Config("Cannot determine home directory".into()))?;
        let path = base_dirs.home_dir().join(".equipment").join("config.json");
        Ok(Self { path })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file means an empty config; a corrupt one is an error
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()
            .map_err(|e| EquipmentError::Config(format!("Failed to acquire read lock: {}", e)))?;

        let mut content = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut content);
        let _ = file.unlock();
        read?;

        serde_json::from_str(&content).map_err(|e| {
            EquipmentError::Config(format!("Corrupted config {}: {}", self.path.display(), e))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut config = config.clone();
        config.updated_at = chrono::Utc::now().timestamp();
        let content = serde_json::to_string_pretty(&config)?;

        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        let target = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        target
            .lock_exclusive()
            .map_err(|e| EquipmentError::Config(format!("Failed to acquire write lock: {}", e)))?;

        let renamed = fs::rename(&temp_path, &self.path);
        let _ = target.unlock();
        renamed?;
        Ok(())
    }

    /// Load, apply `change`, save
    pub fn update(&self, change: impl FnOnce(&mut Config)) -> Result<Config> {
        let mut config = self.load()?;
        change(&mut config);
        self.save(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_service() -> (ConfigService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("nested").join("config.json"));
        (service, temp_dir)
    }

    fn posiflex_profile() -> Profile {
        Profile {
            kind: DriverKind::Posiflex,
            settings: serde_json::json!({"host": "10.0.0.7", "port": 9100}),
        }
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let (service, _temp) = create_test_service();
        let config = service.load().unwrap();
        assert!(config.profiles.is_empty());
        assert!(config.default_profile.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let (service, _temp) = create_test_service();
        let mut config = Config::default();
        config.set_profile("kitchen", posiflex_profile());
        service.save(&config).unwrap();

        let loaded = service.load().unwrap();
        assert_eq!(loaded.profiles["kitchen"], posiflex_profile());
        assert_eq!(loaded.default_profile.as_deref(), Some("kitchen"));
        assert!(loaded.updated_at > 0);
        assert!(!service.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let (service, _temp) = create_test_service();
        fs::create_dir_all(service.path().parent().unwrap()).unwrap();
        fs::write(service.path(), "{not json").unwrap();
        assert!(matches!(service.load(), Err(EquipmentError::Config(_))));
    }

    #[test]
    fn test_first_profile_becomes_default() {
        let mut config = Config::default();
        config.set_profile("a", posiflex_profile());
        config.set_profile("b", posiflex_profile());
        assert_eq!(config.default_profile.as_deref(), Some("a"));
        assert!(config.profile(None).is_ok());
        assert!(config.profile(Some("b")).is_ok());
    }

    #[test]
    fn test_unknown_profile() {
        let config = Config::default();
        assert!(matches!(config.profile(None), Err(EquipmentError::Config(_))));
        assert!(matches!(
            config.profile(Some("x")),
            Err(EquipmentError::Config(_))
        ));
    }

    #[test]
    fn test_update_persists() {
        let (service, _temp) = create_test_service();
        service
            .update(|c| c.set_profile("bar", posiflex_profile()))
            .unwrap();
        let driver = service.load().unwrap().profile(Some("bar")).unwrap().open().unwrap();
        assert_eq!(driver.name(), "posiflex");
    }
}
