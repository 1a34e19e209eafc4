use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::settings::error::Result;
use crate::settings::types::PipelineConfig;

/// Pipeline configuration backed by a JSON file.
pub struct SettingsStore {
    path: PathBuf,
    data: Mutex<PipelineConfig>,
}

impl SettingsStore {
    /// Open the store at `path`, writing defaults there if no file exists yet.
    pub fn load_or_init(path: PathBuf) -> Result<Self> {
        let exists = path.exists();
        let data = Self::load(&path)?;
        let store = Self {
            path,
            data: Mutex::new(data),
        };
        if !exists {
            tracing::info!("writing default settings to {}", store.path.display());
            store.save()?;
        }
        Ok(store)
    }

    /// Load settings from a JSON file, returning default on missing file.
    pub fn load(path: &Path) -> Result<PipelineConfig> {
        if !path.exists() {
            return Ok(PipelineConfig::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save current settings to disk atomically (write .tmp then rename).
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().clone();
        let json = serde_json::to_string_pretty(&data)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> PipelineConfig {
        self.data.lock().clone()
    }

    /// Modify the in-memory config. Call [`save`](Self::save) to persist.
    pub fn update(&self, f: impl FnOnce(&mut PipelineConfig)) {
        f(&mut self.data.lock());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Helper: create a store backed by a temp directory.
    fn temp_store() -> (SettingsStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gazecast.json");
        let store = SettingsStore::load_or_init(path).unwrap();
        (store, dir)
    }

    #[test]
    fn load_returns_default_when_file_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nonexistent.json");
        let result = SettingsStore::load(&path).unwrap();
        assert_eq!(result, PipelineConfig::default());
    }

    #[test]
    fn load_parses_valid_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gazecast.json");
        let json = r#"{"capture_width":640,"capture_height":480,"transport_addr":"10.0.0.2:9000"}"#;
        std::fs::write(&path, json).unwrap();

        let result = SettingsStore::load(&path).unwrap();
        assert_eq!(result.capture_width, 640);
        assert_eq!(result.capture_height, 480);
        assert_eq!(result.transport_addr.as_deref(), Some("10.0.0.2:9000"));
    }

    #[test]
    fn load_returns_error_for_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gazecast.json");
        std::fs::write(&path, "not valid json!!!").unwrap();

        let result = SettingsStore::load(&path);
        assert!(matches!(result, Err(crate::settings::error::SettingsError::Json(_))));
    }

    #[test]
    fn load_or_init_writes_defaults_when_missing() {
        let (store, dir) = temp_store();
        let path = dir.path().join("gazecast.json");
        assert!(path.exists());
        assert_eq!(SettingsStore::load(&path).unwrap(), PipelineConfig::default());
        assert_eq!(store.config(), PipelineConfig::default());
    }

    #[test]
    fn load_or_init_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gazecast.json");
        std::fs::write(&path, r#"{"gaze_interval_ms":75}"#).unwrap();

        let store = SettingsStore::load_or_init(path.clone()).unwrap();
        assert_eq!(store.config().gaze_interval_ms, 75);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, r#"{"gaze_interval_ms":75}"#);
    }

    #[test]
    fn load_or_init_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gazecast.json");
        std::fs::write(&path, "{").unwrap();
        assert!(SettingsStore::load_or_init(path).is_err());
    }

    #[test]
    fn save_round_trips_through_load() {
        let (store, dir) = temp_store();
        store.update(|config| {
            config.capture_interval_ms = None;
            config.transport_addr = Some("peer:7000".to_string());
        });
        store.save().unwrap();

        let loaded = SettingsStore::load(&dir.path().join("gazecast.json")).unwrap();
        assert_eq!(loaded.capture_interval_ms, None);
        assert_eq!(loaded.transport_addr.as_deref(), Some("peer:7000"));
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("gazecast.json");
        let store = SettingsStore::load_or_init(path.clone()).unwrap();
        store.save().unwrap();

        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn save_is_atomic() {
        let (store, dir) = temp_store();
        store.update(|config| config.capture_width = 1920);
        store.save().unwrap();

        // After a successful save, no .tmp file should remain
        let tmp_path = dir.path().join("gazecast.json.tmp");
        assert!(
            !tmp_path.exists(),
            ".tmp file should be cleaned up after rename"
        );
    }

    #[test]
    fn update_is_not_persisted_until_save() {
        let (store, dir) = temp_store();
        store.update(|config| config.capture_width = 320);
        let on_disk = SettingsStore::load(&dir.path().join("gazecast.json")).unwrap();
        assert_eq!(on_disk.capture_width, 1280);
        assert_eq!(store.config().capture_width, 320);
    }
}
