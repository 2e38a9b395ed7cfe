//! Persisted preference flags.
//!
//! A flat string key/value store written as a JSON object. Only two keys are
//! used; values are the strings `"true"` / `"false"` and anything else reads
//! as false.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::PrefsError;

/// Frame-rendering mode (embeds wrapped by the x-frame proxy element).
pub const XFRAME_KEY: &str = "xframe";
/// Reduced visual effects.
pub const OPTIMIZED_KEY: &str = "optimized";

#[derive(Debug, Clone, Default)]
pub struct PrefStore {
    /// `None` keeps the store in memory only.
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl PrefStore {
    /// Load from `path`. A missing or unreadable file yields an empty store
    /// that will still write to `path` on the next `set`.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read_file(&path) {
            Ok(values) => values,
            Err(PrefsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("prefs: ignoring {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            values,
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_flag(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    /// In memory only; call [`PrefStore::save`] to persist.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn set_flag(&mut self, key: &str, value: bool) {
        self.set(key, value.to_string())
    }

    /// Write every value to the backing file. No-op for in-memory stores.
    pub async fn save(&self) -> Result<(), PrefsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    fn read_file(path: &Path) -> Result<BTreeMap<String, String>, PrefsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flags_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let mut store = PrefStore::load(&path);
        assert!(!store.get_flag(XFRAME_KEY));
        store.set_flag(XFRAME_KEY, true);
        assert!(store.get_flag(XFRAME_KEY));
        assert!(!PrefStore::load(&path).get_flag(XFRAME_KEY));

        store.save().await.unwrap();

        let reloaded = PrefStore::load(&path);
        assert!(reloaded.get_flag(XFRAME_KEY));
        assert!(!reloaded.get_flag(OPTIMIZED_KEY));
    }

    #[test]
    fn test_non_boolean_values_read_false() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"xframe":"yes","optimized":"true"}"#).unwrap();
        let store = PrefStore::load(&path);
        assert!(!store.get_flag(XFRAME_KEY));
        assert!(store.get_flag(OPTIMIZED_KEY));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();
        let store = PrefStore::load(&path);
        assert_eq!(store.get(XFRAME_KEY), None);
    }
}
