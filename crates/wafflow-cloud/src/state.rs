//! State documents for declared resources
//!
//! Manages the `.wafflow/state.json` file which holds the declared state of
//! every resource the CLI manages, keyed by resource address.

use crate::error::{CloudError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".wafflow";
const STATE_FILE: &str = "state.json";

/// State document containing all declared resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDocument {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Declared state indexed by resource address (`type.label`)
    pub resources: BTreeMap<String, serde_json::Value>,
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

impl StateDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a resource's declared state as a specific type
    pub fn get_resource<T: DeserializeOwned>(&self, address: &str) -> Result<Option<T>> {
        self.resources
            .get(address)
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(CloudError::from)
    }

    /// Add or update a resource
    pub fn set_resource<T: Serialize>(&mut self, address: impl Into<String>, state: &T) -> Result<()> {
        self.resources
            .insert(address.into(), serde_json::to_value(state)?);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove a resource
    pub fn remove_resource(&mut self, address: &str) -> Option<serde_json::Value> {
        let result = self.resources.remove(address);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }
}

/// State manager for reading/writing state files
pub struct StateManager {
    state_path: PathBuf,
}

impl StateManager {
    /// State file under `<project_root>/.wafflow/`
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self::at(project_root.as_ref().join(STATE_DIR).join(STATE_FILE))
    }

    /// State file at an explicit path
    pub fn at(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Get the backup file path
    fn backup_path(&self) -> PathBuf {
        let mut name = self.state_path.as_os_str().to_owned();
        name.push(".backup");
        PathBuf::from(name)
    }

    /// Ensure the state directory exists
    async fn ensure_state_dir(&self) -> Result<()> {
        if let Some(dir) = self.state_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).await?;
                tracing::debug!("Created state directory: {}", dir.display());
            }
        }
        Ok(())
    }

    /// Load the current state
    pub async fn load(&self) -> Result<StateDocument> {
        let path = &self.state_path;
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(StateDocument::new());
        }

        let content = fs::read_to_string(path).await?;
        let state: StateDocument = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} resources", state.resources.len());
        Ok(state)
    }

    /// Save the state, keeping the previous file as a backup
    pub async fn save(&self, state: &StateDocument) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = &self.state_path;
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(path, content).await?;

        tracing::debug!("Saved state with {} resources", state.resources.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: String,
        name: String,
    }

    #[tokio::test]
    async fn test_state_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = StateDocument::new();
        state
            .set_resource(
                "aws_wafv2_regex_pattern_set.default",
                &Sample {
                    id: "abc123".to_string(),
                    name: "my-set".to_string(),
                },
            )
            .unwrap();

        manager.save(&state).await.unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.resources.len(), 1);
        let sample: Sample = loaded
            .get_resource("aws_wafv2_regex_pattern_set.default")
            .unwrap()
            .unwrap();
        assert_eq!(sample.id, "abc123");
        assert!(
            loaded
                .get_resource::<Sample>("aws_wafv2_regex_pattern_set.other")
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_empty_state() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = manager.load().await.unwrap();
        assert!(state.resources.is_empty());
    }

    #[tokio::test]
    async fn test_save_keeps_backup() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("state.json");
        let manager = StateManager::at(&path);

        let mut state = StateDocument::new();
        manager.save(&state).await.unwrap();

        state.set_resource("a.b", &serde_json::json!({"x": 1})).unwrap();
        manager.save(&state).await.unwrap();

        let backup = temp_dir.path().join("nested").join("state.json.backup");
        assert!(backup.exists());
        let previous: StateDocument =
            serde_json::from_str(&std::fs::read_to_string(backup).unwrap()).unwrap();
        assert!(previous.resources.is_empty());
    }

    #[tokio::test]
    async fn test_newer_version_rejected() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"version": 99, "updated_at": "2026-01-01T00:00:00Z", "resources": {}}"#,
        )
        .unwrap();

        let result = StateManager::at(&path).load().await;
        assert!(matches!(result, Err(CloudError::StateError(_))));
    }

    #[test]
    fn test_remove_resource() {
        let mut state = StateDocument::new();
        state.set_resource("a.b", &serde_json::json!({})).unwrap();
        assert!(state.remove_resource("a.b").is_some());
        assert!(state.remove_resource("a.b").is_none());
    }
}
