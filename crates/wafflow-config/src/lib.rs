pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a settings file directly
pub const CONFIG_PATH_ENV: &str = "WAFFLOW_CONFIG_PATH";

/// Default per-operation timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15 * 60;

const CANDIDATES: [&str; 2] = ["wafflow.local.yaml", "wafflow.yaml"];

/// Contents of `wafflow.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Region for REGIONAL entities; falls back to the AWS default chain
    pub region: Option<String>,

    /// Named AWS profile
    pub profile: Option<String>,

    /// Endpoint override, e.g. a local emulator
    pub endpoint_url: Option<String>,

    pub timeouts: TimeoutSettings,

    /// State document location, relative to the settings file
    pub state_path: Option<PathBuf>,
}

/// Retry budgets in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutSettings {
    pub create: u64,
    pub update: u64,
    pub delete: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            create: DEFAULT_TIMEOUT_SECS,
            update: DEFAULT_TIMEOUT_SECS,
            delete: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl TimeoutSettings {
    pub fn create(&self) -> Duration {
        Duration::from_secs(self.create)
    }

    pub fn update(&self) -> Duration {
        Duration::from_secs(self.update)
    }

    pub fn delete(&self) -> Duration {
        Duration::from_secs(self.delete)
    }
}

impl Settings {
    /// Parse settings from YAML text
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        // An empty file is valid and means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Settings =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        for (field, secs) in [
            ("timeouts.create", self.timeouts.create),
            ("timeouts.update", self.timeouts.update),
            ("timeouts.delete", self.timeouts.delete),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if let Some(region) = &self.region {
            if region.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "region",
                    reason: "must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// State document path, resolved against `base` when relative
    pub fn resolve_state_path(&self, base: &Path) -> Option<PathBuf> {
        self.state_path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                base.join(p)
            }
        })
    }
}

/// wafflow's global config directory (~/.config/wafflow)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("wafflow"))
}

/// Locate the settings file
///
/// Search order:
/// 1. `WAFFLOW_CONFIG_PATH`
/// 2. current directory: wafflow.local.yaml, wafflow.yaml
/// 3. ./.wafflow/ with the same names
/// 4. ~/.config/wafflow/wafflow.yaml
pub fn find_settings_file() -> Result<PathBuf> {
    if let Some(config_path) = std::env::var_os(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::EnvPathMissing(path));
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let project_dir = current_dir.join(".wafflow");
    if project_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global = config_dir.join("wafflow.yaml");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::SettingsFileNotFound)
}

/// Read and parse a settings file
pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let settings = Settings::from_yaml(&content, path)?;
    tracing::debug!(path = %path.display(), "Loaded settings");
    Ok(settings)
}

/// Discover and load settings, falling back to defaults when no file exists
///
/// Returns the file the settings came from, if any.
pub fn load_or_default() -> Result<(Settings, Option<PathBuf>)> {
    match find_settings_file() {
        Ok(path) => Ok((load_settings(&path)?, Some(path))),
        Err(ConfigError::SettingsFileNotFound) => {
            tracing::debug!("No settings file found, using defaults");
            Ok((Settings::default(), None))
        }
        Err(e) => Err(e),
    }
}
