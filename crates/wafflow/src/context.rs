use anyhow::Context as _;
use std::path::{Path, PathBuf};
use wafflow_cloud::StateManager;
use wafflow_cloud_aws::{
    ClientOptions, RESOURCE_TYPE, RegexPatternSetResource, Timeouts, Wafv2Client,
};
use wafflow_config::Settings;

/// Settings and state location for one CLI invocation
pub struct Context {
    settings: Settings,
    state: StateManager,
    address: String,
}

impl Context {
    pub fn load(state_override: Option<PathBuf>, label: &str) -> anyhow::Result<Self> {
        let (settings, settings_path) =
            wafflow_config::load_or_default().context("failed to load settings")?;

        let current_dir = std::env::current_dir()?;
        let base = settings_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| current_dir.clone());

        let state = match state_override.or_else(|| settings.resolve_state_path(&base)) {
            Some(path) => StateManager::at(path),
            None => StateManager::new(&current_dir),
        };

        if let Some(path) = &settings_path {
            tracing::debug!(settings = %path.display(), "Using settings file");
        }
        tracing::debug!(state = %state.state_path().display(), "Using state document");

        Ok(Self {
            settings,
            state,
            address: address_for(label),
        })
    }

    pub fn state_manager(&self) -> &StateManager {
        &self.state
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn timeouts(&self) -> Timeouts {
        let t = &self.settings.timeouts;
        Timeouts {
            create: t.create(),
            update: t.update(),
            delete: t.delete(),
        }
    }

    /// Build the regex pattern set resource against AWS
    pub async fn connect(&self) -> RegexPatternSetResource<Wafv2Client> {
        let options = ClientOptions {
            region: self.settings.region.clone(),
            profile: self.settings.profile.clone(),
            endpoint_url: self.settings.endpoint_url.clone(),
        };
        let client = Wafv2Client::connect(&options).await;

        RegexPatternSetResource::new(client).with_timeouts(self.timeouts())
    }
}

/// State document address for a resource label
pub fn address_for(label: &str) -> String {
    format!("{}.{}", RESOURCE_TYPE, label)
}
