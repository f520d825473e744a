use std::{
    env, fs,
    path::Path,
    time::Duration,
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tasklist_core::TaskFilter;
use url::Url;

use crate::sync::SyncOptions;

const CONFIG_DIR: &str = ".tasklist";
const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding `remote.base_url`.
pub const ENV_BASE_URL: &str = "TASKLIST_BASE_URL";
/// Environment variable overriding `server.bind`.
pub const ENV_BIND: &str = "TASKLIST_BIND";

/// Default remote store location.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Default listen address of the reference server.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Top-level configuration loaded from `.tasklist/config.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl ProjectConfig {
    /// Load configuration from `dir` and apply environment overrides.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let mut fetch = |key: &'static str| env::var(key).ok();
        Self::load_with_env(dir, &mut fetch)
    }

    fn load_with_env(
        dir: impl AsRef<Path>,
        fetch: &mut impl FnMut(&'static str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = Self::from_dir(dir)?;
        config.apply_env_with(fetch);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory without consulting the environment.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let config_path = dir.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_with(&mut self, fetch: &mut impl FnMut(&'static str) -> Option<String>) {
        if let Some(base_url) = env_value_with(ENV_BASE_URL, fetch) {
            self.remote.base_url = base_url;
        }
        if let Some(bind) = env_value_with(ENV_BIND, fetch) {
            self.server.bind = bind;
        }
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.remote.validate()
    }
}

fn env_value_with(
    key: &'static str,
    fetch: &mut impl FnMut(&'static str) -> Option<String>,
) -> Option<String> {
    fetch(key).and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}

/// `[remote]` block: where the task store lives.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout; unset keeps the HTTP client's defaults.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl RemoteConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("remote.base_url is not a valid URL: {}", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("remote.base_url must use http or https: {}", self.base_url);
        }
        if self.timeout_secs == Some(0) {
            bail!("remote.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

/// `[sync]` block: model behaviour.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    /// Filter used when none is given on the command line.
    #[serde(default)]
    pub default_filter: TaskFilter,
    /// Drop responses older than data already applied.
    #[serde(default = "default_true")]
    pub discard_stale: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_filter: TaskFilter::All,
            discard_stale: true,
        }
    }
}

impl SyncConfig {
    /// Options for [`TaskSync`](crate::TaskSync).
    pub const fn options(&self) -> SyncOptions {
        SyncOptions {
            discard_stale: self.discard_stale,
        }
    }
}

/// `[server]` block: reference store listener.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_bind() -> String {
    DEFAULT_BIND.to_owned()
}

const fn default_true() -> bool {
    true
}
