//! Configuration loading and store construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cardbox_core::scheduler::SchedulerConfig;
use cardbox_core::selector::SelectorConfig;
use cardbox_core::traits::CardStore;

use crate::json::JsonFileStore;
use crate::memory::MemoryStore;

/// File name searched for in the working directory.
pub const CONFIG_FILE_NAME: &str = "cardbox.toml";

/// Overrides `data_dir` when set.
pub const DATA_DIR_ENV: &str = "CARDBOX_DATA_DIR";

/// Which [`CardStore`] implementation to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Json,
    /// Nothing survives the process.
    Memory,
}

/// Top-level cardbox configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardboxConfig {
    /// Where the JSON backend keeps its files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub selector: SelectorConfig,
}

fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(".local").join("share").join("cardbox"))
        .unwrap_or_else(|_| PathBuf::from("./cardbox-data"))
}

impl Default for CardboxConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: Backend::default(),
            scheduler: SchedulerConfig::default(),
            selector: SelectorConfig::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to the empty string.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `cardbox.toml` in the current directory
/// 2. `~/.config/cardbox/config.toml`
///
/// `CARDBOX_DATA_DIR` overrides `data_dir` from any source.
pub fn load_config() -> Result<CardboxConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CardboxConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() {
                Some(local)
            } else {
                global_config_path().filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CardboxConfig::default(),
    };

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }

    let source = config_path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    tracing::debug!(
        %source,
        data_dir = %config.data_dir.display(),
        backend = ?config.backend,
        "loaded config"
    );
    Ok(config)
}

/// Parse TOML text, resolving `${VAR}` references in `data_dir`.
pub fn parse_config(content: &str) -> Result<CardboxConfig> {
    let mut config: CardboxConfig = toml::from_str(content)?;
    let raw = config.data_dir.to_string_lossy().into_owned();
    if raw.contains("${") {
        config.data_dir = PathBuf::from(resolve_env_vars(&raw));
    }
    Ok(config)
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("cardbox")
            .join("config.toml")
    })
}

/// Starter config written by `cardbox init`.
pub fn sample_config() -> String {
    r#"# cardbox configuration

# Where card lists are stored. ${VAR} references are expanded.
data_dir = "./cardbox-data"

# "json" (files under data_dir) or "memory" (nothing is persisted)
backend = "json"

[scheduler]
first_success_interval = 6
penalty_min_minutes = 60
penalty_max_minutes = 180
short_reshow_probability = 0.33

[selector]
difficult_capacity = 10
difficult_threshold = 2.0
"#
    .to_string()
}

/// Create the configured store.
pub fn open_store(config: &CardboxConfig) -> Result<Arc<dyn CardStore>> {
    let store: Arc<dyn CardStore> = match config.backend {
        Backend::Json => {
            if config.data_dir.as_os_str().is_empty() {
                anyhow::bail!("data_dir must not be empty for the json backend");
            }
            Arc::new(JsonFileStore::new(&config.data_dir))
        }
        Backend::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::debug!(backend = store.name(), "opened store");
    Ok(store)
}
