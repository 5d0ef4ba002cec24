use crate::domain::ConfigError;
use crate::infra::highlight::cache::DEFAULT_CACHE_CAPACITY;
use crate::infra::highlight::syntax::DEFAULT_THEME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Inputs larger than this (in bytes, both sides combined) are never highlighted.
pub const DEFAULT_HIGHLIGHT_LIMIT: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffViewConfig {
    pub highlight_limit: usize,
    pub theme: String,
    pub cache_capacity: usize,
}

impl Default for DiffViewConfig {
    fn default() -> Self {
        Self {
            highlight_limit: DEFAULT_HIGHLIGHT_LIMIT,
            theme: DEFAULT_THEME.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Loads the config from the default location, falling back to defaults
/// when the file is missing or unreadable.
pub fn load_config() -> DiffViewConfig {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> DiffViewConfig {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return DiffViewConfig::default();
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Ignoring invalid config at {}: {}", path.display(), err);
            DiffViewConfig::default()
        }
    }
}

pub fn save_config(config: &DiffViewConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_path())
}

pub fn save_config_to(config: &DiffViewConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("DIFFVIEW_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    config_dir().join("config.toml")
}

fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("diffview");
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("diffview");
        }
    }

    if let Some(home) = home::home_dir() {
        return home.join(".config").join("diffview");
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".diffview")
}
