use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::network::{GITHUB_API_BASE, clamp_per_page};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub commits_per_page: u32,
    pub data_dir: Option<String>,
    pub default_username: Option<String>,
    pub remember_username: bool,
    pub log_filter: String,
}

impl Settings {
    /// Layers, lowest priority first: built-in defaults, the user's global
    /// config, `commitmark.toml` in the CWD, an explicit `--config` file, then
    /// `COMMITMARK_*` environment variables.
    pub fn new(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("api_base_url", GITHUB_API_BASE)?
            .set_default("commits_per_page", 30)?
            .set_default("remember_username", true)?
            .set_default("log_filter", "info")?;

        if let Some(user_config_path) = get_user_config_path() {
            builder = builder.add_source(File::from(user_config_path).required(false));
        }
        builder = builder.add_source(File::with_name("commitmark.toml").required(false));
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        let s = builder
            .add_source(Environment::with_prefix("COMMITMARK"))
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;
        settings.commits_per_page = clamp_per_page(settings.commits_per_page);
        Ok(settings)
    }

    /// Where favorites and the log file live. `~` and `$VARS` are expanded.
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        match &self.data_dir {
            Some(raw) => match shellexpand::full(raw) {
                Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
                Err(e) => {
                    tracing::warn!("Could not expand data_dir '{}': {}", raw, e);
                    None
                }
            },
            None => dirs::data_dir().map(|dir| dir.join("commitmark")),
        }
    }
}

pub fn get_user_config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".config");
    path.push("commitmark");
    path.push("commitmark.toml");
    Some(path)
}

/// Stores `username` as `default_username` in the user's global config,
/// keeping every other key in the file.
pub fn save_last_username(username: &str) -> Result<(), anyhow::Error> {
    let user_config_path = get_user_config_path().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?;
    save_username_to(&user_config_path, username)
}

pub fn save_username_to(path: &Path, username: &str) -> Result<(), anyhow::Error> {
    let config_str = fs::read_to_string(path).unwrap_or_default();
    let mut doc = config_str.parse::<toml::Table>()?;

    doc.insert("default_username".to_string(), toml::Value::String(username.to_string()));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, doc.to_string())?;

    Ok(())
}
