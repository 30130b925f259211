use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;

use crate::models::ConfigData;
use crate::save::CategoryConfig;
use crate::utils::http::DEFAULT_TIMEOUT;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Settings loaded from `config.yaml`
///
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Remote backend for every save cycle: local, r2, gist, webdav or s3
    pub save_method: String,
    pub output_dir: String,
    /// Directory holding `countries.json`
    pub config_dir: String,

    // Rule template
    pub rule_url: String,
    pub github_proxy: String,
    pub download_timeout: u64,
    pub rule_template: bool,

    // Outputs
    pub v2ray_subscription: bool,
    pub media_check: bool,
    pub platforms: Vec<String>,
    pub categories: Vec<CategoryConfig>,

    // R2 (through a worker)
    pub worker_url: String,
    pub worker_token: String,

    // Gist
    pub github_token: String,
    pub github_gist_id: String,
    pub github_api_mirror: String,

    // WebDAV
    pub webdav_url: String,
    pub webdav_username: String,
    pub webdav_password: String,

    // S3 compatible object storage
    pub s3_endpoint: String,
    pub s3_access_id: String,
    pub s3_secret_key: String,
    pub s3_bucket: String,
    pub s3_use_ssl: bool,
    pub s3_bucket_lookup: String,
    pub s3_region: String,
}

pub fn default_save_method() -> String {
    "local".to_string()
}

pub fn default_output_dir() -> String {
    "output".to_string()
}

pub fn default_config_dir() -> String {
    "config".to_string()
}

pub fn default_s3_region() -> String {
    "us-east-1".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            save_method: default_save_method(),
            output_dir: default_output_dir(),
            config_dir: default_config_dir(),
            rule_url: String::new(),
            github_proxy: String::new(),
            download_timeout: DEFAULT_TIMEOUT,
            rule_template: true,
            v2ray_subscription: true,
            media_check: false,
            platforms: Vec::new(),
            categories: Vec::new(),
            worker_url: String::new(),
            worker_token: String::new(),
            github_token: String::new(),
            github_gist_id: String::new(),
            github_api_mirror: String::new(),
            webdav_url: String::new(),
            webdav_username: String::new(),
            webdav_password: String::new(),
            s3_endpoint: String::new(),
            s3_access_id: String::new(),
            s3_secret_key: String::new(),
            s3_bucket: String::new(),
            s3_use_ssl: true,
            s3_bucket_lookup: "auto".to_string(),
            s3_region: default_s3_region(),
        }
    }
}

impl Settings {
    /// Create a new settings instance with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current() -> Arc<Settings> {
        match GLOBAL.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn load_from_content(content: &str) -> Result<Self, SettingsError> {
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_content(&content)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }

    pub fn countries_path(&self) -> PathBuf {
        Path::new(&self.config_dir).join("countries.json")
    }

    /// Template inputs for the media group block
    pub fn config_data(&self) -> ConfigData {
        ConfigData {
            media_check: self.media_check,
            platforms: self.platforms.clone(),
        }
    }
}

// Global settings instance
pub static GLOBAL: Lazy<RwLock<Arc<Settings>>> =
    Lazy::new(|| RwLock::new(Arc::new(Settings::new())));

/// Replace the global settings with the content of `path`
pub fn update_settings_from_file(path: impl AsRef<Path>) -> Result<(), SettingsError> {
    let settings = Settings::load_from_file(path)?;
    replace_settings(settings);
    Ok(())
}

pub fn update_settings_from_content(content: &str) -> Result<(), SettingsError> {
    let settings = Settings::load_from_content(content)?;
    replace_settings(settings);
    Ok(())
}

fn replace_settings(settings: Settings) {
    match GLOBAL.write() {
        Ok(mut guard) => *guard = Arc::new(settings),
        Err(poisoned) => *poisoned.into_inner() = Arc::new(settings),
    }
}
