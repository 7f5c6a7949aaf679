use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{UploadError, UploadResult};

/// Default capacity for a single image list.
pub const DEFAULT_MAX_IMAGES: usize = 10;

/// Settings for one upload widget instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Object-storage container (bucket) the widget uploads into.
    pub container: String,
    /// Display label, cosmetic only.
    pub label: String,
    /// Hard cap on the image list length.
    pub max_images: usize,
}

impl UploaderConfig {
    pub fn new(container: &str, label: &str) -> Self {
        Self {
            container: container.to_string(),
            label: label.to_string(),
            max_images: DEFAULT_MAX_IMAGES,
        }
    }

    pub fn with_max_images(mut self, max_images: usize) -> Self {
        self.max_images = max_images;
        self
    }
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self::new("gallery", "Images")
    }
}

/// Connection settings for the HTTP object-store client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: 120,
        }
    }
}

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub uploader: UploaderConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> UploadResult<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str).unwrap_or_else(|e| {
            log::warn!("Failed to parse config file: {}. Using defaults.", e);
            Config::default()
        });

        // Validate config before returning
        validate_config(&config)?;

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> UploadResult<()> {
        validate_config(self)?;
        let config_str = serde_json::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        log::info!("Configuration saved successfully");
        Ok(())
    }
}

pub fn validate_config(config: &Config) -> UploadResult<()> {
    validate_uploader_config(&config.uploader)?;

    if config.storage.timeout_secs == 0 {
        return Err(UploadError::validation(
            "timeout_secs",
            "Must be greater than 0",
        ));
    }

    Ok(())
}

pub fn validate_uploader_config(config: &UploaderConfig) -> UploadResult<()> {
    if config.max_images == 0 {
        return Err(UploadError::validation("max_images", "Must be at least 1"));
    }

    if config.container.trim().is_empty() {
        return Err(UploadError::validation(
            "container",
            "Container name cannot be empty",
        ));
    }

    Ok(())
}
