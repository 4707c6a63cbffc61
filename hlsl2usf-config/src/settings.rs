//! Converter settings.
//!
//! Settings live in `~/.config/hlsl2usf/settings.yaml` (XDG convention on every
//! platform except Windows, which uses the roaming config directory). A missing
//! file yields [`Settings::default`].

use crate::error::ConfigError;
use crate::types::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the conversion template shipped in the resources directory.
pub const DEFAULT_TEMPLATE_FILE: &str = "rt_output_conversion.usf";

/// Resources directory shipped with this crate.
pub const BUNDLED_RESOURCES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/resources");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the conversion template. `None` uses
    /// [`Settings::default_resources_dir`] when the template is installed
    /// there and [`BUNDLED_RESOURCES_DIR`] otherwise.
    pub resources_dir: Option<PathBuf>,

    /// Conversion template file name inside the resources directory.
    pub template_file: String,

    /// Log verbosity when neither `--log-level` nor `RUST_LOG` is given.
    pub log_level: LogLevel,

    /// Optional file that mirrors all log output.
    pub log_file: Option<PathBuf>,

    /// Extension for converted shader files written to disk.
    pub output_extension: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resources_dir: None,
            template_file: DEFAULT_TEMPLATE_FILE.to_string(),
            log_level: LogLevel::default(),
            log_file: None,
            output_extension: "usf".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default location, falling back to defaults when
    /// the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::settings_path())
    }

    /// Load settings from an explicit path, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("Settings file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        log::info!("Loading settings from {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml_ng::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml_ng::to_string(self)?;
        std::fs::write(path, yaml)?;
        log::info!("Saved settings to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.template_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "template_file must not be empty".to_string(),
            ));
        }
        if self.output_extension.trim().is_empty() || self.output_extension.contains('/') {
            return Err(ConfigError::Validation(format!(
                "output_extension '{}' is not a valid file extension",
                self.output_extension
            )));
        }
        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("hlsl2usf")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("hlsl2usf")
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Get the settings file path
    pub fn settings_path() -> PathBuf {
        Self::config_dir().join("settings.yaml")
    }

    /// Per-user install location of the resources directory.
    pub fn default_resources_dir() -> PathBuf {
        match dirs::data_dir() {
            Some(data_dir) => data_dir.join("hlsl2usf").join("resources"),
            None => PathBuf::from("resources"),
        }
    }

    /// Effective resources directory.
    pub fn resources_dir(&self) -> PathBuf {
        if let Some(dir) = &self.resources_dir {
            return dir.clone();
        }
        let installed = Self::default_resources_dir();
        if installed.join(&self.template_file).is_file() {
            installed
        } else {
            log::debug!(
                "No template installed in {:?}, using bundled resources",
                installed
            );
            PathBuf::from(BUNDLED_RESOURCES_DIR)
        }
    }

    /// Full path of the conversion template.
    pub fn template_path(&self) -> PathBuf {
        self.resources_dir().join(&self.template_file)
    }
}
