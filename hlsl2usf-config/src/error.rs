//! Typed error variants for the hlsl2usf-config crate.
//!
//! Provides structured error types for settings and material metadata I/O.
//! Callers that work with `anyhow` get these automatically through the
//! blanket `From` impl for any `std::error::Error`.

use std::fmt;

/// Errors that can occur when loading settings or material metadata.
///
/// # Example
///
/// ```rust,no_run
/// use hlsl2usf_config::ConfigError;
///
/// fn check_load_err(e: &anyhow::Error) {
///     if let Some(cfg_err) = e.downcast_ref::<ConfigError>() {
///         match cfg_err {
///             ConfigError::Io(io) => eprintln!("I/O error: {io}"),
///             ConfigError::Json(p) => eprintln!("JSON parse error: {p}"),
///             ConfigError::Yaml(p) => eprintln!("YAML parse error: {p}"),
///             ConfigError::Validation(msg) => eprintln!("Validation: {msg}"),
///         }
///     }
/// }
/// ```
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred reading a settings or info file.
    Io(std::io::Error),

    /// A material info file contained invalid JSON.
    Json(serde_json::Error),

    /// The settings file contained invalid YAML.
    Yaml(serde_yaml_ng::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string describes which field is invalid and why.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error reading config: {e}"),
            ConfigError::Json(e) => write!(f, "JSON parse error in material info: {e}"),
            ConfigError::Yaml(e) => write!(f, "YAML parse error in settings: {e}"),
            ConfigError::Validation(msg) => write!(f, "Config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Yaml(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl From<serde_yaml_ng::Error> for ConfigError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        ConfigError::Yaml(e)
    }
}
