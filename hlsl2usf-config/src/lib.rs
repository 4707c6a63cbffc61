//! Configuration system for the hlsl2usf shader converter.
//!
//! This crate provides configuration loading and default values for the
//! converter. It includes:
//!
//! - Converter settings (template location, log level, output naming)
//! - Material metadata exported next to the source shaders (`*_info.cfg`)
//! - Constant buffer sample data used to fill static buffer declarations

pub mod asset_info;
mod error;
pub mod material;
pub mod settings;
mod types;

// Re-export main types for convenience
pub use asset_info::{AssetInfo, INFO_FILE_SUFFIX, find_info_files};
pub use error::ConfigError;
pub use material::{ConstantBufferSamples, MaterialInfo, StageInfo, TextureInfo, Vec4Sample};
pub use settings::{BUNDLED_RESOURCES_DIR, Settings};
pub use types::LogLevel;
