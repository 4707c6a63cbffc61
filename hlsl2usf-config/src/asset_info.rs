//! Exporter asset info files (`*_info.cfg`).
//!
//! Each exported asset directory carries one JSON info file describing the
//! mesh, its materials and their per-stage metadata. Shaders live next to it
//! under `Shaders/` and textures under `Textures/`.

use crate::error::ConfigError;
use crate::material::MaterialInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name suffix shared by every exporter info file.
pub const INFO_FILE_SUFFIX: &str = "_info.cfg";

/// Parsed contents of an exporter info file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetInfo {
    #[serde(rename = "MeshName", default)]
    pub mesh_name: String,
    /// Materials keyed by material hash.
    #[serde(rename = "Materials", default)]
    pub materials: BTreeMap<String, MaterialInfo>,
    /// Mesh part table; not interpreted by the converter.
    #[serde(rename = "Parts", default)]
    pub parts: serde_json::Value,
    /// Placed instances; empty for static assets.
    #[serde(rename = "Instances", default)]
    pub instances: serde_json::Map<String, serde_json::Value>,
}

impl AssetInfo {
    /// Load and parse an info file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            log::error!("Failed to load config file {:?}: {}", path, e);
            ConfigError::Io(e)
        })?;
        let info: AssetInfo = serde_json::from_str(&contents).map_err(|e| {
            log::error!("Unable to parse config json in {:?}: {}", path, e);
            ConfigError::Json(e)
        })?;
        log::debug!(
            "Loaded {:?}: mesh '{}', {} material(s)",
            path,
            info.mesh_name,
            info.materials.len()
        );
        Ok(info)
    }

    /// Static assets have no placed instances.
    pub fn is_static(&self) -> bool {
        self.instances.is_empty()
    }

    /// Path of a material's pixel shader source, relative to the directory
    /// holding the info file.
    pub fn pixel_shader_path(asset_dir: &Path, material_hash: &str) -> PathBuf {
        asset_dir
            .join("Shaders")
            .join(format!("PS_{material_hash}.hlsl"))
    }

    /// Path of an exported texture, relative to the directory holding the
    /// info file.
    pub fn texture_path(asset_dir: &Path, texture_hash: &str) -> PathBuf {
        asset_dir.join("Textures").join(format!("{texture_hash}.dds"))
    }
}

/// Recursively find every exporter info file under `root`, sorted by path.
///
/// Unreadable directory entries are logged and skipped.
pub fn find_info_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry under {:?}: {}", root, e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(INFO_FILE_SUFFIX))
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}
