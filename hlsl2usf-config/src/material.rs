//! Per-material metadata exported alongside the disassembled shaders.
//!
//! The exporter writes one JSON object per material, with a section per
//! shader stage:
//!
//! ```json
//! {
//!   "PS": {
//!     "ConstantBuffers": { "4": [ { "X": 0.5, "Y": 1.0, "Z": 0.0, "W": 1.0 } ] },
//!     "Textures": { "0": { "Hash": "A1B2C3D4", "SRGB": true } }
//!   },
//!   "VS": { ... }
//! }
//! ```
//!
//! Constant buffer sample data is keyed by the buffer's element count, not by
//! its register. Two buffers with the same element count therefore receive the
//! same placeholder data; consumers treat it as sample data only.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One 4-component row of constant buffer sample data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec4Sample {
    #[serde(rename = "X", default)]
    pub x: f64,
    #[serde(rename = "Y", default)]
    pub y: f64,
    #[serde(rename = "Z", default)]
    pub z: f64,
    #[serde(rename = "W", default)]
    pub w: f64,
}

impl Vec4Sample {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }
}

/// Constant buffer sample data keyed by buffer element count.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstantBufferSamples(BTreeMap<u32, Vec<Vec4Sample>>);

impl ConstantBufferSamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample rows registered for buffers with `count` elements.
    pub fn get(&self, count: u32) -> Option<&[Vec4Sample]> {
        self.0.get(&count).map(Vec::as_slice)
    }

    pub fn insert(&mut self, count: u32, rows: Vec<Vec4Sample>) {
        self.0.insert(count, rows);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A texture bound to a shader stage, keyed by slot in [`StageInfo::textures`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextureInfo {
    /// Exported texture hash; the texture file is `Textures/<hash>.dds`.
    #[serde(rename = "Hash")]
    pub hash: String,
    /// Whether the texture holds sRGB color data.
    #[serde(rename = "SRGB", default)]
    pub srgb: bool,
}

/// Metadata for one shader stage of a material.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StageInfo {
    #[serde(rename = "ConstantBuffers", default)]
    pub constant_buffers: ConstantBufferSamples,
    #[serde(rename = "Textures", default)]
    pub textures: BTreeMap<u32, TextureInfo>,
}

/// Metadata for one material.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialInfo {
    #[serde(rename = "PS", default, skip_serializing_if = "Option::is_none")]
    pub pixel: Option<StageInfo>,
    #[serde(rename = "VS", default, skip_serializing_if = "Option::is_none")]
    pub vertex: Option<StageInfo>,
}

impl StageInfo {
    /// Load a single stage section from a standalone JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let info: StageInfo = serde_json::from_str(&contents)?;
        log::debug!(
            "Loaded stage info from {:?}: {} constant buffer sample set(s), {} texture(s)",
            path,
            info.constant_buffers.len(),
            info.textures.len()
        );
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stage_info_with_string_keys() {
        let json = r#"{
            "ConstantBuffers": {
                "2": [
                    { "X": 0.5, "Y": 0.25, "Z": 0.0, "W": 1.0 },
                    { "X": 1.0, "Y": 2.0, "Z": 3.0, "W": 4.0 }
                ]
            },
            "Textures": {
                "3": { "Hash": "DEADBEEF", "SRGB": true },
                "10": { "Hash": "0BADF00D" }
            }
        }"#;

        let info: StageInfo = serde_json::from_str(json).expect("stage info should parse");
        let rows = info.constant_buffers.get(2).expect("count 2 present");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], Vec4Sample::new(0.5, 0.25, 0.0, 1.0));
        assert!(info.constant_buffers.get(4).is_none());

        // Slots sort numerically, not lexically
        let slots: Vec<u32> = info.textures.keys().copied().collect();
        assert_eq!(slots, vec![3, 10]);
        assert!(info.textures[&3].srgb);
        assert!(!info.textures[&10].srgb);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let info: StageInfo = serde_json::from_str("{}").unwrap();
        assert!(info.constant_buffers.is_empty());
        assert!(info.textures.is_empty());

        let material: MaterialInfo = serde_json::from_str(r#"{ "PS": {} }"#).unwrap();
        assert!(material.pixel.is_some());
        assert!(material.vertex.is_none());
    }

    #[test]
    fn test_missing_components_default_to_zero() {
        let row: Vec4Sample = serde_json::from_str(r#"{ "X": 2.0 }"#).unwrap();
        assert_eq!(row, Vec4Sample::new(2.0, 0.0, 0.0, 0.0));
    }
}
