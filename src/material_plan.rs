//! Material plans.
//!
//! A plan is the engine-neutral description a host editor needs to build a
//! material around a converted pixel shader: the custom-node code, its blend
//! settings, the inputs wired into the node and the textures to import.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hlsl2usf_config::{AssetInfo, StageInfo};
use hlsl2usf_transpile::ShaderProgram;
use hlsl2usf_transpile::entry_point::COORDINATE_PARAMETER;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    Opaque,
    Masked,
}

/// How a texture sample node reads its texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplerKind {
    /// sRGB color data.
    Color,
    LinearColor,
}

impl SamplerKind {
    pub fn for_texture(srgb: bool) -> Self {
        if srgb {
            SamplerKind::Color
        } else {
            SamplerKind::LinearColor
        }
    }
}

/// One input pin of the custom node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomInput {
    pub name: String,
    /// Texture feeding this input; `None` for the coordinate input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler: Option<SamplerKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialPlan {
    pub material: String,
    pub blend_mode: BlendMode,
    pub two_sided: bool,
    /// Texture inputs in slot order, then the coordinate input.
    pub inputs: Vec<CustomInput>,
    /// Texture files to import, relative to the asset directory.
    pub texture_imports: Vec<PathBuf>,
    /// Custom-node code.
    pub code: String,
}

impl MaterialPlan {
    /// Build the plan for a converted pixel shader.
    pub fn new(material: &str, program: &ShaderProgram, stage: Option<&StageInfo>) -> Self {
        let masked = program.opacity_masked();
        let textures = stage.map(|s| &s.textures);

        let mut inputs: Vec<CustomInput> = textures
            .into_iter()
            .flatten()
            .map(|(slot, texture)| CustomInput {
                name: format!("t{slot}"),
                texture_hash: Some(texture.hash.clone()),
                sampler: Some(SamplerKind::for_texture(texture.srgb)),
            })
            .collect();
        inputs.push(CustomInput {
            name: COORDINATE_PARAMETER.to_string(),
            texture_hash: None,
            sampler: None,
        });

        let mut texture_imports: Vec<PathBuf> = textures
            .into_iter()
            .flatten()
            .map(|(_, texture)| AssetInfo::texture_path(Path::new(""), &texture.hash))
            .collect();
        texture_imports.sort();
        texture_imports.dedup();

        Self {
            material: material.to_string(),
            blend_mode: if masked {
                BlendMode::Masked
            } else {
                BlendMode::Opaque
            },
            two_sided: masked,
            inputs,
            texture_imports,
            code: program.contents.clone().unwrap_or_default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing material plan")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing material plan {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading material plan {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing material plan {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlsl2usf_config::TextureInfo;
    use hlsl2usf_transpile::ShaderStage;

    fn stage_info() -> StageInfo {
        let mut stage = StageInfo::default();
        stage.textures.insert(
            3,
            TextureInfo {
                hash: "BBBB0002".to_string(),
                srgb: false,
            },
        );
        stage.textures.insert(
            0,
            TextureInfo {
                hash: "AAAA0001".to_string(),
                srgb: true,
            },
        );
        stage.textures.insert(
            5,
            TextureInfo {
                hash: "AAAA0001".to_string(),
                srgb: true,
            },
        );
        stage
    }

    #[test]
    fn test_inputs_follow_slot_order_then_coordinate() {
        let program = ShaderProgram::from_source("// ps_5_0", ShaderStage::Pixel);
        let plan = MaterialPlan::new("ABCD", &program, Some(&stage_info()));

        let names: Vec<&str> = plan.inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["t0", "t3", "t5", "tx"]);
        assert_eq!(plan.inputs[0].sampler, Some(SamplerKind::Color));
        assert_eq!(plan.inputs[1].sampler, Some(SamplerKind::LinearColor));
        assert_eq!(plan.inputs[3].texture_hash, None);
    }

    #[test]
    fn test_texture_imports_are_deduplicated() {
        let program = ShaderProgram::from_source("// ps_5_0", ShaderStage::Pixel);
        let plan = MaterialPlan::new("ABCD", &program, Some(&stage_info()));
        assert_eq!(
            plan.texture_imports,
            vec![
                PathBuf::from("Textures/AAAA0001.dds"),
                PathBuf::from("Textures/BBBB0002.dds"),
            ]
        );
    }

    #[test]
    fn test_masked_shader_is_two_sided() {
        let mut program = ShaderProgram::from_source("// ps_5_0", ShaderStage::Pixel);
        let plan = MaterialPlan::new("ABCD", &program, None);
        assert_eq!(plan.blend_mode, BlendMode::Opaque);
        assert!(!plan.two_sided);

        program.declarations.opacity_masked = true;
        let plan = MaterialPlan::new("ABCD", &program, None);
        assert_eq!(plan.blend_mode, BlendMode::Masked);
        assert!(plan.two_sided);
        assert_eq!(plan.inputs.len(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ABCD.json");
        let program = ShaderProgram::from_source("// ps_5_0", ShaderStage::Pixel);
        let plan = MaterialPlan::new("ABCD", &program, Some(&stage_info()));

        plan.save(&path).unwrap();
        assert_eq!(MaterialPlan::load(&path).unwrap(), plan);
    }
}
