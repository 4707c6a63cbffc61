//! Batch conversion of an exporter tree.
//!
//! Every `*_info.cfg` under the root names a set of materials; each material's
//! pixel shader lives at `<info dir>/Shaders/PS_<hash>.hlsl`. The batch
//! converts each material once, writes the shader and its material plan to the
//! output directory and keeps going past failures.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hlsl2usf_config::{AssetInfo, MaterialInfo, find_info_files};
use hlsl2usf_transpile::{ConversionRequest, ShaderStage, convert};

use crate::material_plan::MaterialPlan;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub root: PathBuf,
    pub output_dir: PathBuf,
    pub template_path: PathBuf,
    /// Extension of written shader files, without the dot.
    pub output_extension: String,
}

/// A material found in an info file, with the directory its shaders are
/// relative to.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialJob {
    pub hash: String,
    pub asset_dir: PathBuf,
    pub info: MaterialInfo,
}

impl MaterialJob {
    pub fn pixel_shader_path(&self) -> PathBuf {
        AssetInfo::pixel_shader_path(&self.asset_dir, &self.hash)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedMaterial {
    pub hash: String,
    pub shader_path: PathBuf,
    pub plan_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Material hash, or the info file path when the file itself failed.
    pub subject: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub converted: Vec<ConvertedMaterial>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Gather the materials of every info file under `root`.
///
/// Materials are keyed by hash; when several info files share a material the
/// first file in path order wins. Unreadable info files are reported as
/// failures.
pub fn collect_materials(root: &Path, report: &mut BatchReport) -> Vec<MaterialJob> {
    let mut jobs: BTreeMap<String, MaterialJob> = BTreeMap::new();

    for info_path in find_info_files(root) {
        let info = match AssetInfo::load(&info_path) {
            Ok(info) => info,
            Err(e) => {
                report.failed.push(BatchFailure {
                    subject: info_path.display().to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let asset_dir = info_path.parent().unwrap_or(root).to_path_buf();
        for (hash, material) in info.materials {
            if jobs.contains_key(&hash) {
                log::debug!(
                    "material {} already collected, ignoring copy in {}",
                    hash,
                    info_path.display()
                );
                continue;
            }
            jobs.insert(
                hash.clone(),
                MaterialJob {
                    hash,
                    asset_dir: asset_dir.clone(),
                    info: material,
                },
            );
        }
    }

    jobs.into_values().collect()
}

fn convert_material(job: &MaterialJob, options: &BatchOptions) -> Result<ConvertedMaterial> {
    let source_path = job.pixel_shader_path();
    let stage_info = job.info.pixel.as_ref();
    let request = ConversionRequest::new(&source_path, ShaderStage::Pixel, &options.template_path)
        .with_samples(stage_info.map(|s| &s.constant_buffers));

    let program = convert(&request)?;
    let plan = MaterialPlan::new(&job.hash, &program, stage_info);

    let shader_path = options
        .output_dir
        .join(format!("{}.{}", job.hash, options.output_extension));
    std::fs::write(&shader_path, &plan.code)
        .with_context(|| format!("writing {}", shader_path.display()))?;

    let plan_path = options.output_dir.join(format!("{}.json", job.hash));
    plan.save(&plan_path)?;

    Ok(ConvertedMaterial {
        hash: job.hash.clone(),
        shader_path,
        plan_path,
    })
}

/// Convert every material under `options.root`.
///
/// Only a failure to create the output directory aborts the batch; per
/// material failures are collected in the report.
pub fn run_batch(options: &BatchOptions) -> Result<BatchReport> {
    std::fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "creating output directory {}",
            options.output_dir.display()
        )
    })?;

    let mut report = BatchReport::default();
    let jobs = collect_materials(&options.root, &mut report);
    log::info!(
        "found {} material(s) under {}",
        jobs.len(),
        options.root.display()
    );

    for job in &jobs {
        match convert_material(job, options) {
            Ok(converted) => {
                log::info!("converted material {}", job.hash);
                report.converted.push(converted);
            }
            Err(e) => {
                log::error!("failed to convert material {}: {e:#}", job.hash);
                report.failed.push(BatchFailure {
                    subject: job.hash.clone(),
                    reason: format!("{e:#}"),
                });
            }
        }
    }

    Ok(report)
}
