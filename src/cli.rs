//! Command-line interface for hlsl2usf.
//!
//! This module handles CLI argument parsing and the `convert`, `batch` and
//! `inspect` subcommands.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hlsl2usf_config::{LogLevel, Settings, StageInfo};
use hlsl2usf_transpile::{
    ConversionRequest, Declarations, ShaderProgram, ShaderStage, convert, parse_declarations,
};

use crate::batch::{BatchOptions, run_batch};
use crate::logging::{LogOptions, init_log_bridge};

/// hlsl2usf - convert disassembled HLSL shaders into USF material code
#[derive(Parser, Debug)]
#[command(name = "hlsl2usf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file to use instead of ~/.config/hlsl2usf/settings.yaml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Set log level (overrides settings and RUST_LOG)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Off => LogLevel::Off,
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

/// Shader stage argument for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StageArg {
    #[value(alias = "pixel")]
    Ps,
    #[value(alias = "vertex")]
    Vs,
}

impl From<StageArg> for ShaderStage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::Ps => ShaderStage::Pixel,
            StageArg::Vs => ShaderStage::Vertex,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a single shader
    Convert {
        /// Disassembled HLSL source
        source: PathBuf,

        /// Shader stage of the source
        #[arg(long, value_enum, default_value = "ps")]
        stage: StageArg,

        /// JSON stage metadata supplying constant buffer sample data
        #[arg(long, value_name = "FILE")]
        material_info: Option<PathBuf>,

        /// Output conversion template (defaults to the settings' template)
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Write the result here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert every material pixel shader under an exporter tree
    Batch {
        /// Directory searched recursively for *_info.cfg files
        root: PathBuf,

        /// Output directory (default: <root>/usf)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Output conversion template (defaults to the settings' template)
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
    },

    /// Print the declarations parsed from a shader and the lines skipped
    Inspect {
        /// Disassembled HLSL source
        source: PathBuf,

        /// Shader stage of the source
        #[arg(long, value_enum, default_value = "ps")]
        stage: StageArg,
    },
}

/// Result of CLI processing
pub enum CliResult {
    /// Exit with the given code (subcommand completed)
    Exit(i32),
    /// The subcommand failed before producing a result
    Error(anyhow::Error),
}

/// Process CLI arguments and run the requested subcommand
pub fn process_cli() -> CliResult {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => return CliResult::Error(e),
    };

    init_log_bridge(&LogOptions {
        cli_level: cli.log_level.map(|l| LogLevel::from(l).to_level_filter()),
        settings_level: settings.log_level,
        log_file: settings.log_file.clone(),
    });

    match run(cli.command, &settings) {
        Ok(code) => CliResult::Exit(code),
        Err(e) => CliResult::Error(e),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading settings {}", path.display())),
        None => Settings::load().context("loading settings"),
    }
}

/// Run one subcommand and return the process exit code.
pub fn run(command: Commands, settings: &Settings) -> Result<i32> {
    match command {
        Commands::Convert {
            source,
            stage,
            material_info,
            template,
            output,
        } => {
            let template = template.unwrap_or_else(|| settings.template_path());
            convert_cli(
                &source,
                stage.into(),
                material_info.as_deref(),
                &template,
                output.as_deref(),
            )?;
            Ok(0)
        }
        Commands::Batch {
            root,
            output_dir,
            template,
        } => {
            let options = BatchOptions {
                output_dir: output_dir.unwrap_or_else(|| root.join("usf")),
                template_path: template.unwrap_or_else(|| settings.template_path()),
                output_extension: settings.output_extension.clone(),
                root,
            };
            batch_cli(&options)
        }
        Commands::Inspect { source, stage } => {
            inspect_cli(&source, stage.into())?;
            Ok(0)
        }
    }
}

fn convert_cli(
    source: &Path,
    stage: ShaderStage,
    material_info: Option<&Path>,
    template: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let stage_info = material_info
        .map(|path| {
            StageInfo::load(path)
                .with_context(|| format!("loading material info {}", path.display()))
        })
        .transpose()?;

    let request = ConversionRequest::new(source, stage, template)
        .with_samples(stage_info.as_ref().map(|s| &s.constant_buffers));
    let program = convert(&request)?;
    let contents = program.contents.unwrap_or_default();

    match output {
        Some(path) => {
            std::fs::write(path, &contents)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn batch_cli(options: &BatchOptions) -> Result<i32> {
    let report = run_batch(options)?;

    println!(
        "Converted {} material(s) into {}",
        report.converted.len(),
        options.output_dir.display()
    );
    for failure in &report.failed {
        println!("  FAILED {}: {}", failure.subject, failure.reason);
    }

    Ok(if report.is_success() { 0 } else { 1 })
}

fn inspect_cli(source: &Path, stage: ShaderStage) -> Result<()> {
    let text = std::fs::read_to_string(source)
        .with_context(|| format!("reading {}", source.display()))?;
    let program = parse_declarations(ShaderProgram::from_source(&text, stage));

    print!("{}", describe_declarations(&program.declarations));
    Ok(())
}

/// Human-readable summary of parsed declarations.
pub fn describe_declarations(declarations: &Declarations) -> String {
    let mut out = String::new();

    out.push_str(&format!("Textures ({}):\n", declarations.textures.len()));
    for texture in &declarations.textures {
        out.push_str(&format!(
            "  {} {}<{}> slot {}\n",
            texture.variable, texture.dimension, texture.element_type, texture.slot
        ));
    }

    let samplers: Vec<String> = declarations
        .sampler_slots
        .iter()
        .map(u32::to_string)
        .collect();
    out.push_str(&format!("Sampler slots: [{}]\n", samplers.join(", ")));

    out.push_str(&format!(
        "Constant buffers ({}):\n",
        declarations.constant_buffers.len()
    ));
    for buffer in &declarations.constant_buffers {
        out.push_str(&format!(
            "  {} {}[{}] slot {}\n",
            buffer.variable, buffer.element_type, buffer.count, buffer.slot
        ));
    }

    for (title, varyings) in [
        ("Inputs", &declarations.inputs),
        ("Outputs", &declarations.outputs),
    ] {
        out.push_str(&format!("{title} ({}):\n", varyings.len()));
        for varying in varyings {
            out.push_str(&format!(
                "  {} {} : {}\n",
                varying.variable, varying.element_type, varying.semantic
            ));
        }
    }

    out.push_str(&format!("Opacity masked: {}\n", declarations.opacity_masked));

    out.push_str(&format!("Skipped lines ({}):\n", declarations.skipped.len()));
    for skipped in &declarations.skipped {
        out.push_str(&format!("  {:>4}: {}\n", skipped.index, skipped.text));
    }

    out
}
