//! The conversion pipeline.
//!
//! Each stage takes the record produced by the previous one and returns it
//! with its own contribution appended, so stages can be driven one at a time
//! in tests. Only the two file reads can fail; a failure drops the record.

use std::path::Path;

use hlsl2usf_config::ConstantBufferSamples;

use crate::error::{Result, TranspileError};
use crate::program::{ShaderProgram, ShaderStage};
use crate::template::ConversionTemplate;
use crate::{constant_buffers, declarations, entry_point, footer, rewriter};

/// Inputs of one conversion.
#[derive(Debug, Clone, Copy)]
pub struct ConversionRequest<'a> {
    pub source_path: &'a Path,
    pub stage: ShaderStage,
    /// Placeholder constant buffer data, keyed by element count.
    pub samples: Option<&'a ConstantBufferSamples>,
    pub template_path: &'a Path,
}

impl<'a> ConversionRequest<'a> {
    pub fn new(source_path: &'a Path, stage: ShaderStage, template_path: &'a Path) -> Self {
        Self {
            source_path,
            stage,
            samples: None,
            template_path,
        }
    }

    pub fn with_samples(mut self, samples: Option<&'a ConstantBufferSamples>) -> Self {
        self.samples = samples;
        self
    }
}

/// Stage 1: extract the declaration header.
pub fn parse_declarations(mut program: ShaderProgram) -> ShaderProgram {
    program.declarations = declarations::parse(&program.source_lines);
    program
}

/// Stage 2: static constant buffer arrays.
pub fn write_constant_buffers(
    mut program: ShaderProgram,
    samples: Option<&ConstantBufferSamples>,
) -> ShaderProgram {
    let lines = constant_buffers::emit(&program.declarations.constant_buffers, samples);
    program.output_lines.extend(lines);
    program
}

/// Stage 3: wrapper struct and entry-point signature.
pub fn write_entry_point(mut program: ShaderProgram) -> ShaderProgram {
    let lines = entry_point::emit(program.stage, &program.declarations);
    program.output_lines.extend(lines);
    program
}

/// Stage 4: rewritten instruction body.
pub fn rewrite_instructions(mut program: ShaderProgram) -> ShaderProgram {
    let lines = rewriter::rewrite(&program.source_lines, &program.declarations.textures);
    program.output_lines.extend(lines);
    program
}

/// Stage 5: template boilerplate and closers.
pub fn write_footer(mut program: ShaderProgram, template: &ConversionTemplate) -> ShaderProgram {
    let lines = footer::emit(program.stage, &program.declarations, template);
    program.output_lines.extend(lines);
    program
}

/// Join the emitted lines into `contents`.
pub fn finish(mut program: ShaderProgram) -> ShaderProgram {
    program.contents = Some(footer::join(&program.output_lines));
    program
}

/// Convert the shader at `request.source_path`.
pub fn convert(request: &ConversionRequest<'_>) -> Result<ShaderProgram> {
    let source = std::fs::read_to_string(request.source_path).map_err(|source| {
        log::error!(
            "failed to load hlsl file {}: {}",
            request.source_path.display(),
            source
        );
        TranspileError::SourceRead {
            path: request.source_path.to_path_buf(),
            source,
        }
    })?;

    log::info!(
        "converting {} shader {}",
        request.stage,
        request.source_path.display()
    );
    convert_source(&source, request.stage, request.samples, request.template_path)
}

/// Convert in-memory source text. The template is still read from disk.
pub fn convert_source(
    source: &str,
    stage: ShaderStage,
    samples: Option<&ConstantBufferSamples>,
    template_path: &Path,
) -> Result<ShaderProgram> {
    let program = ShaderProgram::from_source(source, stage);
    let program = parse_declarations(program);
    let program = write_constant_buffers(program, samples);
    let program = write_entry_point(program);
    let program = rewrite_instructions(program);

    let template = ConversionTemplate::load(template_path)?;
    let program = finish(write_footer(program, &template));

    log::debug!(
        "emitted {} line(s) for {} shader (opacity masked: {})",
        program.output_lines.len(),
        stage,
        program.opacity_masked()
    );
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_append_in_order() {
        let program = ShaderProgram::from_source(
            "// ps_5_0\ncbuffer cb0 : register(b0)\n{\n  float4 cb0[1];\n}\n  float4 r0,r1;\n  return;",
            ShaderStage::Pixel,
        );
        let program = parse_declarations(program);
        assert!(program.output_lines.is_empty());

        let program = write_constant_buffers(program, None);
        assert_eq!(program.output_lines[0], "static float4 cb0[1] = ");
        let after_buffers = program.output_lines.len();

        let program = write_entry_point(program);
        assert_eq!(program.output_lines[after_buffers], "#define cmp -");

        let program = rewrite_instructions(program);
        assert_eq!(program.output_lines.last().unwrap(), "  float4 r0,r1;");

        let template = ConversionTemplate::from_text("return output;");
        let program = finish(write_footer(program, &template));
        let contents = program.contents.unwrap();
        assert!(contents.ends_with("shader s;\r\nreturn s.main(tx);\r\n"));
    }
}
