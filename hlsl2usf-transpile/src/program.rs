//! The shader record threaded through the conversion pipeline.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Shading stage of the source program. Selects the emission templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Pixel,
    Vertex,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Pixel => write!(f, "pixel"),
            ShaderStage::Vertex => write!(f, "vertex"),
        }
    }
}

impl FromStr for ShaderStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pixel" | "ps" | "fragment" => Ok(ShaderStage::Pixel),
            "vertex" | "vs" => Ok(ShaderStage::Vertex),
            other => Err(format!(
                "unknown shader stage '{other}' (expected pixel/ps or vertex/vs)"
            )),
        }
    }
}

/// A declared texture, e.g. `Texture2D<float4> t3 : register(t3);`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Resource dimension keyword (`Texture2D`, `TextureCube`, ...).
    pub dimension: String,
    /// Element type between the angle brackets.
    pub element_type: String,
    pub variable: String,
    /// Register number taken from the variable name (`t3` -> 3).
    pub slot: u32,
}

/// A declared constant buffer array, e.g. `float4 cb0[12];`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantBuffer {
    pub variable: String,
    pub element_type: String,
    pub count: u32,
    pub slot: u32,
}

/// A stage input (`v<N>`) or output (`o<N>`) parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varying {
    pub variable: String,
    pub element_type: String,
    pub slot: u32,
    /// Semantic tag after ` : `, e.g. `TEXCOORD0`.
    pub semantic: String,
}

/// A source line the declaration parser did not recognize.
///
/// Unrecognized lines are not errors; they are recorded so dialect drift can
/// be detected without changing conversion behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// Zero-based index into the source lines.
    pub index: usize,
    pub text: String,
}

/// Everything the declaration parser extracts from the source header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    pub textures: Vec<Texture>,
    pub constant_buffers: Vec<ConstantBuffer>,
    /// Inputs in declaration order.
    pub inputs: Vec<Varying>,
    /// Outputs in declaration order.
    pub outputs: Vec<Varying>,
    pub sampler_slots: BTreeSet<u32>,
    /// The body discards fragments.
    pub opacity_masked: bool,
    pub skipped: Vec<SkippedLine>,
}

/// One conversion in progress.
///
/// Created per request and dropped once `contents` has been consumed; never
/// shared between conversions.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub stage: ShaderStage,
    pub source_lines: Vec<String>,
    /// Emitted target lines; append-only across the pipeline.
    pub output_lines: Vec<String>,
    pub declarations: Declarations,
    /// Joined output, set only when the whole pipeline succeeded.
    pub contents: Option<String>,
}

impl ShaderProgram {
    /// Build a record from raw source text.
    ///
    /// Lines are split on `\n`, a trailing `\r` is dropped and empty lines are
    /// culled, so line indices refer to non-empty lines only.
    pub fn from_source(source: &str, stage: ShaderStage) -> Self {
        let source_lines = source
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            stage,
            source_lines,
            output_lines: Vec::new(),
            declarations: Declarations::default(),
            contents: None,
        }
    }

    pub fn opacity_masked(&self) -> bool {
        self.declarations.opacity_masked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_from_str() {
        assert_eq!("ps".parse::<ShaderStage>(), Ok(ShaderStage::Pixel));
        assert_eq!("Pixel".parse::<ShaderStage>(), Ok(ShaderStage::Pixel));
        assert_eq!("VS".parse::<ShaderStage>(), Ok(ShaderStage::Vertex));
        assert!("compute".parse::<ShaderStage>().is_err());
    }

    #[test]
    fn test_from_source_culls_empty_lines_and_carriage_returns() {
        let program = ShaderProgram::from_source(
            "// ps_5_0\r\n\r\nfloat4 a;\n\nreturn;\n",
            ShaderStage::Pixel,
        );
        assert_eq!(program.source_lines, vec!["// ps_5_0", "float4 a;", "return;"]);
        assert!(program.output_lines.is_empty());
        assert!(program.contents.is_none());
    }
}
