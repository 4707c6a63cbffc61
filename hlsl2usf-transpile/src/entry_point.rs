//! Entry-point emitter: the wrapper struct opener and the target function
//! signature, conditioned on the shader stage.

use crate::program::{Declarations, ShaderStage, Varying};

/// Macro line that turns the disassembler's `cmp` comparisons into negation.
pub const CMP_MACRO: &str = "#define cmp -";
pub const STRUCT_OPENER: &str = "struct shader {";
/// Name of the screen coordinate parameter appended to the pixel signature.
pub const COORDINATE_PARAMETER: &str = "tx";

/// Component count of the input kinds the pixel entry point knows how to
/// default and scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    Vector4,
    Vector3,
    Scalar,
}

impl Arity {
    fn of(element_type: &str) -> Option<Self> {
        match element_type {
            "float4" => Some(Arity::Vector4),
            "float3" => Some(Arity::Vector3),
            "uint" | "int" | "float" => Some(Arity::Scalar),
            _ => None,
        }
    }

    fn default_value(self) -> &'static str {
        match self {
            Arity::Vector4 => "{1, 1, 1, 1}",
            Arity::Vector3 => "{1, 1, 1}",
            Arity::Scalar => "1",
        }
    }

    /// (input swizzle, coordinate swizzle)
    fn scale_swizzles(self) -> (&'static str, &'static str) {
        match self {
            Arity::Vector4 => ("xyzw", "xyxy"),
            Arity::Vector3 => ("xyz", "xyx"),
            Arity::Scalar => ("x", "x"),
        }
    }
}

fn recognized_inputs(inputs: &[Varying]) -> impl Iterator<Item = (&Varying, Arity)> {
    inputs.iter().filter_map(|input| match Arity::of(&input.element_type) {
        Some(arity) => Some((input, arity)),
        None => {
            log::debug!(
                "input {} has unsupported type '{}', no default emitted",
                input.variable,
                input.element_type
            );
            None
        }
    })
}

fn emit_pixel(declarations: &Declarations) -> Vec<String> {
    let mut lines: Vec<String> = recognized_inputs(&declarations.inputs)
        .map(|(input, arity)| {
            format!(
                "static {} {} = {};",
                input.element_type,
                input.variable,
                arity.default_value()
            )
        })
        .collect();

    lines.push(CMP_MACRO.to_string());
    lines.push(STRUCT_OPENER.to_string());
    lines.push("FMaterialAttributes main(".to_string());
    lines.extend(
        declarations
            .textures
            .iter()
            .map(|texture| format!("   {} {},", texture.element_type, texture.variable)),
    );
    lines.push(format!("   float2 {COORDINATE_PARAMETER})"));
    lines.push("{".to_string());
    lines.push("  FMaterialAttributes output;".to_string());
    lines.push("  float4 o0,o1,o2;".to_string());

    lines.extend(recognized_inputs(&declarations.inputs).map(|(input, arity)| {
        let (swizzle, coordinate_swizzle) = arity.scale_swizzles();
        format!(
            "  {var}.{swizzle} = {var}.{swizzle} * {COORDINATE_PARAMETER}.{coordinate_swizzle};",
            var = input.variable
        )
    }));

    lines
}

fn emit_vertex(declarations: &Declarations) -> Vec<String> {
    let mut lines = vec![CMP_MACRO.to_string(), STRUCT_OPENER.to_string()];

    lines.extend(
        declarations
            .outputs
            .iter()
            .map(|output| format!("{} {};", output.element_type, output.variable)),
    );
    lines.push(String::new());
    lines.push("void main(".to_string());
    lines.extend(
        declarations
            .textures
            .iter()
            .map(|texture| format!("   {} {},", texture.element_type, texture.variable)),
    );

    let last = declarations.inputs.len().saturating_sub(1);
    for (i, input) in declarations.inputs.iter().enumerate() {
        let separator = if i == last { ')' } else { ',' };
        lines.push(format!(
            "   {} {}{} // {}",
            input.element_type, input.variable, separator, input.semantic
        ));
    }
    if declarations.inputs.is_empty() {
        lines.push(")".to_string());
    }
    lines.push("{".to_string());

    lines
}

/// Emit the entry-point scaffolding for `stage`. Never fails.
pub fn emit(stage: ShaderStage, declarations: &Declarations) -> Vec<String> {
    match stage {
        ShaderStage::Pixel => emit_pixel(declarations),
        ShaderStage::Vertex => emit_vertex(declarations),
    }
}
