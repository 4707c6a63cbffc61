//! Footer and output composition.

use crate::entry_point::COORDINATE_PARAMETER;
use crate::program::{Declarations, ShaderStage};
use crate::template::ConversionTemplate;

/// Line terminator of the emitted target source.
pub const LINE_TERMINATOR: &str = "\r\n";
/// Margin applied to every template line.
pub const TEMPLATE_INDENT: &str = "  ";

/// Emit the indented template, the wrapper closers and, for pixel shaders,
/// the call into the wrapper entry point.
pub fn emit(
    stage: ShaderStage,
    declarations: &Declarations,
    template: &ConversionTemplate,
) -> Vec<String> {
    let mut lines: Vec<String> = template
        .lines()
        .iter()
        .map(|line| format!("{TEMPLATE_INDENT}{line}"))
        .collect();

    lines.push("}".to_string());
    lines.push("};".to_string());

    if stage == ShaderStage::Pixel {
        lines.push("shader s;".to_string());
        let mut call = String::from("return s.main(");
        for texture in &declarations.textures {
            call.push_str(&texture.variable);
            call.push(',');
        }
        call.push_str(COORDINATE_PARAMETER);
        call.push_str(");");
        lines.push(call);
    }

    lines
}

/// Join emitted lines into the final shader text. Every line, the last one
/// included, ends with [`LINE_TERMINATOR`].
pub fn join(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| format!("{line}{LINE_TERMINATOR}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Texture;

    fn declarations_with_textures(slots: &[u32]) -> Declarations {
        Declarations {
            textures: slots
                .iter()
                .map(|&slot| Texture {
                    dimension: "Texture2D".to_string(),
                    element_type: "float4".to_string(),
                    variable: format!("t{slot}"),
                    slot,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pixel_footer_forwards_textures() {
        let template = ConversionTemplate::from_text("return output;");
        let lines = emit(ShaderStage::Pixel, &declarations_with_textures(&[4, 1]), &template);
        assert_eq!(
            lines,
            vec!["  return output;", "}", "};", "shader s;", "return s.main(t4,t1,tx);"]
        );
    }

    #[test]
    fn test_vertex_footer_has_no_invocation() {
        let template = ConversionTemplate::from_text("a;\nb;");
        let lines = emit(ShaderStage::Vertex, &declarations_with_textures(&[0]), &template);
        assert_eq!(lines, vec!["  a;", "  b;", "}", "};"]);
    }

    #[test]
    fn test_join_terminates_every_line_with_crlf() {
        let lines = vec!["a".to_string(), String::new(), "b".to_string()];
        assert_eq!(join(&lines), "a\r\n\r\nb\r\n");
        assert_eq!(join(&[]), "");
    }
}
