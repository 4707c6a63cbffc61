//! Instruction rewriter.
//!
//! A line-granular rewrite of the instruction body: sample calls are
//! retargeted at the material's dense texture bindings, `discard` becomes an
//! opacity-mask early return and everything else passes through untouched.

use crate::dialect;
use crate::program::Texture;
use crate::slot_map::TextureSlotMap;

/// Rewrite one sample instruction.
///
/// The remapped texture rank names the texture resource; the sampler resource
/// is named by the original sampler slot minus one.
pub fn rewrite_sample(line: &str, slots: &TextureSlotMap) -> String {
    let call = dialect::parse_sample_call(line);
    let rank = match slots.rank(call.texture_slot) {
        Some(rank) => rank as i64,
        None => {
            log::warn!(
                "sample references undeclared texture slot {}: {:?}",
                call.texture_slot,
                line
            );
            -1
        }
    };

    format!(
        "{}= Material_Texture2D_{}.SampleLevel(Material_Texture2D_{}Sampler, {},0).{}",
        call.target,
        rank,
        call.sampler_slot - 1,
        call.coordinate,
        call.suffix
    )
}

pub fn rewrite_discard(line: &str) -> String {
    line.replace(dialect::DISCARD_KEYWORD, dialect::DISCARD_REPLACEMENT)
}

/// Rewrite the instruction body of `lines`.
///
/// Emission starts at the scratch-register sentinel (inclusive) and stops
/// before the first `return;`. Line 0 is never considered. Never fails.
pub fn rewrite(lines: &[String], textures: &[Texture]) -> Vec<String> {
    let slots = TextureSlotMap::new(textures);

    let Some(start) = lines
        .iter()
        .skip(1)
        .position(|line| line.contains(dialect::SCRATCH_SENTINEL))
        .map(|offset| offset + 1)
    else {
        log::debug!("no scratch register sentinel found, instruction body is empty");
        return Vec::new();
    };

    let rewritten: Vec<String> = lines[start..]
        .iter()
        .take_while(|line| !dialect::is_return(line))
        .map(|line| {
            if dialect::is_sample_instruction(line) {
                rewrite_sample(line, &slots)
            } else if dialect::is_discard_instruction(line) {
                rewrite_discard(line)
            } else {
                line.clone()
            }
        })
        .collect();

    log::debug!(
        "rewrote {} body line(s) starting at line {}",
        rewritten.len(),
        start
    );
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(source: &str) -> Vec<String> {
        source.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_rewrite_sample_uses_rank_and_shifted_sampler() {
        let slots = TextureSlotMap::from_slots([2, 5, 1]);
        assert_eq!(
            rewrite_sample("  r1.xyz = t5.Sample(s3_s, v0.zw).xyz;", &slots),
            "  r1.xyz = Material_Texture2D_2.SampleLevel(Material_Texture2D_2Sampler, v0.zw,0).xyz;"
        );
    }

    #[test]
    fn test_rewrite_sample_with_undeclared_slot() {
        let slots = TextureSlotMap::from_slots([0]);
        let rewritten = rewrite_sample("  r0.x = t7.Sample(s0_s, r1.xy).x;", &slots);
        assert!(rewritten.contains("Material_Texture2D_-1.SampleLevel"));
        assert!(rewritten.contains("Material_Texture2D_-1Sampler"));
    }

    #[test]
    fn test_rewrite_discard_keeps_condition() {
        assert_eq!(
            rewrite_discard("  if (r0.x != 0) discard;"),
            "  if (r0.x != 0) { output.OpacityMask = 0; return output; };"
        );
    }

    #[test]
    fn test_rewrite_spans_sentinel_to_return() {
        let source = lines(
            "// ps_5_0
Texture2D<float4> t0 : register(t0);
{
  float4 r0,r1;
  r0.xyzw = t0.Sample(s1_s, v0.xy).xyzw;
  o0.xyzw = r0.xyzw;
  return;
  o1.xyzw = r0.xyzw;
}",
        );
        let textures = vec![dialect::parse_texture(&source[1]).unwrap()];

        assert_eq!(
            rewrite(&source, &textures),
            vec![
                "  float4 r0,r1;",
                "  r0.xyzw = Material_Texture2D_0.SampleLevel(Material_Texture2D_0Sampler, v0.xy,0).xyzw;",
                "  o0.xyzw = r0.xyzw;",
            ]
        );
    }

    #[test]
    fn test_rewrite_without_sentinel_is_empty() {
        assert!(rewrite(&lines("// ps\n  o0 = 1;\n  return;"), &[]).is_empty());
        assert!(rewrite(&[], &[]).is_empty());
    }
}
