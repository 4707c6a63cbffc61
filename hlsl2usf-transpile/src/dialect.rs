//! Delimiter contracts of the disassembled HLSL dialect.
//!
//! The source shaders come out of a disassembler with a fixed, one-operation-
//! per-line layout:
//!
//! ```hlsl
//! // ps_5_0
//! Texture2D<float4> t0 : register(t0);
//! SamplerState s0_s : register(s0);
//! cbuffer cb0 : register(b0)
//! {
//!   float4 cb0[4];
//! }
//! void main(
//!   float4 v0 : TEXCOORD0,
//!   out float4 o0 : SV_Target0)
//! {
//!   float4 r0,r1;
//!   r0.xyzw = t0.Sample(s0_s, v0.xy).xyzw;
//!   if (r0.w < 0.5) discard;
//!   return;
//! }
//! ```
//!
//! Every extraction below splits on the first occurrence of a fixed delimiter.
//! When the dialect drifts, this module is the only place that needs to
//! change.

use crate::program::{ConstantBuffer, Texture, Varying};

/// Joint declaration of the first two scratch registers; separates the
/// declaration header from the instruction body.
pub const SCRATCH_SENTINEL: &str = "r0,r1";
/// Unconditional return; ends the instruction body.
pub const RETURN_SENTINEL: &str = "return;";

pub const TEXTURE_KEYWORD: &str = "Texture";
pub const SAMPLER_KEYWORD: &str = "SamplerState";
pub const CBUFFER_KEYWORD: &str = "cbuffer";
pub const SAMPLE_KEYWORD: &str = "Sample";
pub const DISCARD_KEYWORD: &str = "discard";

/// Replacement for `discard`: mask the fragment and leave the entry point.
pub const DISCARD_REPLACEMENT: &str = "{ output.OpacityMask = 0; return output; }";

/// Text before the first `delimiter`.
fn before<'a>(text: &'a str, delimiter: &str) -> Option<&'a str> {
    text.split_once(delimiter).map(|(left, _)| left)
}

/// Text after the first `delimiter`.
fn after<'a>(text: &'a str, delimiter: &str) -> Option<&'a str> {
    text.split_once(delimiter).map(|(_, right)| right)
}

/// C `atoi` semantics: optional leading whitespace and sign, then as many
/// digits as present. Returns 0 when no digits follow.
pub fn leading_number(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });

    if negative { -value } else { value }
}

/// Register number of a register-named variable (`t12` -> 12, `cb3` -> 3).
///
/// `prefix_len` is the number of leading letters to strip.
pub fn register_slot(variable: &str, prefix_len: usize) -> u32 {
    let digits = variable.get(prefix_len..).unwrap_or("");
    u32::try_from(leading_number(digits)).unwrap_or(0)
}

// ============================================================================
// Declarations
// ============================================================================

pub fn is_texture_declaration(line: &str) -> bool {
    line.contains(TEXTURE_KEYWORD)
}

/// `Texture2D<float4> t0 : register(t0);`
///
/// - dimension: text before `<`
/// - element type: text between `<` and `>`
/// - variable: text after `> ` up to ` : `
/// - slot: variable digits after its one-letter prefix
pub fn parse_texture(line: &str) -> Option<Texture> {
    let dimension = before(line, "<")?.trim().to_string();
    let element_type = before(after(line, "<")?, ">")?.trim().to_string();
    let tail = after(line, "> ")?;
    let variable = before(tail, " : ").unwrap_or(tail).trim().to_string();
    let slot = register_slot(&variable, 1);

    Some(Texture {
        dimension,
        element_type,
        variable,
        slot,
    })
}

pub fn is_sampler_declaration(line: &str) -> bool {
    line.contains(SAMPLER_KEYWORD)
}

/// `SamplerState s0_s : register(s0);`
///
/// The slot is the single character before the closing `)`.
pub fn parse_sampler_slot(line: &str) -> Option<u32> {
    let inner = before(after(line, "(")?, ")")?;
    let last = inner.chars().last()?;
    Some(register_slot(&last.to_string(), 0))
}

pub fn is_constant_buffer_declaration(line: &str) -> bool {
    line.contains(CBUFFER_KEYWORD)
}

/// The array line two lines below a `cbuffer` declaration: `float4 cb0[12];`
///
/// - element type: text before the first `cb`, trimmed
/// - variable: `cb` plus the text after ` cb` up to `[`
/// - count: text between `[` and `]`
pub fn parse_constant_buffer_array(line: &str) -> Option<ConstantBuffer> {
    let left = before(line, "[")?;
    let variable = format!("cb{}", after(left, " cb")?.trim_end());
    let slot = register_slot(&variable, 2);
    let count = u32::try_from(leading_number(before(after(line, "[")?, "]")?)).unwrap_or(0);
    let element_type = before(line, "cb")?.trim().to_string();

    Some(ConstantBuffer {
        variable,
        element_type,
        count,
        slot,
    })
}

/// `  float4 v0 : TEXCOORD0,`; ternaries (`?`) are instructions, not inputs.
pub fn is_input_declaration(line: &str) -> bool {
    line.contains(" v") && line.contains(" : ") && !line.contains('?')
}

/// - variable: `v` plus the text after ` v` up to ` : `
/// - semantic: text after ` : ` up to `,`
/// - element type: text before ` v`, trimmed
pub fn parse_input(line: &str) -> Option<Varying> {
    let rest = after(line, " v")?;
    let variable = format!("v{}", before(rest, " : ").unwrap_or(rest).trim());
    let slot = register_slot(&variable, 1);
    let semantic_tail = after(line, " : ")?;
    let semantic = before(semantic_tail, ",")
        .unwrap_or(semantic_tail)
        .trim()
        .to_string();
    let element_type = before(line, " v")?.trim().to_string();

    Some(Varying {
        variable,
        element_type,
        slot,
        semantic,
    })
}

pub fn is_output_declaration(line: &str) -> bool {
    line.contains("out") && line.contains(" : ")
}

/// `  out float4 o0 : SV_Target0,`
///
/// - element type: text between `out ` and ` o`
/// - variable: `o` plus the text after ` o` up to ` : `
/// - semantic: text after ` : ` minus its final character (`,` or `)`)
pub fn parse_output(line: &str) -> Option<Varying> {
    let rest = after(line, "out ")?;
    let register_tail = after(rest, " o")?;
    let variable = format!(
        "o{}",
        before(register_tail, " : ").unwrap_or(register_tail).trim()
    );
    let slot = register_slot(&variable, 1);
    let semantic_tail = after(line, " : ")?.trim_end();
    let mut semantic_chars = semantic_tail.chars();
    semantic_chars.next_back();
    let semantic = semantic_chars.as_str().trim().to_string();
    let element_type = before(rest, " o")?.trim().to_string();

    Some(Varying {
        variable,
        element_type,
        slot,
        semantic,
    })
}

// ============================================================================
// Instructions
// ============================================================================

pub fn is_sample_instruction(line: &str) -> bool {
    line.contains(SAMPLE_KEYWORD)
}

pub fn is_discard_instruction(line: &str) -> bool {
    line.contains(DISCARD_KEYWORD)
}

pub fn is_return(line: &str) -> bool {
    line.contains(RETURN_SENTINEL)
}

/// Pieces of `r0.xyzw = t0.Sample(s0_s, v0.xy).xyzw;`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleCall<'a> {
    /// Everything left of `=`, including indentation and trailing space.
    pub target: &'a str,
    /// Digits after the last `t` before `.Sample`.
    pub texture_slot: u32,
    /// Digits between `(s` and `_s`.
    pub sampler_slot: i64,
    /// Text after `, ` up to `)`.
    pub coordinate: &'a str,
    /// Text after `).`, including the terminating `;`.
    pub suffix: &'a str,
}

/// Decompose a sample instruction. Missing pieces come back empty or zero;
/// this never fails.
pub fn parse_sample_call(line: &str) -> SampleCall<'_> {
    let target = before(line, "=").unwrap_or("");

    let texture_slot = before(line, ".Sample")
        .and_then(|left| left.rsplit_once('t'))
        .map(|(_, digits)| u32::try_from(leading_number(digits)).unwrap_or(0))
        .unwrap_or(0);

    let sampler_slot = after(line, "(s")
        .map(|tail| leading_number(before(tail, "_s").unwrap_or(tail)))
        .unwrap_or(0);

    let coordinate = after(line, ", ")
        .map(|tail| before(tail, ")").unwrap_or(tail))
        .unwrap_or("");

    let suffix = after(line, ").").unwrap_or("");

    SampleCall {
        target,
        texture_slot,
        sampler_slot,
        coordinate,
        suffix,
    }
}
