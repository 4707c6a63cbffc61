//! Constant buffer emitter.
//!
//! Every constant buffer becomes a statically initialized array of
//! `float4` rows. Sample data is looked up by the buffer's element count; the
//! lookup is an approximation (two buffers with the same count share data), so
//! the rows are placeholders rather than the buffer's real contents.

use crate::program::ConstantBuffer;
use hlsl2usf_config::{ConstantBufferSamples, Vec4Sample};

/// Row emitted when no sample data covers a buffer element.
pub const FILLER_ROW: &str = "float4(1, 1, 1, 1),";

fn format_row(row: &Vec4Sample) -> String {
    format!(
        "float4({:.6}, {:.6}, {:.6}, {:.6}),",
        row.x, row.y, row.z, row.w
    )
}

/// Emit the declaration block of a single buffer: header, `count` rows,
/// terminator and a separating blank line.
pub fn emit_buffer(
    buffer: &ConstantBuffer,
    samples: Option<&ConstantBufferSamples>,
) -> Vec<String> {
    let count = buffer.count as usize;
    let mut lines = Vec::with_capacity(count + 4);

    lines.push(format!(
        "static {} {}[{}] = ",
        buffer.element_type, buffer.variable, buffer.count
    ));
    lines.push("{".to_string());

    let rows = samples.and_then(|s| s.get(buffer.count)).unwrap_or(&[]);
    if rows.is_empty() {
        log::debug!(
            "no sample data for {} ({} rows), filling with ones",
            buffer.variable,
            buffer.count
        );
    } else if rows.len() != count {
        log::warn!(
            "sample data for {} has {} rows but the buffer holds {}; {}",
            buffer.variable,
            rows.len(),
            count,
            if rows.len() > count { "truncating" } else { "padding with ones" }
        );
    }

    lines.extend(rows.iter().take(count).map(format_row));
    lines.extend(std::iter::repeat_n(
        FILLER_ROW.to_string(),
        count.saturating_sub(rows.len()),
    ));

    lines.push("};".to_string());
    lines.push(String::new());
    lines
}

/// Emit every buffer in declaration order. Never fails.
pub fn emit(buffers: &[ConstantBuffer], samples: Option<&ConstantBufferSamples>) -> Vec<String> {
    buffers
        .iter()
        .flat_map(|buffer| emit_buffer(buffer, samples))
        .collect()
}
