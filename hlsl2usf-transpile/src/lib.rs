//! Disassembled HLSL to USF custom-expression transpiler.
//!
//! Converts a shader in the line-oriented disassembler dialect into the body
//! of a material custom node. The conversion runs five stages over one
//! [`ShaderProgram`]:
//!
//! 1. [`parse_declarations`]: textures, samplers, constant buffers, inputs,
//!    outputs and the opacity-mask flag.
//! 2. [`write_constant_buffers`]: static `float4` arrays.
//! 3. [`write_entry_point`]: wrapper struct and signature.
//! 4. [`rewrite_instructions`]: sample and discard substitutions.
//! 5. [`write_footer`]: template boilerplate, closers and the entry call.
//!
//! [`convert`] runs the whole pipeline on a file and fails only if the source
//! or the template cannot be read.

pub mod constant_buffers;
pub mod declarations;
pub mod dialect;
pub mod entry_point;
mod error;
pub mod footer;
mod pipeline;
mod program;
pub mod rewriter;
mod slot_map;
mod template;

pub use error::{Result, TranspileError};
pub use footer::LINE_TERMINATOR;
pub use pipeline::{
    ConversionRequest, convert, convert_source, finish, parse_declarations, rewrite_instructions,
    write_constant_buffers, write_entry_point, write_footer,
};
pub use program::{
    ConstantBuffer, Declarations, ShaderProgram, ShaderStage, SkippedLine, Texture, Varying,
};
pub use slot_map::TextureSlotMap;
pub use template::ConversionTemplate;
