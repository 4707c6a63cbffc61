//! Declaration parser.
//!
//! Walks the source header line by line and hands each line to the first
//! classifier whose predicate accepts it. Classifier order matters: a texture
//! line also contains ` : `, so it must be tried before the input/output
//! classifiers.
//!
//! Once the scratch-register sentinel is seen the parser stops collecting
//! declarations and only looks for a `discard`; finding one marks the shader
//! as opacity masked and ends the pass.

use crate::dialect;
use crate::program::{ConstantBuffer, Declarations, SkippedLine, Texture, Varying};

/// A structured declaration produced by a classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Texture(Texture),
    Sampler(u32),
    ConstantBuffer(ConstantBuffer),
    Input(Varying),
    Output(Varying),
}

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub declaration: Declaration,
    /// Lines consumed after the current one.
    pub extra_lines: usize,
}

/// A predicate plus an extractor for one kind of declaration line.
pub struct Classifier {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    /// Receives all source lines and the index of the matched line.
    pub extract: fn(&[String], usize) -> Option<Extracted>,
}

fn single(declaration: Option<Declaration>) -> Option<Extracted> {
    declaration.map(|declaration| Extracted {
        declaration,
        extra_lines: 0,
    })
}

fn extract_texture(lines: &[String], index: usize) -> Option<Extracted> {
    single(dialect::parse_texture(&lines[index]).map(Declaration::Texture))
}

fn extract_sampler(lines: &[String], index: usize) -> Option<Extracted> {
    single(dialect::parse_sampler_slot(&lines[index]).map(Declaration::Sampler))
}

/// The array line sits two lines below the `cbuffer` keyword, past the
/// opening brace.
fn extract_constant_buffer(lines: &[String], index: usize) -> Option<Extracted> {
    let array_line = lines.get(index + 2)?;
    dialect::parse_constant_buffer_array(array_line).map(|buffer| Extracted {
        declaration: Declaration::ConstantBuffer(buffer),
        extra_lines: 2,
    })
}

fn extract_input(lines: &[String], index: usize) -> Option<Extracted> {
    single(dialect::parse_input(&lines[index]).map(Declaration::Input))
}

fn extract_output(lines: &[String], index: usize) -> Option<Extracted> {
    single(dialect::parse_output(&lines[index]).map(Declaration::Output))
}

/// Classifiers in priority order.
pub const CLASSIFIERS: &[Classifier] = &[
    Classifier {
        name: "texture",
        matches: dialect::is_texture_declaration,
        extract: extract_texture,
    },
    Classifier {
        name: "sampler",
        matches: dialect::is_sampler_declaration,
        extract: extract_sampler,
    },
    Classifier {
        name: "constant buffer",
        matches: dialect::is_constant_buffer_declaration,
        extract: extract_constant_buffer,
    },
    Classifier {
        name: "input",
        matches: dialect::is_input_declaration,
        extract: extract_input,
    },
    Classifier {
        name: "output",
        matches: dialect::is_output_declaration,
        extract: extract_output,
    },
];

/// Classify the line at `index`. `None` means no classifier produced a
/// declaration, either because none matched or because the first matching
/// classifier could not extract one.
pub fn classify(lines: &[String], index: usize) -> Option<Extracted> {
    let line = &lines[index];
    let classifier = CLASSIFIERS.iter().find(|c| (c.matches)(line))?;
    let extracted = (classifier.extract)(lines, index);
    if extracted.is_none() {
        log::trace!(
            "line {} matched the {} classifier but could not be extracted: {:?}",
            index,
            classifier.name,
            line
        );
    }
    extracted
}

/// Parse the declaration header of `lines`.
///
/// Line 0 is the stage marker emitted by the disassembler and is skipped.
pub fn parse(lines: &[String]) -> Declarations {
    let mut declarations = Declarations::default();
    let mut in_body = false;
    let mut index = 1;

    while index < lines.len() {
        let line = &lines[index];

        if line.contains(dialect::SCRATCH_SENTINEL) {
            in_body = true;
        }

        if in_body {
            if dialect::is_discard_instruction(line) {
                log::debug!("discard found at line {index}, shader is opacity masked");
                declarations.opacity_masked = true;
                break;
            }
            index += 1;
            continue;
        }

        match classify(lines, index) {
            Some(extracted) => {
                record(&mut declarations, extracted.declaration);
                index += 1 + extracted.extra_lines;
            }
            None => {
                log::trace!("skipping unrecognized line {index}: {line:?}");
                declarations.skipped.push(SkippedLine {
                    index,
                    text: line.clone(),
                });
                index += 1;
            }
        }
    }

    log::debug!(
        "parsed {} texture(s), {} sampler(s), {} constant buffer(s), {} input(s), {} output(s); {} line(s) skipped",
        declarations.textures.len(),
        declarations.sampler_slots.len(),
        declarations.constant_buffers.len(),
        declarations.inputs.len(),
        declarations.outputs.len(),
        declarations.skipped.len()
    );

    declarations
}

fn record(declarations: &mut Declarations, declaration: Declaration) {
    match declaration {
        Declaration::Texture(texture) => declarations.textures.push(texture),
        Declaration::Sampler(slot) => {
            declarations.sampler_slots.insert(slot);
        }
        Declaration::ConstantBuffer(buffer) => declarations.constant_buffers.push(buffer),
        Declaration::Input(input) => declarations.inputs.push(input),
        Declaration::Output(output) => declarations.outputs.push(output),
    }
}
