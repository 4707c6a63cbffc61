//! Typed error types for hlsl2usf-transpile.
//!
//! A conversion has exactly two hard failure points: reading the source shader
//! and reading the conversion template. Everything between them is permissive
//! and never fails.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranspileError {
    /// The source shader could not be read from disk.
    #[error("Failed to load hlsl file '{}': {source}", path.display())]
    SourceRead {
        /// Path to the shader file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The output conversion template could not be read from disk.
    #[error("Failed to load output conversion template '{}': {source}", path.display())]
    TemplateRead {
        /// Path to the template resource.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl TranspileError {
    /// Path of the file whose read failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            TranspileError::SourceRead { path, .. } | TranspileError::TemplateRead { path, .. } => {
                path
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TranspileError>;
