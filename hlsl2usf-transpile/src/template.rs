use std::path::Path;

use crate::error::{Result, TranspileError};

/// The output-conversion boilerplate appended inside the wrapper function.
///
/// It maps the render-target scratch outputs (`o0`, `o1`, `o2`) onto the
/// material attributes and returns them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTemplate {
    lines: Vec<String>,
}

impl ConversionTemplate {
    /// Read the template from disk. Unreadable templates are an error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            log::error!(
                "failed to load output conversion template {}: {}",
                path.display(),
                source
            );
            TranspileError::TemplateRead {
                path: path.to_path_buf(),
                source,
            }
        })?;
        log::debug!("loaded conversion template from {}", path.display());
        Ok(Self::from_text(&text))
    }

    /// Build a template from text. Empty lines are dropped; `\r\n` and `\n`
    /// terminators are both accepted.
    pub fn from_text(text: &str) -> Self {
        let lines = text
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
