//! Human and machine renderings of a finished run.
mod format;
mod json;
mod text;


use clap::ValueEnum;
use serde::Deserialize;

use crate::error::ReportError;
use crate::stats::EnhancedConcurrentResult;

pub use json::render_json;
pub use text::render_text;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Renders `result` in the chosen format. JSON output is pretty-printed and
/// carries per-request results only when `include_results` is set.
///
/// # Errors
///
/// Returns an error when formatting or serialization fails.
pub fn render(
    result: &EnhancedConcurrentResult,
    format: OutputFormat,
    include_results: bool,
) -> Result<String, ReportError> {
    match format {
        OutputFormat::Text => render_text(result),
        OutputFormat::Json => render_json(result, true, include_results),
    }
}
