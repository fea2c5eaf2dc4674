use crate::error::ReportError;
use crate::stats::EnhancedConcurrentResult;

/// JSON document of a run. Without `include_results` the per-request log is
/// left out and only aggregates remain.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn render_json(
    result: &EnhancedConcurrentResult,
    pretty: bool,
    include_results: bool,
) -> Result<String, ReportError> {
    let mut value =
        serde_json::to_value(result).map_err(|err| ReportError::Serialize { source: err })?;
    if !include_results
        && let Some(base) = value.get_mut("base").and_then(serde_json::Value::as_object_mut)
    {
        base.remove("results");
    }
    let rendered = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    rendered.map_err(|err| ReportError::Serialize { source: err })
}
