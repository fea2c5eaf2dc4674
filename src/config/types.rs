use std::time::Duration;

use serde::Deserialize;

use crate::domain::HttpMethod;
use crate::error::ValidationError;
use crate::report::OutputFormat;

/// Settings accepted from `loadbench.toml` / `loadbench.json`. Every field
/// is optional; command-line flags win over file values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    /// Headers in `Key: Value` form.
    pub headers: Option<Vec<String>>,
    pub data: Option<String>,
    pub data_file: Option<String>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub follow_redirects: Option<bool>,
    pub threads: Option<u32>,
    pub iterations: Option<u32>,
    pub ramp_up: Option<u32>,
    pub abort_in_flight: Option<bool>,
    pub insecure: Option<bool>,
    pub progress_interval: Option<DurationValue>,
    pub output: Option<OutputFormat>,
    pub include_results: Option<bool>,
    pub engine: Option<EngineSection>,
}

/// Tuning of the engine itself rather than of one run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Queued snapshots per progress listener.
    pub listener_capacity: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
