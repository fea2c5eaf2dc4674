use std::fmt::Write as _;
use std::time::Duration;

use crate::error::ReportError;

pub(super) fn write_line(output: &mut String, line: &str) -> Result<(), ReportError> {
    writeln!(output, "{}", line).map_err(|err| ReportError::WriteLine { source: err })
}

pub(super) fn format_x100(value: u64) -> String {
    format!("{}.{:02}", value / 100, value % 100)
}

pub(super) fn format_ms(value: Duration) -> String {
    format!("{}ms", value.as_millis())
}

/// Seconds with two decimals, e.g. `1.50s`.
pub(super) fn format_secs(value: Duration) -> String {
    let centis = u64::try_from(value.as_millis() / 10).unwrap_or(u64::MAX);
    format!("{}s", format_x100(centis))
}
