use super::format::{format_ms, format_secs, format_x100, write_line};
use crate::error::ReportError;
use crate::stats::EnhancedConcurrentResult;

/// Plain-text summary of a run, one fact per line.
///
/// # Errors
///
/// Returns an error when a line cannot be written.
pub fn render_text(result: &EnhancedConcurrentResult) -> Result<String, ReportError> {
    let base = &result.base;
    let mut output = String::new();

    write_line(&mut output, &format!("Execution: {}", base.execution_id))?;
    write_line(&mut output, &format!("Status: {}", base.status))?;
    write_line(&mut output, &format!("Duration: {}", format_secs(base.duration)))?;
    write_line(
        &mut output,
        &format!(
            "Load: {} threads x {} iterations ({} requests)",
            base.thread_count, base.iterations_per_thread, base.total_requests
        ),
    )?;
    write_line(&mut output, &format!("Completed: {}", base.completed))?;
    write_line(
        &mut output,
        &format!(
            "Successful: {} ({}%)",
            base.successful,
            format_x100(result.success_rate_x100)
        ),
    )?;
    write_line(
        &mut output,
        &format!(
            "Failed: {} ({}%)",
            base.failed,
            format_x100(result.failure_rate_x100)
        ),
    )?;
    write_line(
        &mut output,
        &format!(
            "Response Time (min/avg/max): {} / {} / {}",
            format_ms(base.min_response_time),
            format_ms(base.avg_response_time),
            format_ms(base.max_response_time)
        ),
    )?;
    write_line(
        &mut output,
        &format!(
            "Percentiles (p50/p95/p99): {} / {} / {}",
            format_ms(result.percentiles.p50),
            format_ms(result.percentiles.p95),
            format_ms(result.percentiles.p99)
        ),
    )?;
    write_line(
        &mut output,
        &format!(
            "Throughput: {} req/s, {} B/s",
            format_x100(result.throughput.requests_per_sec_x100),
            result.throughput.bytes_per_sec
        ),
    )?;
    write_line(&mut output, &format!("Data Received: {} bytes", base.total_bytes))?;

    if !result.error_breakdown.is_empty() {
        write_line(&mut output, "Errors:")?;
        for entry in &result.error_breakdown {
            write_line(
                &mut output,
                &format!(
                    "  {}: {} ({}%)",
                    entry.kind,
                    entry.count,
                    format_x100(entry.percent_x100)
                ),
            )?;
        }
    }

    Ok(output)
}
