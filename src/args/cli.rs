use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_header};
use crate::domain::HttpMethod;
use crate::engine::DEFAULT_LISTENER_CAPACITY;
use crate::report::OutputFormat;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Concurrent HTTP load runner - worker pools with ramp-up, live progress, cooperative cancellation, and percentile/throughput/error statistics."
)]
pub struct LoadArgs {
    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// Target URL
    #[arg(long, short)]
    pub url: Option<String>,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body data
    #[arg(long, short, default_value = "")]
    pub data: String,

    /// Request body from file
    #[arg(long = "data-file", short = 'D', conflicts_with = "data")]
    pub data_file: Option<String>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "30s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Connection timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Do not follow HTTP redirects
    #[arg(long = "no-follow-redirects")]
    pub no_follow_redirects: bool,

    /// Number of concurrent workers (1-100)
    #[arg(long = "threads", short = 'c', default_value_t = 1)]
    pub thread_count: u32,

    /// Requests sent by each worker (1-10000)
    #[arg(long = "iterations", short = 'n', default_value_t = 1)]
    pub iterations_per_thread: u32,

    /// Seconds over which worker starts are spread (0-60)
    #[arg(long = "ramp-up", default_value_t = 0)]
    pub ramp_up_seconds: u32,

    /// Record requests still in flight at cancellation as cancelled instead of waiting for them
    #[arg(long = "abort-in-flight")]
    pub abort_in_flight: bool,

    /// Accept invalid TLS certificates and host names
    #[arg(long = "insecure", short = 'k')]
    pub insecure: bool,

    /// Minimum time between progress log lines (supports ms/s/m/h)
    #[arg(long = "progress-interval", default_value = "1s", value_parser = parse_duration_arg)]
    pub progress_interval: Duration,

    /// Progress snapshots queued per listener before newer ones are dropped
    #[arg(long = "listener-capacity", default_value_t = DEFAULT_LISTENER_CAPACITY)]
    pub listener_capacity: usize,

    /// Report format
    #[arg(long = "output", short = 'o', value_enum, default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Include every request in JSON output
    #[arg(long = "include-results")]
    pub include_results: bool,

    /// Path to config file (TOML/JSON). Defaults to ./loadbench.toml or ./loadbench.json
    #[arg(long)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
