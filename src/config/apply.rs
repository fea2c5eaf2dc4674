use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{LoadArgs, parse_header};
use crate::error::ConfigError;

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Values given on the
/// command line are kept.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut LoadArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> Result<(), ConfigError> {
    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(parse_header(header).map_err(|err| ConfigError::InvalidHeader { source: err })?);
        }
        args.headers = parsed;
    }

    if !is_cli(matches, "data")
        && !is_cli(matches, "data_file")
        && let Some(data) = config.data.clone()
    {
        args.data = data;
    }

    if !is_cli(matches, "data_file")
        && !is_cli(matches, "data")
        && let Some(path) = config.data_file.clone()
    {
        args.data_file = Some(path);
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout
            .to_duration()
            .map_err(|err| ConfigError::InvalidDuration {
                field: "timeout",
                source: err,
            })?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = timeout
            .to_duration()
            .map_err(|err| ConfigError::InvalidDuration {
                field: "connect_timeout",
                source: err,
            })?;
    }

    if !is_cli(matches, "no_follow_redirects")
        && let Some(follow) = config.follow_redirects
    {
        args.no_follow_redirects = !follow;
    }

    if !is_cli(matches, "thread_count")
        && let Some(threads) = config.threads
    {
        args.thread_count = threads;
    }

    if !is_cli(matches, "iterations_per_thread")
        && let Some(iterations) = config.iterations
    {
        args.iterations_per_thread = iterations;
    }

    if !is_cli(matches, "ramp_up_seconds")
        && let Some(ramp_up) = config.ramp_up
    {
        args.ramp_up_seconds = ramp_up;
    }

    if !is_cli(matches, "abort_in_flight")
        && let Some(abort) = config.abort_in_flight
    {
        args.abort_in_flight = abort;
    }

    if !is_cli(matches, "insecure")
        && let Some(insecure) = config.insecure
    {
        args.insecure = insecure;
    }

    if !is_cli(matches, "progress_interval")
        && let Some(interval) = config.progress_interval.as_ref()
    {
        args.progress_interval = interval
            .to_duration()
            .map_err(|err| ConfigError::InvalidDuration {
                field: "progress_interval",
                source: err,
            })?;
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.output
    {
        args.output_format = format;
    }

    if !is_cli(matches, "include_results")
        && let Some(include) = config.include_results
    {
        args.include_results = include;
    }

    if !is_cli(matches, "listener_capacity")
        && let Some(capacity) = config.engine.as_ref().and_then(|engine| engine.listener_capacity)
    {
        if capacity == 0 {
            return Err(ConfigError::FieldMustBePositive {
                field: "engine.listener_capacity",
            });
        }
        args.listener_capacity = capacity;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}
