use super::*;
use crate::domain::HttpMethod;
use crate::error::ValidationError;
use crate::report::OutputFormat;
use clap::Parser;
use std::time::Duration;

fn parse(args: &[&str]) -> Result<LoadArgs, String> {
    LoadArgs::try_parse_from(std::iter::once("loadbench").chain(args.iter().copied()))
        .map_err(|err| format!("Failed to parse args: {}", err))
}

#[test]
fn parse_header_valid() -> Result<(), String> {
    let (key, value) = parse_header("Content-Type: application/json")
        .map_err(|err| format!("Expected Ok, got Err: {}", err))?;
    if key != "Content-Type" || value != "application/json" {
        return Err(format!("Unexpected header {}: {}", key, value));
    }
    let (key, value) =
        parse_header("X-Token:a:b").map_err(|err| format!("Expected Ok, got Err: {}", err))?;
    if key != "X-Token" || value != "a:b" {
        return Err(format!("Only the first ':' splits: {}: {}", key, value));
    }
    Ok(())
}

#[test]
fn parse_header_invalid() -> Result<(), String> {
    for raw in ["MissingDelimiter", ": no-name"] {
        match parse_header(raw) {
            Err(ValidationError::InvalidHeaderFormat { value }) if value == raw => {}
            other => return Err(format!("Unexpected result for '{}': {:?}", raw, other)),
        }
    }
    Ok(())
}

#[test]
fn parse_duration_arg_accepts_units() -> Result<(), String> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("5s", Duration::from_secs(5)),
        ("7", Duration::from_secs(7)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3_600)),
    ];
    for (raw, expected) in cases {
        let parsed = parse_duration_arg(raw).map_err(|err| format!("{}: {}", raw, err))?;
        if parsed != expected {
            return Err(format!("{} parsed as {:?}", raw, parsed));
        }
    }
    for raw in ["", "ms", "10d", "0s"] {
        if parse_duration_arg(raw).is_ok() {
            return Err(format!("Expected '{}' to be rejected", raw));
        }
    }
    Ok(())
}

#[test]
fn defaults_apply() -> Result<(), String> {
    let args = parse(&["-u", "http://localhost"])?;
    if args.method != HttpMethod::Get
        || args.thread_count != 1
        || args.iterations_per_thread != 1
        || args.ramp_up_seconds != 0
    {
        return Err(format!("Unexpected defaults: {:?}", args));
    }
    if args.request_timeout != Duration::from_secs(30)
        || args.connect_timeout != Duration::from_secs(10)
        || args.progress_interval != Duration::from_secs(1)
    {
        return Err(format!("Unexpected duration defaults: {:?}", args));
    }
    if args.output_format != OutputFormat::Text || args.no_follow_redirects || args.abort_in_flight {
        return Err(format!("Unexpected flag defaults: {:?}", args));
    }
    Ok(())
}

#[test]
fn load_options_parse() -> Result<(), String> {
    let args = parse(&[
        "-X",
        "POST",
        "-u",
        "https://api.example.com/items",
        "-H",
        "Content-Type: application/json",
        "-H",
        "X-Run: 1",
        "-d",
        "{\"a\":1}",
        "-c",
        "8",
        "-n",
        "250",
        "--ramp-up",
        "4",
        "--timeout",
        "750ms",
        "--abort-in-flight",
        "--no-follow-redirects",
        "-o",
        "json",
        "--include-results",
    ])?;
    if args.method != HttpMethod::Post || args.url.as_deref() != Some("https://api.example.com/items") {
        return Err(format!("Unexpected target: {:?}", args));
    }
    if args.headers.len() != 2 || args.data != "{\"a\":1}" {
        return Err(format!("Unexpected request parts: {:?}", args));
    }
    if args.thread_count != 8 || args.iterations_per_thread != 250 || args.ramp_up_seconds != 4 {
        return Err(format!("Unexpected load: {:?}", args));
    }
    if args.request_timeout != Duration::from_millis(750) {
        return Err(format!("Unexpected timeout {:?}", args.request_timeout));
    }
    if !args.abort_in_flight || !args.no_follow_redirects || !args.include_results {
        return Err(format!("Unexpected flags: {:?}", args));
    }
    if args.output_format != OutputFormat::Json {
        return Err(format!("Unexpected output {:?}", args.output_format));
    }
    Ok(())
}

#[test]
fn data_and_data_file_conflict() -> Result<(), String> {
    match parse(&["-u", "http://localhost", "-d", "x", "-D", "body.json"]) {
        Ok(args) => Err(format!("Expected a conflict, got {:?}", args)),
        Err(_) => Ok(()),
    }
}

#[test]
fn invalid_header_is_rejected_by_cli() -> Result<(), String> {
    match parse(&["-u", "http://localhost", "-H", "broken"]) {
        Ok(args) => Err(format!("Expected a header error, got {:?}", args)),
        Err(_) => Ok(()),
    }
}
