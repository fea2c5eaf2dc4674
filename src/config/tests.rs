use super::types::{ConfigFile, DurationValue};
use super::{apply_config, load_config_file, parse_duration_value};
use crate::args::LoadArgs;
use crate::domain::HttpMethod;
use crate::error::{AppError, ConfigError, ValidationError};
use crate::report::OutputFormat;
use clap::{ArgMatches, CommandFactory, FromArgMatches};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

fn parse_with_matches(args: &[&str]) -> Result<(LoadArgs, ArgMatches), String> {
    let matches = LoadArgs::command()
        .try_get_matches_from(std::iter::once("loadbench").chain(args.iter().copied()))
        .map_err(|err| format!("Failed to parse args: {}", err))?;
    let parsed = LoadArgs::from_arg_matches(&matches)
        .map_err(|err| format!("Failed to build args: {}", err))?;
    Ok((parsed, matches))
}

fn write_config(name: &str, content: &str) -> Result<(tempfile::TempDir, std::path::PathBuf), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join(name);
    fs::write(&path, content).map_err(|err| format!("write config failed: {}", err))?;
    Ok((dir, path))
}

#[test]
fn parse_duration_value_accepts_units() -> Result<(), String> {
    let cases = [
        ("10s", Duration::from_secs(10)),
        ("500ms", Duration::from_millis(500)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3_600)),
        (" 3 ", Duration::from_secs(3)),
    ];
    for (raw, expected) in cases {
        let parsed = parse_duration_value(raw).map_err(|err| format!("{}: {}", raw, err))?;
        if parsed != expected {
            return Err(format!("{} parsed as {:?}", raw, parsed));
        }
    }
    Ok(())
}

#[test]
fn parse_duration_value_reports_reason() -> Result<(), String> {
    let cases = [
        ("", ValidationError::DurationEmpty),
        (
            "abc",
            ValidationError::InvalidDurationFormat {
                value: "abc".to_owned(),
            },
        ),
        (
            "5d",
            ValidationError::InvalidDurationUnit {
                unit: "d".to_owned(),
            },
        ),
        ("0ms", ValidationError::DurationZero),
        ("99999999999999999999h", ValidationError::InvalidDurationNumber {
            value: "99999999999999999999h".to_owned(),
            reason: "number too large to fit in target type".to_owned(),
        }),
        ("18446744073709551615h", ValidationError::DurationOverflow),
    ];
    for (raw, expected) in cases {
        match parse_duration_value(raw) {
            Err(err) if err == expected => {}
            other => return Err(format!("'{}' gave {:?}", raw, other)),
        }
    }
    Ok(())
}

#[test]
fn duration_value_accepts_seconds_or_text() -> Result<(), String> {
    let secs = DurationValue::Seconds(4)
        .to_duration()
        .map_err(|err| err.to_string())?;
    let text = DurationValue::Text("250ms".to_owned())
        .to_duration()
        .map_err(|err| err.to_string())?;
    if secs != Duration::from_secs(4) || text != Duration::from_millis(250) {
        return Err(format!("Unexpected durations {:?} {:?}", secs, text));
    }
    if DurationValue::Seconds(0).to_duration().is_ok() {
        return Err("Zero seconds must be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn load_toml_config() -> Result<(), String> {
    let (_dir, path) = write_config(
        "loadbench.toml",
        r#"
method = "post"
url = "http://localhost:9000/items"
headers = ["Content-Type: application/json"]
data = "{}"
timeout = "2s"
connect_timeout = 3
threads = 4
iterations = 50
ramp_up = 2
output = "json"

[engine]
listener_capacity = 8
"#,
    )?;
    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.method != Some(HttpMethod::Post) || config.threads != Some(4) {
        return Err(format!("Unexpected config: {:?}", config));
    }
    if config.output != Some(OutputFormat::Json) {
        return Err(format!("Unexpected output: {:?}", config.output));
    }
    if config.engine.and_then(|engine| engine.listener_capacity) != Some(8) {
        return Err("Missing engine section".to_owned());
    }
    Ok(())
}

#[test]
fn load_json_config() -> Result<(), String> {
    let (_dir, path) = write_config(
        "loadbench.json",
        r#"{"url": "http://localhost", "iterations": 3, "timeout": "750ms", "follow_redirects": false}"#,
    )?;
    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.url.as_deref() != Some("http://localhost") || config.iterations != Some(3) {
        return Err(format!("Unexpected config: {:?}", config));
    }
    if config.follow_redirects != Some(false) {
        return Err("follow_redirects not parsed".to_owned());
    }
    Ok(())
}

#[test]
fn unknown_fields_and_extensions_are_rejected() -> Result<(), String> {
    let (_dir, path) = write_config("loadbench.toml", "threadz = 4\n")?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::ParseToml { .. })) => {}
        other => return Err(format!("Expected a TOML error, got {:?}", other.map(|_| ()))),
    }

    let (_dir, path) = write_config("loadbench.yaml", "threads: 4\n")?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => {}
        other => return Err(format!("Expected an extension error, got {:?}", other.map(|_| ()))),
    }

    let (_dir, path) = write_config("loadbench", "threads = 4\n")?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::MissingExtension)) => Ok(()),
        other => Err(format!("Expected a missing extension error, got {:?}", other.map(|_| ()))),
    }
}

#[test]
fn config_fills_unset_options() -> Result<(), String> {
    let (mut args, matches) = parse_with_matches(&[])?;
    let config = ConfigFile {
        method: Some(HttpMethod::Put),
        url: Some("http://localhost:8080".to_owned()),
        headers: Some(vec!["X-Env: test".to_owned()]),
        timeout: Some(DurationValue::Text("5s".to_owned())),
        follow_redirects: Some(false),
        threads: Some(6),
        iterations: Some(20),
        ramp_up: Some(3),
        abort_in_flight: Some(true),
        progress_interval: Some(DurationValue::Seconds(2)),
        output: Some(OutputFormat::Json),
        ..ConfigFile::default()
    };
    apply_config(&mut args, &matches, &config).map_err(|err| err.to_string())?;

    if args.method != HttpMethod::Put || args.url.as_deref() != Some("http://localhost:8080") {
        return Err(format!("Unexpected target: {:?}", args));
    }
    if args.headers != vec![("X-Env".to_owned(), "test".to_owned())] {
        return Err(format!("Unexpected headers: {:?}", args.headers));
    }
    if args.thread_count != 6 || args.iterations_per_thread != 20 || args.ramp_up_seconds != 3 {
        return Err(format!("Unexpected load: {:?}", args));
    }
    if args.request_timeout != Duration::from_secs(5)
        || args.progress_interval != Duration::from_secs(2)
    {
        return Err(format!("Unexpected durations: {:?}", args));
    }
    if !args.no_follow_redirects || !args.abort_in_flight || args.output_format != OutputFormat::Json {
        return Err(format!("Unexpected flags: {:?}", args));
    }
    Ok(())
}

#[test]
fn cli_flags_win_over_config() -> Result<(), String> {
    let (mut args, matches) =
        parse_with_matches(&["-u", "http://cli.local", "-c", "2", "--timeout", "1s"])?;
    let config = ConfigFile {
        url: Some("http://config.local".to_owned()),
        threads: Some(9),
        iterations: Some(7),
        timeout: Some(DurationValue::Seconds(60)),
        ..ConfigFile::default()
    };
    apply_config(&mut args, &matches, &config).map_err(|err| err.to_string())?;

    if args.url.as_deref() != Some("http://cli.local") || args.thread_count != 2 {
        return Err(format!("CLI values were overridden: {:?}", args));
    }
    if args.request_timeout != Duration::from_secs(1) {
        return Err(format!("CLI timeout was overridden: {:?}", args.request_timeout));
    }
    if args.iterations_per_thread != 7 {
        return Err("Unset CLI option should come from config".to_owned());
    }
    Ok(())
}

#[test]
fn invalid_config_values_are_reported() -> Result<(), String> {
    let (mut args, matches) = parse_with_matches(&[])?;
    let config = ConfigFile {
        headers: Some(vec!["no delimiter".to_owned()]),
        ..ConfigFile::default()
    };
    match apply_config(&mut args, &matches, &config) {
        Err(ConfigError::InvalidHeader { .. }) => {}
        other => return Err(format!("Expected a header error, got {:?}", other)),
    }

    let config = ConfigFile {
        timeout: Some(DurationValue::Text("soon".to_owned())),
        ..ConfigFile::default()
    };
    match apply_config(&mut args, &matches, &config) {
        Err(ConfigError::InvalidDuration {
            field: "timeout", ..
        }) => Ok(()),
        other => Err(format!("Expected a duration error, got {:?}", other)),
    }
}
