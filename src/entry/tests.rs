use super::settings::RunSettings;
use crate::args::LoadArgs;
use crate::domain::HttpMethod;
use crate::error::{AppError, ValidationError};
use crate::report::OutputFormat;
use clap::Parser;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

fn parse(args: &[&str]) -> Result<LoadArgs, String> {
    LoadArgs::try_parse_from(std::iter::once("loadbench").chain(args.iter().copied()))
        .map_err(|err| format!("Failed to parse args: {}", err))
}

#[test]
fn settings_map_cli_flags() -> Result<(), String> {
    let args = parse(&[
        "-X",
        "put",
        "-u",
        "http://localhost:8080/x",
        "-H",
        "Accept: text/plain",
        "-d",
        "payload",
        "-c",
        "3",
        "-n",
        "7",
        "--ramp-up",
        "2",
        "--abort-in-flight",
        "--no-follow-redirects",
        "--progress-interval",
        "250ms",
        "--listener-capacity",
        "5",
        "--connect-timeout",
        "2s",
        "-k",
        "-o",
        "json",
    ])?;
    let settings = RunSettings::from_args(&args).map_err(|err| err.to_string())?;

    let request = &settings.request;
    if request.thread_count != 3 || request.iterations_per_thread != 7 || request.ramp_up_seconds != 2 {
        return Err(format!("Unexpected load: {:?}", request));
    }
    if !request.abort_in_flight_on_cancel {
        return Err("abort flag not carried".to_owned());
    }
    let template = &request.template;
    if template.method != HttpMethod::Put
        || template.body != "payload"
        || template.follow_redirects
        || template.headers != vec![("Accept".to_owned(), "text/plain".to_owned())]
    {
        return Err(format!("Unexpected template: {:?}", template));
    }
    if settings.engine.min_publish_interval != Duration::from_millis(250)
        || settings.engine.listener_capacity != 5
    {
        return Err(format!("Unexpected engine config: {:?}", settings.engine));
    }
    if !settings.client.insecure || settings.client.connect_timeout != Duration::from_secs(2) {
        return Err(format!("Unexpected client settings: {:?}", settings.client));
    }
    if settings.output_format != OutputFormat::Json {
        return Err("Unexpected output format".to_owned());
    }
    request.validate().map_err(|err| err.to_string())
}

#[test]
fn missing_url_is_rejected() -> Result<(), String> {
    let args = parse(&[])?;
    match RunSettings::from_args(&args) {
        Err(AppError::Validation(ValidationError::MissingUrl)) => Ok(()),
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(settings) => Err(format!("Expected an error, got {:?}", settings)),
    }
}

#[test]
fn body_is_read_from_data_file() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("body.json");
    fs::write(&path, "{\"id\":1}").map_err(|err| format!("write body failed: {}", err))?;
    let path_str = path.to_string_lossy().into_owned();

    let args = parse(&["-u", "http://localhost", "-D", path_str.as_str()])?;
    let settings = RunSettings::from_args(&args).map_err(|err| err.to_string())?;
    if settings.request.template.body != "{\"id\":1}" {
        return Err(format!("Unexpected body {}", settings.request.template.body));
    }

    let missing = dir.path().join("missing.json").to_string_lossy().into_owned();
    let args = parse(&["-u", "http://localhost", "-D", missing.as_str()])?;
    match RunSettings::from_args(&args) {
        Err(AppError::Io { .. }) => Ok(()),
        other => Err(format!("Expected an I/O error, got {:?}", other.map(|_| ()))),
    }
}
