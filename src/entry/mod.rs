//! Binary entry: argument parsing, config merge, and one load run.
mod settings;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::{debug, error, info, warn};

use crate::args::LoadArgs;
use crate::config::{apply_config, load_config};
use crate::domain::{ExecutionProgress, ExecutionStatus};
use crate::engine::LoadEngine;
use crate::error::{AppError, AppResult, EngineError};
use crate::executor::ReqwestExecutor;
use crate::report;
use crate::system::logger::init_logging;
use crate::system::signals::shutdown_signal;

use settings::RunSettings;

/// Runs the `loadbench` command line.
///
/// # Errors
///
/// Returns an error when arguments or config are invalid, the run cannot
/// start, the report cannot be rendered, or the run ends as `Failed`.
pub fn run() -> AppResult<()> {
    let (args, matches) = parse_args()?;

    init_logging(args.verbose, args.no_color);

    let outcome = run_with_args(args, &matches);
    if let Err(err) = &outcome {
        error!("{}", err);
    }
    outcome
}

fn run_with_args(mut args: LoadArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }
    let settings = RunSettings::from_args(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(settings))
}

fn parse_args() -> AppResult<(LoadArgs, ArgMatches)> {
    let matches = LoadArgs::command().get_matches();
    let args = LoadArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

async fn run_async(settings: RunSettings) -> AppResult<()> {
    let executor = ReqwestExecutor::new(&settings.client)?;
    let engine = LoadEngine::with_config(Arc::new(executor), settings.engine);
    let (id, _listener) = engine.start_with_listener(settings.request, |progress| log_progress(&progress))?;

    let result = tokio::select! {
        result = engine.wait(&id) => result?,
        () = shutdown_signal() => {
            warn!("Shutdown signal received, cancelling {}", id);
            engine.cancel(&id);
            engine.wait(&id).await?
        }
    };

    let rendered = report::render(&result, settings.output_format, settings.include_results)?;
    print!("{}", rendered);

    if result.status() == ExecutionStatus::Failed {
        let reason = engine
            .failure_reason(&id)
            .unwrap_or_else(|| "unknown failure".to_owned());
        return Err(AppError::engine(EngineError::RunFailed { id, reason }));
    }
    Ok(())
}

fn log_progress(progress: &ExecutionProgress) {
    if progress.is_final {
        debug!(
            "{} final: {}/{} requests",
            progress.execution_id, progress.completed, progress.total_requests
        );
        return;
    }
    info!(
        "{}: {}/{} requests ({} ok, {} failed, avg {}ms, {}s elapsed)",
        progress.execution_id,
        progress.completed,
        progress.total_requests,
        progress.successful,
        progress.failed,
        progress.avg_response_time_ms,
        progress.elapsed.as_secs()
    );
}
