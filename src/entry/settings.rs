use crate::args::LoadArgs;
use crate::domain::{ExecutionRequest, RequestTemplate};
use crate::engine::EngineConfig;
use crate::error::{AppError, AppResult, ValidationError};
use crate::executor::ClientSettings;
use crate::report::OutputFormat;

/// Everything one CLI run needs, resolved from flags and config.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub(crate) request: ExecutionRequest,
    pub(crate) engine: EngineConfig,
    pub(crate) client: ClientSettings,
    pub(crate) output_format: OutputFormat,
    pub(crate) include_results: bool,
}

impl RunSettings {
    pub(crate) fn from_args(args: &LoadArgs) -> AppResult<Self> {
        let Some(url) = args.url.clone() else {
            return Err(AppError::validation(ValidationError::MissingUrl));
        };
        let body = match args.data_file.as_deref() {
            Some(path) => std::fs::read_to_string(path)?,
            None => args.data.clone(),
        };

        let template = args.headers.iter().fold(
            RequestTemplate::new(args.method, url)
                .with_body(body)
                .with_timeout(args.request_timeout)
                .with_follow_redirects(!args.no_follow_redirects),
            |template, (name, value)| template.with_header(name.as_str(), value.as_str()),
        );
        let request =
            ExecutionRequest::new(template, args.thread_count, args.iterations_per_thread)
                .with_ramp_up(args.ramp_up_seconds)
                .with_abort_in_flight_on_cancel(args.abort_in_flight);

        Ok(Self {
            request,
            engine: EngineConfig {
                listener_capacity: args.listener_capacity,
                min_publish_interval: args.progress_interval,
            },
            client: ClientSettings {
                connect_timeout: args.connect_timeout,
                insecure: args.insecure,
                ..ClientSettings::default()
            },
            output_format: args.output_format,
            include_results: args.include_results,
        })
    }
}
