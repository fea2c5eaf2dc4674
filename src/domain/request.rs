use std::time::Duration;

use clap::ValueEnum;
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationErrors};

pub const MIN_THREAD_COUNT: u32 = 1;
pub const MAX_THREAD_COUNT: u32 = 100;
pub const MIN_ITERATIONS_PER_THREAD: u32 = 1;
pub const MAX_ITERATIONS_PER_THREAD: u32 = 10_000;
pub const MAX_TOTAL_REQUESTS: u64 = 100_000;
pub const MAX_RAMP_UP_SECONDS: u32 = 60;

/// Per-request timeout used when a template does not set one.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

/// The request every worker sends on each iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTemplate {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    #[serde(rename = "timeout_ms", with = "super::serde_millis")]
    pub timeout: Duration,
    pub follow_redirects: bool,
}

impl RequestTemplate {
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: String::new(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            follow_redirects: true,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    fn collect_violations(&self, errors: &mut ValidationErrors) {
        match url::Url::parse(&self.url) {
            Ok(parsed) => {
                let scheme = parsed.scheme();
                if scheme != "http" && scheme != "https" {
                    errors.push(ValidationError::UnsupportedScheme {
                        scheme: scheme.to_owned(),
                    });
                }
                if parsed.host_str().is_none_or(str::is_empty) {
                    errors.push(ValidationError::UrlMissingHost {
                        url: self.url.clone(),
                    });
                }
            }
            Err(err) => errors.push(ValidationError::InvalidUrl {
                url: self.url.clone(),
                reason: err.to_string(),
            }),
        }

        for (name, value) in &self.headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                errors.push(ValidationError::InvalidHeaderName {
                    header: name.clone(),
                });
            }
            if HeaderValue::from_str(value).is_err() {
                errors.push(ValidationError::InvalidHeaderValue {
                    header: name.clone(),
                });
            }
        }

        if self.timeout.is_zero() {
            errors.push(ValidationError::TimeoutZero);
        }
    }
}

/// A request template plus the load grid to run it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub template: RequestTemplate,
    pub thread_count: u32,
    pub iterations_per_thread: u32,
    pub ramp_up_seconds: u32,
    /// Race in-flight calls against cancellation and record the loser as
    /// `Cancelled` instead of letting it run to its own timeout.
    #[serde(default)]
    pub abort_in_flight_on_cancel: bool,
}

impl ExecutionRequest {
    #[must_use]
    pub const fn new(template: RequestTemplate, thread_count: u32, iterations_per_thread: u32) -> Self {
        Self {
            template,
            thread_count,
            iterations_per_thread,
            ramp_up_seconds: 0,
            abort_in_flight_on_cancel: false,
        }
    }

    #[must_use]
    pub const fn with_ramp_up(mut self, seconds: u32) -> Self {
        self.ramp_up_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn with_abort_in_flight_on_cancel(mut self, abort: bool) -> Self {
        self.abort_in_flight_on_cancel = abort;
        self
    }

    #[must_use]
    pub fn total_requests(&self) -> u64 {
        u64::from(self.thread_count).saturating_mul(u64::from(self.iterations_per_thread))
    }

    /// Checks every load and template rule.
    ///
    /// # Errors
    ///
    /// Returns all violated rules at once, not only the first.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !(MIN_THREAD_COUNT..=MAX_THREAD_COUNT).contains(&self.thread_count) {
            errors.push(ValidationError::ThreadCountOutOfRange {
                value: self.thread_count,
                min: MIN_THREAD_COUNT,
                max: MAX_THREAD_COUNT,
            });
        }
        if !(MIN_ITERATIONS_PER_THREAD..=MAX_ITERATIONS_PER_THREAD)
            .contains(&self.iterations_per_thread)
        {
            errors.push(ValidationError::IterationsOutOfRange {
                value: self.iterations_per_thread,
                min: MIN_ITERATIONS_PER_THREAD,
                max: MAX_ITERATIONS_PER_THREAD,
            });
        }
        let total = self.total_requests();
        if total > MAX_TOTAL_REQUESTS {
            errors.push(ValidationError::TotalRequestsExceeded {
                total,
                max: MAX_TOTAL_REQUESTS,
            });
        }
        if self.ramp_up_seconds > MAX_RAMP_UP_SECONDS {
            errors.push(ValidationError::RampUpOutOfRange {
                value: self.ramp_up_seconds,
                max: MAX_RAMP_UP_SECONDS,
            });
        }

        self.template.collect_violations(&mut errors);
        errors.into_result()
    }
}
