use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Method, redirect};
use tokio::time::Instant;
use tracing::debug;

use super::{ExecutorResponse, RequestExecutor, classify_error};
use crate::domain::{ErrorKind, HttpMethod, RequestTemplate};
use crate::error::{HttpError, SendError};

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("loadbench/", env!("CARGO_PKG_VERSION"));
/// Redirect hops followed when a template allows redirects.
const REDIRECT_LIMIT: usize = 10;

/// Client-wide knobs shared by every request of a run.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub insecure: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            insecure: false,
        }
    }
}

/// Default executor backed by two pooled reqwest clients, one per redirect
/// policy.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    follow: Client,
    no_follow: Client,
}

impl ReqwestExecutor {
    /// Builds the underlying clients.
    ///
    /// # Errors
    ///
    /// Returns an error when reqwest cannot build a client (for example,
    /// TLS backend initialization fails).
    pub fn new(settings: &ClientSettings) -> Result<Self, HttpError> {
        let follow = build_client(settings, redirect::Policy::limited(REDIRECT_LIMIT))?;
        let no_follow = build_client(settings, redirect::Policy::none())?;
        Ok(Self { follow, no_follow })
    }

    const fn client(&self, follow_redirects: bool) -> &Client {
        if follow_redirects {
            &self.follow
        } else {
            &self.no_follow
        }
    }
}

fn build_client(settings: &ClientSettings, policy: redirect::Policy) -> Result<Client, HttpError> {
    let mut builder = Client::builder()
        .connect_timeout(settings.connect_timeout)
        .user_agent(settings.user_agent.as_str())
        .redirect(policy);
    if settings.insecure {
        builder = builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }
    builder
        .build()
        .map_err(|err| HttpError::BuildClientFailed { source: err })
}

const fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

#[async_trait]
impl RequestExecutor for ReqwestExecutor {
    async fn send(
        &self,
        request: &RequestTemplate,
        timeout: Duration,
    ) -> Result<ExecutorResponse, SendError> {
        let client = self.client(request.follow_redirects);
        let mut builder = client
            .request(to_method(request.method), request.url.as_str())
            .timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }
        let built = builder.build().map_err(|err| SendError::Unavailable {
            reason: format!("Failed to build request: {}", err),
        })?;

        let start = Instant::now();
        let response = client
            .execute(built)
            .await
            .map_err(|err| request_failure(&err, start.elapsed()))?;
        let status_code = response.status().as_u16();
        let body_bytes = drain_response_body(response)
            .await
            .map_err(|err| body_failure(&err, start.elapsed()))?;

        Ok(ExecutorResponse {
            status_code,
            body_bytes,
            elapsed: start.elapsed(),
        })
    }
}

fn request_failure(err: &reqwest::Error, elapsed: Duration) -> SendError {
    let kind = classify_reqwest_error(err);
    debug!("Request failed ({}): {}", kind, err);
    SendError::request(kind, err.to_string(), elapsed)
}

fn body_failure(err: &reqwest::Error, elapsed: Duration) -> SendError {
    let kind = if err.is_timeout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::ResponseParse
    };
    debug!("Failed to read response body ({}): {}", kind, err);
    SendError::request(kind, err.to_string(), elapsed)
}

pub(super) fn classify_reqwest_error(err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        return ErrorKind::Timeout;
    }
    if err.is_decode() || err.is_body() {
        return ErrorKind::ResponseParse;
    }
    match classify_error(err) {
        ErrorKind::Unknown if err.is_connect() => ErrorKind::ConnectionRefused,
        kind => kind,
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
