//! The single-request executor seam and its reqwest implementation.
mod classify;
mod reqwest_executor;


use std::time::Duration;

use async_trait::async_trait;

use crate::domain::RequestTemplate;
use crate::error::SendError;

pub use classify::{classify_error, classify_message};
pub use reqwest_executor::{ClientSettings, ReqwestExecutor};

/// A response that made it back, whatever its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorResponse {
    pub status_code: u16,
    pub body_bytes: u64,
    pub elapsed: Duration,
}

/// Sends one request. Implementations must be safe to call from many
/// workers at once.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Sends `request`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Request`] for a failed attempt and
    /// [`SendError::Unavailable`] when no request can be served at all.
    async fn send(
        &self,
        request: &RequestTemplate,
        timeout: Duration,
    ) -> Result<ExecutorResponse, SendError>;
}
