use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest status code counted as a failed attempt.
const FIRST_ERROR_STATUS: u16 = 400;

/// Failure category of a single attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ErrorKind {
    Timeout,
    ConnectionRefused,
    DnsResolution,
    TlsHandshake,
    ResponseParse,
    HttpStatus,
    Cancelled,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "Timeout",
            ErrorKind::ConnectionRefused => "ConnectionRefused",
            ErrorKind::DnsResolution => "DnsResolution",
            ErrorKind::TlsHandshake => "TlsHandshake",
            ErrorKind::ResponseParse => "ResponseParse",
            ErrorKind::HttpStatus => "HttpStatus",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one attempt. Built once by the worker that made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleRequestResult {
    pub worker: u32,
    pub sequence: u32,
    #[serde(rename = "start_offset_ms", with = "super::serde_millis")]
    pub start_offset: Duration,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "elapsed_ms", with = "super::serde_millis")]
    pub elapsed: Duration,
    pub status_code: Option<u16>,
    pub response_bytes: u64,
    pub error: Option<ErrorKind>,
    pub error_message: Option<String>,
}

impl SingleRequestResult {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Offset from run start at which the attempt finished.
    #[must_use]
    pub fn finished_offset(&self) -> Duration {
        self.start_offset.saturating_add(self.elapsed)
    }
}

/// Where and when an attempt began; turned into a result once it ends.
#[derive(Debug, Clone, Copy)]
pub struct RequestAttempt {
    pub worker: u32,
    pub sequence: u32,
    pub start_offset: Duration,
    pub started_at: DateTime<Utc>,
}

impl RequestAttempt {
    /// A response arrived. Statuses of 400 and above are failures.
    #[must_use]
    pub fn responded(self, status_code: u16, response_bytes: u64, elapsed: Duration) -> SingleRequestResult {
        let (error, error_message) = if status_code >= FIRST_ERROR_STATUS {
            (
                Some(ErrorKind::HttpStatus),
                Some(format!("HTTP status {}", status_code)),
            )
        } else {
            (None, None)
        };
        SingleRequestResult {
            worker: self.worker,
            sequence: self.sequence,
            start_offset: self.start_offset,
            started_at: self.started_at,
            elapsed,
            status_code: Some(status_code),
            response_bytes,
            error,
            error_message,
        }
    }

    #[must_use]
    pub fn failed(self, kind: ErrorKind, message: String, elapsed: Duration) -> SingleRequestResult {
        SingleRequestResult {
            worker: self.worker,
            sequence: self.sequence,
            start_offset: self.start_offset,
            started_at: self.started_at,
            elapsed,
            status_code: None,
            response_bytes: 0,
            error: Some(kind),
            error_message: Some(message),
        }
    }
}
