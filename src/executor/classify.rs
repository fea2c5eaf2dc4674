use std::error::Error as StdError;
use std::io;

use crate::domain::ErrorKind;

const DNS_MARKERS: [&str; 5] = [
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
    "nodename nor servname",
];
const TLS_MARKERS: [&str; 5] = ["tls", "ssl", "certificate", "handshake", "x509"];
const REFUSED_MARKERS: [&str; 2] = ["connection refused", "actively refused"];
const TIMEOUT_MARKERS: [&str; 2] = ["timed out", "deadline has elapsed"];

/// Walks an error and its sources and picks the first matching category.
#[must_use]
pub fn classify_error(error: &(dyn StdError + 'static)) -> ErrorKind {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>()
            && let Some(kind) = classify_io_kind(io_err.kind())
        {
            return kind;
        }
        current = err.source();
    }

    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = current {
        if let Some(kind) = classify_message(&err.to_string()) {
            return kind;
        }
        current = err.source();
    }
    ErrorKind::Unknown
}

/// Matches well-known transport failure phrases.
#[must_use]
pub fn classify_message(message: &str) -> Option<ErrorKind> {
    let lower = message.to_ascii_lowercase();
    let contains_any = |markers: &[&str]| markers.iter().any(|marker| lower.contains(marker));

    if contains_any(&DNS_MARKERS) {
        Some(ErrorKind::DnsResolution)
    } else if contains_any(&REFUSED_MARKERS) {
        Some(ErrorKind::ConnectionRefused)
    } else if contains_any(&TIMEOUT_MARKERS) {
        Some(ErrorKind::Timeout)
    } else if contains_any(&TLS_MARKERS) {
        Some(ErrorKind::TlsHandshake)
    } else {
        None
    }
}

const fn classify_io_kind(kind: io::ErrorKind) -> Option<ErrorKind> {
    match kind {
        io::ErrorKind::ConnectionRefused => Some(ErrorKind::ConnectionRefused),
        io::ErrorKind::TimedOut => Some(ErrorKind::Timeout),
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            Some(ErrorKind::ResponseParse)
        }
        _ => None,
    }
}
