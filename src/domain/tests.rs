use super::*;
use crate::error::ValidationError;
use chrono::{TimeZone, Utc};
use std::time::Duration;

fn template() -> RequestTemplate {
    RequestTemplate::new(HttpMethod::Get, "http://localhost:8080/health")
}

fn attempt() -> RequestAttempt {
    RequestAttempt {
        worker: 2,
        sequence: 7,
        start_offset: Duration::from_millis(120),
        started_at: Utc::now(),
    }
}

#[test]
fn valid_request_passes() -> Result<(), String> {
    let request = ExecutionRequest::new(template(), MAX_THREAD_COUNT, 1_000);
    request
        .validate()
        .map_err(|err| format!("Expected valid request: {}", err))?;
    if request.total_requests() != MAX_TOTAL_REQUESTS {
        return Err(format!("Unexpected total {}", request.total_requests()));
    }
    Ok(())
}

#[test]
fn validation_collects_every_violation() -> Result<(), String> {
    let request = ExecutionRequest::new(
        RequestTemplate::new(HttpMethod::Post, "ftp://files.example")
            .with_header("bad header", "x")
            .with_timeout(Duration::ZERO),
        0,
        0,
    )
    .with_ramp_up(61);

    let errors = match request.validate() {
        Ok(()) => return Err("Expected validation errors".to_owned()),
        Err(errors) => errors,
    };
    let expected = vec![
        ValidationError::ThreadCountOutOfRange {
            value: 0,
            min: MIN_THREAD_COUNT,
            max: MAX_THREAD_COUNT,
        },
        ValidationError::IterationsOutOfRange {
            value: 0,
            min: MIN_ITERATIONS_PER_THREAD,
            max: MAX_ITERATIONS_PER_THREAD,
        },
        ValidationError::RampUpOutOfRange {
            value: 61,
            max: MAX_RAMP_UP_SECONDS,
        },
        ValidationError::UnsupportedScheme {
            scheme: "ftp".to_owned(),
        },
        ValidationError::InvalidHeaderName {
            header: "bad header".to_owned(),
        },
        ValidationError::TimeoutZero,
    ];
    let actual: Vec<ValidationError> = errors.iter().cloned().collect();
    if actual != expected {
        return Err(format!("Unexpected errors: {:?}", actual));
    }
    if errors.messages().len() != expected.len() {
        return Err("Each violation needs its own message".to_owned());
    }
    Ok(())
}

#[test]
fn header_values_with_control_characters_are_rejected() -> Result<(), String> {
    let request = ExecutionRequest::new(
        template()
            .with_header("X-Trace", "bad\nvalue")
            .with_header("Accept", "text/plain"),
        1,
        1,
    );
    let errors = match request.validate() {
        Ok(()) => return Err("Expected the header value to be rejected".to_owned()),
        Err(errors) => errors,
    };
    let actual: Vec<ValidationError> = errors.iter().cloned().collect();
    let expected = vec![ValidationError::InvalidHeaderValue {
        header: "X-Trace".to_owned(),
    }];
    if actual != expected {
        return Err(format!("Unexpected errors: {:?}", actual));
    }
    if errors.to_string() != "Invalid value for header 'X-Trace'." {
        return Err(format!("Unexpected message: {}", errors));
    }
    Ok(())
}

#[test]
fn total_request_cap_is_enforced() -> Result<(), String> {
    let request = ExecutionRequest::new(template(), 11, MAX_ITERATIONS_PER_THREAD);
    let errors = match request.validate() {
        Ok(()) => return Err("Expected the total cap to trip".to_owned()),
        Err(errors) => errors,
    };
    match errors.iter().collect::<Vec<_>>().as_slice() {
        [ValidationError::TotalRequestsExceeded { total: 110_000, .. }] => Ok(()),
        other => Err(format!("Unexpected errors: {:?}", other)),
    }
}

#[test]
fn unparsable_url_is_reported() -> Result<(), String> {
    let request = ExecutionRequest::new(RequestTemplate::new(HttpMethod::Get, "not a url"), 1, 1);
    let errors = match request.validate() {
        Ok(()) => return Err("Expected an invalid URL".to_owned()),
        Err(errors) => errors,
    };
    if !errors
        .iter()
        .any(|err| matches!(err, ValidationError::InvalidUrl { .. }))
    {
        return Err(format!("Unexpected errors: {}", errors));
    }
    Ok(())
}

#[test]
fn error_statuses_count_as_failures() -> Result<(), String> {
    let ok = attempt().responded(204, 0, Duration::from_millis(5));
    if !ok.is_success() || ok.status_code != Some(204) {
        return Err(format!("Expected success: {:?}", ok));
    }

    let not_found = attempt().responded(404, 9, Duration::from_millis(5));
    if not_found.is_success() || not_found.error != Some(ErrorKind::HttpStatus) {
        return Err(format!("Expected HttpStatus failure: {:?}", not_found));
    }
    if not_found.error_message.as_deref() != Some("HTTP status 404") {
        return Err(format!("Unexpected message {:?}", not_found.error_message));
    }
    if not_found.response_bytes != 9 {
        return Err("Bytes of error responses still count".to_owned());
    }
    Ok(())
}

#[test]
fn failed_attempt_keeps_position_and_timing() -> Result<(), String> {
    let result = attempt().failed(
        ErrorKind::ConnectionRefused,
        "connection refused".to_owned(),
        Duration::from_millis(3),
    );
    if result.worker != 2 || result.sequence != 7 || result.status_code.is_some() {
        return Err(format!("Unexpected result: {:?}", result));
    }
    if result.finished_offset() != Duration::from_millis(123) {
        return Err(format!("Unexpected finish offset {:?}", result.finished_offset()));
    }
    Ok(())
}

#[test]
fn status_transitions_only_move_forward() -> Result<(), String> {
    use ExecutionStatus::{Cancelled, Cancelling, Completed, Failed, Pending, Running};

    let allowed = [
        (Pending, Running),
        (Running, Cancelling),
        (Running, Completed),
        (Running, Failed),
        (Cancelling, Cancelled),
        (Cancelling, Failed),
    ];
    for (from, to) in allowed {
        if !from.can_transition_to(to) {
            return Err(format!("{} -> {} should be allowed", from, to));
        }
    }

    let refused = [
        (Running, Pending),
        (Cancelling, Running),
        (Cancelling, Completed),
        (Completed, Running),
        (Completed, Cancelled),
        (Failed, Completed),
        (Cancelled, Cancelling),
    ];
    for (from, to) in refused {
        if from.can_transition_to(to) {
            return Err(format!("{} -> {} should be refused", from, to));
        }
    }

    if Running.is_terminal() || !Cancelled.is_terminal() {
        return Err("Unexpected terminal flags".to_owned());
    }
    Ok(())
}

#[test]
fn execution_id_embeds_sequence_and_time() -> Result<(), String> {
    let created_at = Utc
        .timestamp_millis_opt(1_700_000_000_123)
        .single()
        .ok_or("Invalid timestamp")?;
    let id = ExecutionId::new(4, created_at);
    if id.as_str() != "exec-4-1700000000123" {
        return Err(format!("Unexpected id {}", id));
    }
    Ok(())
}

#[test]
fn request_deserializes_from_json() -> Result<(), String> {
    let json = r#"{
        "template": {
            "method": "post",
            "url": "https://api.example.com/items",
            "headers": [["Content-Type", "application/json"]],
            "body": "{}",
            "timeout_ms": 2500,
            "follow_redirects": false
        },
        "thread_count": 4,
        "iterations_per_thread": 25,
        "ramp_up_seconds": 2
    }"#;
    let request: ExecutionRequest =
        serde_json::from_str(json).map_err(|err| format!("Failed to parse: {}", err))?;
    let expected = ExecutionRequest::new(
        RequestTemplate::new(HttpMethod::Post, "https://api.example.com/items")
            .with_header("Content-Type", "application/json")
            .with_body("{}")
            .with_timeout(Duration::from_millis(2_500))
            .with_follow_redirects(false),
        4,
        25,
    )
    .with_ramp_up(2);
    if request != expected {
        return Err(format!("Unexpected request: {:?}", request));
    }
    Ok(())
}

#[test]
fn progress_serializes_elapsed_in_millis() -> Result<(), String> {
    let progress = ExecutionProgress {
        execution_id: ExecutionId::from("exec-1-0"),
        total_requests: 10,
        completed: 4,
        successful: 3,
        failed: 1,
        avg_response_time_ms: 12,
        elapsed: Duration::from_millis(1_500),
        is_final: false,
    };
    let value =
        serde_json::to_value(&progress).map_err(|err| format!("Failed to serialize: {}", err))?;
    if value.get("elapsed_ms").and_then(serde_json::Value::as_u64) != Some(1_500) {
        return Err(format!("Unexpected JSON: {}", value));
    }
    if value.get("execution_id").and_then(serde_json::Value::as_str) != Some("exec-1-0") {
        return Err(format!("Unexpected JSON: {}", value));
    }
    Ok(())
}
