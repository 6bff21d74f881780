#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;

// ── poll_delay ────────────────────────────────────────────────

#[test]
fn test_poll_delay_grows_linearly() {
    let base = Duration::from_secs(1);
    assert_eq!(poll_delay(base, 1), Duration::from_secs(1));
    assert_eq!(poll_delay(base, 2), Duration::from_secs(2));
    assert_eq!(poll_delay(base, 3), Duration::from_secs(3));
}

// ── parse_submit_response ─────────────────────────────────────

#[test]
fn test_submit_response_job_id() {
    let id = parse_submit_response(&json!({"data": "job-abc123"})).unwrap();
    assert_eq!(id, "job-abc123");
}

#[test]
fn test_submit_response_missing_id() {
    assert!(parse_submit_response(&json!({"error": "bad image"})).is_err());
    assert!(parse_submit_response(&json!({"data": 42})).is_err());
}

// ── parse_poll_response ───────────────────────────────────────

#[test]
fn test_poll_response_solved() {
    let outcome = parse_poll_response(&json!({"data": ["XK7PQ"]}));
    assert_eq!(outcome, PollOutcome::Solved("XK7PQ".into()));
}

#[test]
fn test_poll_response_error_takes_precedence() {
    let outcome = parse_poll_response(&json!({"error": "Incomplete job", "data": ["XK7PQ"]}));
    assert!(matches!(outcome, PollOutcome::ServiceError(_)));
}

#[test]
fn test_poll_response_pending() {
    assert_eq!(parse_poll_response(&json!({"data": []})), PollOutcome::Pending);
    assert_eq!(parse_poll_response(&json!({})), PollOutcome::Pending);
}
