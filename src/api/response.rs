//! Response interpretation, kept free of I/O so every branch is unit-testable.
//!
//! ERROR HANDLING
//! ==============
//! Auth endpoints parse the body first and then look at the status, so a
//! server-supplied `message` can explain a 4xx. Admin endpoints check the
//! status first and report a fixed per-operation message.

use reqwest::StatusCode;
use serde_json::Value;

use super::types::SignupOutcome;
use crate::error::ApiError;
use crate::session::is_truthy;

/// Named fields probed, in order, for the banned-user list before falling
/// back to the first list-valued field.
pub const BANNED_LIST_PROBES: [&str; 3] = ["users", "banned", "data"];

/// Parse a response body, mapping any syntax error to `InvalidResponse`.
///
/// # Errors
///
/// Returns `ApiError::InvalidResponse` when `body` is not JSON.
pub fn parse_json(body: &str) -> Result<Value, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::debug!(error = %e, "response body is not JSON");
        ApiError::InvalidResponse
    })
}

/// Server `message`, else the status reason phrase, else `fallback`.
#[must_use]
pub fn failure_message(body: &Value, status: StatusCode, fallback: &str) -> String {
    server_message(body)
        .or_else(|| status.canonical_reason().map(str::to_owned))
        .unwrap_or_else(|| fallback.to_owned())
}

fn server_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}

fn success_flag(body: &Value) -> bool {
    body.get("success").is_some_and(is_truthy)
}

/// True when the envelope carries a `success` field and it is falsy.
/// An absent field is not a failure.
#[must_use]
pub fn reports_failure(body: &Value) -> bool {
    body.get("success").is_some_and(|v| !is_truthy(v))
}

/// Interpret a `/login` exchange. On success returns the payload; the
/// caller persists the session.
///
/// # Errors
///
/// `InvalidResponse`, `Request` for non-2xx, `InvalidCredentials` for `success: false`.
pub fn interpret_login(status: StatusCode, body: &str) -> Result<Value, ApiError> {
    let data = parse_json(body)?;
    if !status.is_success() {
        let message = failure_message(&data, status, "Login failed");
        return Err(ApiError::Request { status: status.as_u16(), message });
    }
    if success_flag(&data) {
        Ok(data)
    } else {
        Err(ApiError::InvalidCredentials(
            server_message(&data).unwrap_or_else(|| "Invalid credentials".to_owned()),
        ))
    }
}

/// Interpret a `/signup` exchange.
///
/// # Errors
///
/// `InvalidResponse`, `Request` for non-2xx, `Signup` for `success: false`.
pub fn interpret_signup(status: StatusCode, body: &str) -> Result<SignupOutcome, ApiError> {
    let data = parse_json(body)?;
    if !status.is_success() {
        let message = failure_message(&data, status, "Signup failed");
        return Err(ApiError::Request { status: status.as_u16(), message });
    }
    if success_flag(&data) {
        Ok(SignupOutcome::created())
    } else {
        Err(ApiError::Signup(server_message(&data).unwrap_or_else(|| "Signup failed".to_owned())))
    }
}

/// Message stored in the session after login: the payload's `message`, if any.
#[must_use]
pub fn login_message(payload: &Value) -> Option<String> {
    payload.get("message").and_then(Value::as_str).map(str::to_owned)
}

/// Non-negative count field. Integers, integral floats (`42.0`) and numeric
/// strings (`"42"`) are accepted; absent, null, negative, fractional or
/// otherwise-typed values read as 0.
#[must_use]
pub fn count_field(data: &Value, field: &str) -> u64 {
    data.get(field).and_then(count).unwrap_or(0)
}

fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| integral_float(n.as_f64()?)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn integral_float(f: f64) -> Option<u64> {
    (f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

/// Length of a list field, 0 when absent or not a list.
#[must_use]
pub fn list_len(data: &Value, field: &str) -> usize {
    data.get(field).and_then(Value::as_array).map_or(0, Vec::len)
}

/// A list field's items, empty when absent or not a list.
#[must_use]
pub fn list_field(data: &Value, field: &str) -> Vec<Value> {
    data.get(field).and_then(Value::as_array).cloned().unwrap_or_default()
}

/// Locate a list in an envelope of unknown shape.
///
/// Order: the document itself, then [`BANNED_LIST_PROBES`], then the first
/// list-valued field in document order, else empty.
#[must_use]
pub fn find_list(data: &Value) -> Vec<Value> {
    if let Some(items) = data.as_array() {
        return items.clone();
    }
    let Some(object) = data.as_object() else {
        return Vec::new();
    };
    for field in BANNED_LIST_PROBES {
        if let Some(items) = object.get(field).and_then(Value::as_array) {
            return items.clone();
        }
    }
    object
        .values()
        .find_map(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "response_test.rs"]
mod tests;
