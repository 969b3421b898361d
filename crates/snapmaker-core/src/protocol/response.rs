//! Response parsing utilities for the device HTTP API.

use serde_json::{Map, Value};

use crate::error::DeviceError;

/// Keys removed from the stored status payload before it is exposed.
pub const STRIPPED_KEYS: &[&str] = &["token"];

/// Substrings that make an unknown payload key look like a credential.
pub const SENSITIVE_PATTERNS: &[&str] = &["token", "password", "secret", "key", "credential"];

/// Marker the device puts in the connect response when it refuses a session.
const CONNECT_FAILURE_MARKER: &str = "Failed";

/// Longest body excerpt echoed into error messages.
const BODY_EXCERPT_LEN: usize = 200;

/// Parse a JSON response body.
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: &str,
    host: &str,
) -> Result<T, DeviceError> {
    serde_json::from_str(response.trim()).map_err(|e| {
        DeviceError::protocol(
            host,
            format!("Failed to parse JSON: {} (body: {})", e, excerpt(response)),
        )
    })
}

/// Extract the token from a `/api/v1/connect` response.
pub fn parse_token_response(response: &str, host: &str) -> Result<String, DeviceError> {
    if response.contains(CONNECT_FAILURE_MARKER) {
        return Err(DeviceError::auth_required(
            host,
            format!("connect refused: {}", excerpt(response)),
        ));
    }

    let json: Value = parse_json_response(response, host)?;

    match json.get("token").and_then(Value::as_str) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(DeviceError::auth_required(host, "no token in connect response")),
    }
}

/// Parse a `/api/v1/status` body into its top-level object.
pub fn parse_status_body(response: &str, host: &str) -> Result<Map<String, Value>, DeviceError> {
    if response.trim().is_empty() {
        return Err(DeviceError::protocol(host, "Empty response from status API"));
    }

    match parse_json_response::<Value>(response, host)? {
        Value::Object(map) => Ok(map),
        other => Err(DeviceError::protocol(
            host,
            format!("Expected a JSON object, got {}", json_kind(&other)),
        )),
    }
}

/// Copy of `payload` without the keys in [`STRIPPED_KEYS`].
pub fn strip_sensitive(payload: &Map<String, Value>) -> Map<String, Value> {
    payload
        .iter()
        .filter(|(key, _)| !STRIPPED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Keys that survive stripping but still look like credentials.
pub fn suspicious_keys(payload: &Map<String, Value>) -> Vec<&str> {
    payload
        .keys()
        .filter(|key| !STRIPPED_KEYS.contains(&key.as_str()))
        .filter(|key| {
            let lower = key.to_lowercase();
            SENSITIVE_PATTERNS.iter().any(|p| lower.contains(p))
        })
        .map(String::as_str)
        .collect()
}

fn excerpt(response: &str) -> &str {
    match response.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => &response[..idx],
        None => response,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
