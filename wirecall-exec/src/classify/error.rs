use serde_json::Value as JsonValue;
use wirecall_core::{Headers, Response};

use crate::descriptor::OperationId;

/// Provider error payload, parsed as JSON when possible.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(JsonValue),
    Text(String),
}

impl ErrorBody {
    pub fn parse(body: &[u8]) -> Option<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        match serde_json::from_slice(body) {
            Ok(v) => Some(ErrorBody::Json(v)),
            Err(_) => Some(ErrorBody::Text(String::from_utf8_lossy(body).into_owned())),
        }
    }

    /// First of the usual `message` fields, or the raw text.
    pub fn message(&self) -> Option<&str> {
        match self {
            ErrorBody::Text(t) => Some(t.as_str()),
            ErrorBody::Json(v) => ["message", "error", "Message"]
                .iter()
                .find_map(|k| v.get(*k).and_then(JsonValue::as_str)),
        }
    }
}

/// A response with a non-success classification that nothing claimed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{operation}: HTTP {status} after {attempts} attempt(s){}", describe(.body))]
pub struct ProtocolError {
    pub operation: OperationId,
    pub status: u16,
    pub headers: Headers,
    pub body: Option<ErrorBody>,
    pub attempts: u32,
    /// The last classification was retryable and the retry policy gave up.
    pub retryable: bool,
}

impl ProtocolError {
    pub fn from_response(
        operation: OperationId,
        response: &Response,
        attempts: u32,
        retryable: bool,
    ) -> Self {
        Self {
            operation,
            status: response.status,
            headers: response.headers.clone(),
            body: ErrorBody::parse(&response.body),
            attempts,
            retryable,
        }
    }
}

fn describe(body: &Option<ErrorBody>) -> String {
    match body.as_ref().and_then(ErrorBody::message) {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}
