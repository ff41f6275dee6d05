use serde_json::Value;
use thiserror::Error;

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

/// Fallback shown when the server gives no usable message.
pub const GENERIC_FAILURE: &str = "Request failed.";

#[derive(Clone, Debug, Error)]
pub enum ApiError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http {
        status: u16,
        message: String,
        body: Option<Value>,
    },
    #[error("Response error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Builds an HTTP error from a raw response body, extracting the server message.
    pub fn from_response(status: u16, text: &str) -> Self {
        let body = serde_json::from_str::<Value>(text).ok();
        let message = body
            .as_ref()
            .and_then(server_message)
            .unwrap_or_else(|| sanitize_body(text));

        Self::Http {
            status,
            message,
            body,
        }
    }

    /// Message suitable for a toast. Transport errors fall back to their display form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// JSON body of a failed response, if it parsed.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout("Request timed out. Please try again.".to_string())
        } else if err.is_decode() {
            Self::Parse(format!("Failed to decode response: {err}"))
        } else if err.is_builder() {
            Self::Config(format!("Failed to build request: {err}"))
        } else {
            Self::Network(format!("Unable to reach the server: {err}"))
        }
    }
}

/// Picks the most specific message a DRF-style error body carries.
pub fn server_message(body: &Value) -> Option<String> {
    let direct = ["error", "detail"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str).and_then(non_empty));
    if direct.is_some() {
        return direct;
    }

    body.get("non_field_errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(Value::as_str)
        .and_then(non_empty)
}

fn non_empty(message: &str) -> Option<String> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trims and truncates an error body for user-facing messages.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
