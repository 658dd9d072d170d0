//! Error types for the Sankofa client.

use serde_json::{Map, Value};
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client errors.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Configuration error (bad base URL, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection refused, DNS, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response from the API
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Persisted session could not be read or written
    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// The API error, when the server answered with one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(err) => Some(err),
            _ => None,
        }
    }

    /// True for a 404 from the API.
    pub fn is_not_found(&self) -> bool {
        self.as_api().and_then(|err| err.status) == Some(404)
    }

    /// True for a 401 from the API.
    pub fn is_unauthorized(&self) -> bool {
        self.as_api().and_then(|err| err.status) == Some(401)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

/// Error reported by the API.
///
/// `details` keeps the JSON object the server sent so callers can pull
/// field-level messages (`phone_number`, `full_name`, `email`, ...).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
    pub details: Option<Map<String, Value>>,
}

impl ApiError {
    /// Create an API error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            details: None,
        }
    }

    /// Set the HTTP status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach a details map.
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    /// Build from a non-2xx response body.
    ///
    /// The message comes from `detail`, then `message`, then the first field
    /// error found in the body, then a generic status line.
    pub fn from_response(status: u16, body: &str) -> Self {
        let details = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        };

        let message = details
            .as_ref()
            .and_then(|map| {
                text_field(map, "detail")
                    .or_else(|| text_field(map, "message"))
                    .or_else(|| map.keys().find_map(|key| text_field(map, key)))
            })
            .map(str::to_string)
            .or_else(|| {
                let trimmed = body.trim();
                (details.is_none() && !trimmed.is_empty() && trimmed.len() <= 200)
                    .then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| format!("Request failed with status {status}"));

        Self {
            message,
            status: Some(status),
            details,
        }
    }

    /// Field-level message: a non-blank string, or the first string of a list.
    pub fn field_error(&self, key: &str) -> Option<&str> {
        self.details.as_ref().and_then(|map| text_field(map, key))
    }

    /// Top-level `detail` or `message` from the details map, if non-blank.
    pub fn detail_message(&self) -> Option<&str> {
        self.field_error("detail")
            .or_else(|| self.field_error("message"))
    }
}

fn text_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    match map.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
        Value::Array(items) => items.first().and_then(Value::as_str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_detail() {
        let err = ApiError::from_response(400, r#"{"detail": "No account is registered"}"#);
        assert_eq!(err.message, "No account is registered");
        assert_eq!(err.status, Some(400));
        assert_eq!(err.detail_message(), Some("No account is registered"));
    }

    #[test]
    fn test_message_from_field_list() {
        let err = ApiError::from_response(
            400,
            r#"{"phone_number": ["A user with this phone number already exists."]}"#,
        );
        assert_eq!(err.message, "A user with this phone number already exists.");
        assert_eq!(
            err.field_error("phone_number"),
            Some("A user with this phone number already exists.")
        );
        assert_eq!(err.field_error("email"), None);
        assert_eq!(err.detail_message(), None);
    }

    #[test]
    fn test_blank_strings_are_ignored() {
        let err = ApiError::from_response(400, r#"{"detail": "  ", "message": "Try later"}"#);
        assert_eq!(err.message, "Try later");
        assert_eq!(err.field_error("detail"), None);
    }

    #[test]
    fn test_non_json_body() {
        let err = ApiError::from_response(502, "Bad Gateway");
        assert_eq!(err.message, "Bad Gateway");
        assert!(err.details.is_none());

        let err = ApiError::from_response(500, "");
        assert_eq!(err.message, "Request failed with status 500");
    }

    #[test]
    fn test_not_found_detection() {
        let err: ClientError = ApiError::new("Not found.").with_status(404).into();
        assert!(err.is_not_found());
        assert!(!ClientError::Network("refused".into()).is_not_found());
    }

    #[test]
    fn test_unauthorized_detection() {
        let err: ClientError = ApiError::new("Token expired").with_status(401).into();
        assert!(err.is_unauthorized());
        assert!(!err.is_not_found());
    }
}
