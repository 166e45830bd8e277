//! Normalized transport error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fallback message when neither the backend body nor the transport gave one.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// Normalized shape of every failed request: network failure, timeout or non-2xx.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message: backend `message` if present, else the transport's own message.
    pub message: String,
    /// HTTP status, when a response arrived at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Per-field errors reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Error body the backend may return: both fields optional.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            errors: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_field_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors
            .get_or_insert_with(BTreeMap::new)
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Build from a non-2xx response.
    ///
    /// The body is parsed leniently: anything that is not the expected JSON
    /// shape falls back to the status-derived message.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {}", status));
        Self {
            message,
            status: Some(status),
            errors: parsed.errors,
        }
    }

    /// Build from a failure where no response arrived (connect error, timeout, ...).
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let message = err.to_string();
        Self {
            message: if message.is_empty() {
                DEFAULT_ERROR_MESSAGE.to_string()
            } else {
                message
            },
            status: err.status().map(|s| s.as_u16()),
            errors: None,
        }
    }

    pub fn class(&self) -> StatusClass {
        StatusClass::from_status(self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status == Some(403)
    }

    /// 401 or 403: never retried, since the outcome cannot change by repeating.
    pub fn is_auth_failure(&self) -> bool {
        self.is_unauthorized() || self.is_forbidden()
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.status, Some(s) if (400..500).contains(&s))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.status, Some(s) if s >= 500)
    }

    /// Messages reported for one field.
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors
            .as_ref()
            .and_then(|m| m.get(field))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Coarse classification that drives logging and global side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// No response arrived.
    Network,
    /// 401: session invalid.
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// Any other 4xx.
    ClientError,
    /// 5xx
    ServerError,
    /// Anything else (non-2xx outside 4xx/5xx).
    Other,
}

impl StatusClass {
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            None => Self::Network,
            Some(401) => Self::Unauthorized,
            Some(403) => Self::Forbidden,
            Some(404) => Self::NotFound,
            Some(s) if (400..500).contains(&s) => Self::ClientError,
            Some(s) if s >= 500 => Self::ServerError,
            Some(_) => Self::Other,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::ClientError => "client_error",
            Self::ServerError => "server_error",
            Self::Other => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_message_and_field_errors_are_preferred() {
        let body = br#"{"message":"Invalid credentials","errors":{"email":["Unknown email"]}}"#;
        let err = ApiError::from_response(422, body);
        assert_eq!(err.message, "Invalid credentials");
        assert_eq!(err.status, Some(422));
        assert_eq!(err.field_errors("email"), ["Unknown email".to_string()]);
        assert!(err.field_errors("password").is_empty());
    }

    #[test]
    fn non_json_body_falls_back_to_status_message() {
        let err = ApiError::from_response(502, b"<html>Bad Gateway</html>");
        assert_eq!(err.message, "Request failed with status code 502");
        assert!(err.errors.is_none());
        assert!(err.is_server_error());
        assert_eq!(err.class(), StatusClass::ServerError);
    }

    #[test]
    fn empty_message_is_ignored() {
        let err = ApiError::from_response(404, br#"{"message":""}"#);
        assert_eq!(err.message, "Request failed with status code 404");
        assert_eq!(err.class(), StatusClass::NotFound);
    }

    #[test]
    fn auth_failures() {
        assert!(ApiError::new("x").with_status(401).is_auth_failure());
        assert!(ApiError::new("x").with_status(403).is_auth_failure());
        assert!(!ApiError::new("x").with_status(404).is_auth_failure());
        assert!(!ApiError::new("x").is_auth_failure());
        assert_eq!(StatusClass::from_status(None), StatusClass::Network);
        assert_eq!(StatusClass::from_status(Some(409)), StatusClass::ClientError);
    }
}
