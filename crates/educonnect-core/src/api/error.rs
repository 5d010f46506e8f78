use std::path::PathBuf;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired")]
    Unauthorized { message: Option<String> },

    #[error("Access denied")]
    AccessDenied { message: Option<String> },

    #[error("Request failed with status {status}")]
    RequestFailed {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Could not read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Maximum length for error response bodies in log messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty());
        match status.as_u16() {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::AccessDenied { message },
            _ => ApiError::RequestFailed { status, message },
        }
    }

    /// The server rejected the credential on a protected call.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. } | ApiError::AccessDenied { .. })
    }

    /// The request never produced a usable answer from the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::InvalidResponse(_))
    }

    /// Message supplied by the server in its `{message}` body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::AccessDenied { message }
            | ApiError::RequestFailed { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text to show the user: the server's message verbatim when present,
    /// otherwise `fallback` for HTTP failures and `network_fallback` for
    /// transport failures.
    pub fn display_message(&self, fallback: &str, network_fallback: &str) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        match self {
            ApiError::Network(_) | ApiError::InvalidResponse(_) => network_fallback.to_string(),
            ApiError::File { .. } => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_auth_failures() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"message":"Token expired"}"#);
        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert!(err.is_auth_rejection());
        assert_eq!(err.server_message(), Some("Token expired"));

        let err = ApiError::from_status(StatusCode::FORBIDDEN, "");
        assert!(matches!(err, ApiError::AccessDenied { message: None }));
        assert!(err.is_auth_rejection());
    }

    #[test]
    fn test_from_status_request_failed() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":"User already exists"}"#);
        match &err {
            ApiError::RequestFailed { status, message } => {
                assert_eq!(*status, StatusCode::BAD_REQUEST);
                assert_eq!(message.as_deref(), Some("User already exists"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!err.is_auth_rejection());

        // Non-JSON body leaves no server message
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>");
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_display_message_prefers_server_text() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":"Invalid credentials"}"#);
        assert_eq!(err.display_message("Login failed", "Something went wrong"), "Invalid credentials");

        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"message":""}"#);
        assert_eq!(err.display_message("Login failed", "Something went wrong"), "Login failed");

        let err = ApiError::InvalidResponse("expected value".to_string());
        assert!(err.is_transport());
        assert_eq!(err.display_message("Login failed", "Something went wrong"), "Something went wrong");
    }

    #[test]
    fn test_truncate_body() {
        let short = "short body";
        assert_eq!(ApiError::truncate_body(short), short);

        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.ends_with("(truncated, 800 total bytes)"));
    }
}
