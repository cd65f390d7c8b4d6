//! Error types for the catalog client.

use thiserror::Error;

/// Fallback message shown when a failure carries no usable server message.
pub const GENERIC_FAILURE_MESSAGE: &str = "操作失敗，請稍後再試";

/// Errors that can occur while talking to the catalog backend.
#[derive(Debug, Error, Clone)]
pub enum CatalogError {
    /// Network/HTTP request failed before a valid envelope arrived
    #[error("Network error: {message}")]
    Network { message: String },

    /// The server answered with `success: false`; `message` is the
    /// server-supplied text, shown to the user verbatim
    #[error("{message}")]
    Api { message: String },

    /// The response body was not the expected envelope shape
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    /// Input rejected client-side before any request was issued
    /// (import file checks, password confirmation)
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// URL parsing/construction failed
    #[error("URL error: {message}")]
    UrlError { message: String },
}

impl CatalogError {
    /// Returns true if this error is potentially transient and retryable.
    ///
    /// Application failures (`Api`) and rejected input are deterministic
    /// and never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::Network { .. } | CatalogError::UnexpectedResponse { .. }
        )
    }

    /// Returns true if the server rejected the request for lack of a session.
    ///
    /// The backend signals this inside the envelope rather than via HTTP
    /// status, so this is a message heuristic.
    pub fn needs_login(&self) -> bool {
        matches!(self, CatalogError::Api { message } if message.contains("請先登入"))
    }

    /// The one-line text a user should see for this failure, prefixed with
    /// the literal failure symbol.
    ///
    /// Application failures surface the server message verbatim; everything
    /// else falls back to a generic message.
    pub fn user_line(&self) -> String {
        match self {
            CatalogError::Api { message } => format!("✗ {message}"),
            CatalogError::InvalidInput { message } => format!("✗ {message}"),
            _ => format!("✗ {GENERIC_FAILURE_MESSAGE}"),
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for CatalogError {
    fn from(err: url::ParseError) -> Self {
        CatalogError::UrlError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::UnexpectedResponse {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_message_shown_verbatim() {
        let err = CatalogError::Api {
            message: "此帳號已存在".to_string(),
        };
        assert_eq!(err.user_line(), "✗ 此帳號已存在");
    }

    #[test]
    fn test_transport_failure_uses_fallback() {
        let err = CatalogError::Network {
            message: "connection refused".to_string(),
        };
        assert_eq!(err.user_line(), format!("✗ {GENERIC_FAILURE_MESSAGE}"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(CatalogError::Network {
            message: "timeout".into()
        }
        .is_retryable());
        assert!(!CatalogError::Api {
            message: "權限不足".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_needs_login_heuristic() {
        assert!(CatalogError::Api {
            message: "請先登入".into()
        }
        .needs_login());
        assert!(!CatalogError::Api {
            message: "課程不存在".into()
        }
        .needs_login());
    }
}
