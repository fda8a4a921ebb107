// Error handling module
// Defines error types and the uniform request outcome

use thiserror::Error;

/// Errors that can occur while executing a backend request
///
/// The `Display` output of each variant is the message surfaced to callers,
/// so it is kept short and user-facing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport-level failure, no response received
    #[error("{0}")]
    Network(String),

    /// 401 that could not be recovered by a token refresh
    #[error("session expired")]
    SessionExpired,

    /// Non-2xx response from the backend
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 2xx response whose body is not valid JSON
    #[error("invalid response")]
    InvalidResponse,

    /// Transport timeout
    #[error("timeout")]
    Timeout,

    /// Request body could not be encoded
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Session could not be written to the credential store
    #[error("failed to persist session: {0}")]
    Storage(String),
}

impl ApiError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::SessionExpired => Some(401),
            _ => None,
        }
    }

    /// Build an HTTP error, falling back to a generic message
    pub fn http(status: u16, message: Option<String>) -> Self {
        ApiError::Http {
            status,
            message: message.unwrap_or_else(|| format!("HTTP error {}", status)),
        }
    }
}

/// Credential store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Credential store error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Credential store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize user profile: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Uniform outcome of every request executor invocation
///
/// Exactly one of data or error is observable; a cancelled call carries
/// neither and is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestResult<T> {
    /// 2xx response. `None` for 204 or an empty body.
    Data(Option<T>),

    /// Any failure
    Error(ApiError),

    /// The caller aborted the request before it completed
    Cancelled,
}

impl<T> RequestResult<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            RequestResult::Data(data) => data.as_ref(),
            _ => None,
        }
    }

    /// The user-facing error message, if this is a failure
    pub fn error(&self) -> Option<String> {
        match self {
            RequestResult::Error(e) => Some(e.to_string()),
            _ => None,
        }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            RequestResult::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestResult::Data(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RequestResult::Cancelled)
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            RequestResult::Data(data) => data,
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RequestResult<U> {
        match self {
            RequestResult::Data(data) => RequestResult::Data(data.map(f)),
            RequestResult::Error(e) => RequestResult::Error(e),
            RequestResult::Cancelled => RequestResult::Cancelled,
        }
    }
}

impl<T> From<ApiError> for RequestResult<T> {
    fn from(err: ApiError) -> Self {
        RequestResult::Error(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ApiError::SessionExpired.to_string(), "session expired");
        assert_eq!(ApiError::InvalidResponse.to_string(), "invalid response");
        assert_eq!(ApiError::Timeout.to_string(), "timeout");
        assert_eq!(
            ApiError::Network("connection refused".to_string()).to_string(),
            "connection refused"
        );
    }

    #[test]
    fn test_http_error_fallback_message() {
        let err = ApiError::http(502, None);
        assert_eq!(err.to_string(), "HTTP error 502");
        assert_eq!(err.status(), Some(502));

        let err = ApiError::http(400, Some("Name is required".to_string()));
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn test_request_result_accessors() {
        let ok: RequestResult<u32> = RequestResult::Data(Some(7));
        assert_eq!(ok.data(), Some(&7));
        assert!(ok.error().is_none());
        assert!(ok.is_success());

        let empty: RequestResult<u32> = RequestResult::Data(None);
        assert!(empty.data().is_none());
        assert!(empty.error().is_none());

        let failed: RequestResult<u32> = ApiError::SessionExpired.into();
        assert!(failed.data().is_none());
        assert_eq!(failed.error().as_deref(), Some("session expired"));

        let cancelled: RequestResult<u32> = RequestResult::Cancelled;
        assert!(cancelled.data().is_none());
        assert!(cancelled.error().is_none());
        assert!(cancelled.is_cancelled());
    }

    #[test]
    fn test_request_result_map() {
        let ok: RequestResult<u32> = RequestResult::Data(Some(2));
        assert_eq!(ok.map(|n| n * 10), RequestResult::Data(Some(20)));

        let failed: RequestResult<u32> = RequestResult::Error(ApiError::Timeout);
        assert_eq!(
            failed.map(|n| n * 10),
            RequestResult::Error(ApiError::Timeout)
        );
    }
}
