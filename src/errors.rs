use serde_json::Value;
use thiserror::Error;

/// Code reported for failures that carry no provider-assigned code.
pub const INTERNAL_ERROR_CODE: i64 = -1;

#[derive(Debug, Error)]
pub enum ScfError {
    /// The cloud API rejected the call before the function ran
    /// (authentication, missing function, throttling and so on).
    #[error("Tencent Cloud API error [{code}]: {message} (request id: {})", display_request_id(.request_id))]
    RemoteApi {
        code: String,
        message: String,
        request_id: Option<String>,
    },

    /// The response envelope had a shape the client does not understand.
    #[error("Internal server error [{code}]: {message} (request id: {})", display_request_id(.request_id))]
    InternalServer {
        code: i64,
        message: String,
        request_id: Option<String>,
        response: Value,
    },

    /// The invoked function failed, either with a handled exception or a
    /// platform-level failure.
    #[error("Invoked function failed [{code}]: {message} (request id: {})", display_request_id(.request_id))]
    InvokedFunction {
        code: i64,
        message: String,
        stack_trace: String,
        request_id: Option<String>,
        response: Value,
    },

    #[error("Invalid invocation request: {0}")]
    InvalidRequest(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to serialize or parse JSON: {0}")]
    SerializationError(String),
}

fn display_request_id(request_id: &Option<String>) -> &str {
    request_id.as_deref().unwrap_or("unknown")
}

impl ScfError {
    /// The error code as text, for kinds that carry one.
    #[must_use]
    pub fn code_string(&self) -> Option<String> {
        match self {
            ScfError::RemoteApi { code, .. } => Some(code.clone()),
            ScfError::InternalServer { code, .. } | ScfError::InvokedFunction { code, .. } => {
                Some(code.to_string())
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ScfError::RemoteApi { request_id, .. }
            | ScfError::InternalServer { request_id, .. }
            | ScfError::InvokedFunction { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// The raw response envelope, when the failure came from one.
    #[must_use]
    pub fn response(&self) -> Option<&Value> {
        match self {
            ScfError::InternalServer { response, .. }
            | ScfError::InvokedFunction { response, .. } => Some(response),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_remote_api(&self) -> bool {
        matches!(self, ScfError::RemoteApi { .. })
    }

    #[must_use]
    pub fn is_internal_server(&self) -> bool {
        matches!(self, ScfError::InternalServer { .. })
    }

    #[must_use]
    pub fn is_invoked_function(&self) -> bool {
        matches!(self, ScfError::InvokedFunction { .. })
    }
}

impl From<reqwest::Error> for ScfError {
    fn from(error: reqwest::Error) -> Self {
        ScfError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for ScfError {
    fn from(error: serde_json::Error) -> Self {
        ScfError::SerializationError(error.to_string())
    }
}
