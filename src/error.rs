// Error taxonomy and the normalized envelope shared by every remote call

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Failure taxonomy for remote calls. Every variant ends up flattened into an
// ErrorEnvelope before it crosses the trait boundary, so callers only ever
// branch on one shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    Response { status_code: u16, message: String },

    #[error("Client error: {0}")]
    Internal(String),
}

// Normalized error shape produced uniformly regardless of failure source.
// status_code conventions: 0 = network unreachable, 408 = transport timeout,
// 500 = unexpected client-side failure, anything else is the server's own
// status passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub message: String,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
}

impl ErrorEnvelope {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            timestamp: Utc::now(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(408, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }
}

impl std::fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status_code)
    }
}

impl From<ApiError> for ErrorEnvelope {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(message) => ErrorEnvelope::transport(message),
            ApiError::Timeout(ms) => {
                ErrorEnvelope::timeout(format!("Request timeout after {}ms", ms))
            }
            ApiError::Response {
                status_code,
                message,
            } => ErrorEnvelope::new(status_code, message),
            ApiError::Internal(message) => ErrorEnvelope::internal(message),
        }
    }
}

// Discriminated result of a remote operation: exactly one branch is populated.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCallResult<T> {
    Data(T),
    Error(ErrorEnvelope),
}

impl<T> RemoteCallResult<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            RemoteCallResult::Data(data) => Some(data),
            RemoteCallResult::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorEnvelope> {
        match self {
            RemoteCallResult::Data(_) => None,
            RemoteCallResult::Error(envelope) => Some(envelope),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RemoteCallResult::Error(_))
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            RemoteCallResult::Data(data) => Some(data),
            RemoteCallResult::Error(_) => None,
        }
    }
}
