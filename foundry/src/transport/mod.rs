//! Transport abstraction for the workflow server
//!
//! The client never talks HTTP directly. It drives a [`WorkflowTransport`],
//! which the `http` feature implements with reqwest and tests implement with
//! scripted responses.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpTransport;

use async_trait::async_trait;
use foundry_common::{
    ApprovalRequest, ApprovalResponse, GenerateRequest, HealthStatus, ProtocolList,
    ProtocolRecord, ProtocolState,
};
use thiserror::Error;

/// Errors raised below the client boundary
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server answered with a non-success status
    #[error("server returned {status}{}", detail_suffix(.detail))]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the `detail` field, if any
        detail: Option<String>,
    },

    /// The request never produced a response (connect, timeout, TLS)
    #[error("request failed: {0}")]
    Request(String),

    /// The response body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot be used
    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl TransportError {
    /// Server-supplied message, when the failure carried one
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Remote operations exposed by the workflow server
#[async_trait]
pub trait WorkflowTransport: Send + Sync {
    /// `POST /generate`: start a thread and run it to its next stop
    async fn generate(&self, request: &GenerateRequest) -> TransportResult<ProtocolState>;

    /// `POST /approve`: sign off a halted thread
    async fn approve(&self, request: &ApprovalRequest) -> TransportResult<ApprovalResponse>;

    /// `GET /health`
    async fn health(&self) -> TransportResult<HealthStatus>;

    /// `GET /protocol/{thread_id}`
    async fn fetch_protocol(&self, thread_id: &str) -> TransportResult<ProtocolRecord>;

    /// `GET /protocols?limit=N`
    async fn list_protocols(&self, limit: usize) -> TransportResult<ProtocolList>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = TransportError::Status {
            status: 429,
            detail: Some("rate limited".into()),
        };
        assert_eq!(err.to_string(), "server returned 429: rate limited");
        assert_eq!(err.detail(), Some("rate limited"));

        let bare = TransportError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(bare.to_string(), "server returned 500");
        assert_eq!(bare.detail(), None);
    }

    #[test]
    fn test_request_error_has_no_detail() {
        let err = TransportError::Request("connection refused".into());
        assert!(err.detail().is_none());
        assert!(err.to_string().contains("connection refused"));
    }
}
