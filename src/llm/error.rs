//! Gateway error types

use std::time::Duration;
use thiserror::Error;

/// Gateway failure with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
    /// Optional upstream-provided hint for when a retry may succeed.
    pub retry_after: Option<Duration>,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Unavailable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::MalformedResponse, message)
    }
}

/// Failure classification.
///
/// Every kind is session-safe: the coordinator leaves state untouched and
/// the client may retry the same message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Upstream unreachable, refusing service, or rejecting the request
    Unavailable,
    /// Upstream did not answer within the imposed deadline
    Timeout,
    /// Upstream answered with an empty or unparseable body
    MalformedResponse,
}
