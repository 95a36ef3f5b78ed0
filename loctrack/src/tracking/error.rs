//! Error types for the tracking engine.
//!
//! Two families live here:
//!
//! - [`TrackingError`] - runtime failures of a single position read. These are
//!   absorbed by the scheduler and only ever surface through `on_error`.
//! - [`ConfigError`] - usage errors raised synchronously by
//!   [`TrackingEngine::init`](super::TrackingEngine::init). Never raised by a tick.

use std::fmt;

use thiserror::Error;

/// Classification of a failed position read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingErrorKind {
    /// The host refused access to location. Requires user action.
    PermissionDenied,
    /// Transient sensor or environment problem.
    PositionUnavailable,
    /// The capability did not respond within the read timeout.
    Timeout,
    /// Anything else. The original message is preserved.
    Unknown,
}

impl TrackingErrorKind {
    /// Whether a failure of this kind may be retried within a tick.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::PermissionDenied)
    }

    /// Stable snake_case identifier, suitable for logs and UI keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::PositionUnavailable => "position_unavailable",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TrackingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed position read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TrackingError {
    kind: TrackingErrorKind,
    message: String,
}

impl TrackingError {
    /// Create an error of the given kind.
    pub fn new(kind: TrackingErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(TrackingErrorKind::PermissionDenied, message)
    }

    pub fn position_unavailable(message: impl Into<String>) -> Self {
        Self::new(TrackingErrorKind::PositionUnavailable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TrackingErrorKind::Timeout, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TrackingErrorKind::Unknown, message)
    }

    pub fn kind(&self) -> TrackingErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Derived from the kind: permission denials are never retryable.
    pub fn retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Errors raised by `init` when the configuration cannot produce a working engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The update interval was zero.
    #[error("update interval must be greater than zero")]
    ZeroInterval,

    /// A required consumer callback was not registered.
    #[error("missing required callback: {0}")]
    MissingCallback(&'static str),

    /// The backoff policy is unusable (zero base delay or cap below base).
    #[error("invalid backoff policy: {0}")]
    InvalidBackoff(String),

    /// The device read timeout was zero.
    #[error("read timeout must be greater than zero")]
    ZeroReadTimeout,
}
