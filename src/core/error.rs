//! Error types for engine operations.

use thiserror::Error;

/// Errors produced by the admission-and-release engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No active application matches the presented credential.
    #[error("invalid credential")]
    InvalidCredential,
    /// Queue is unknown, inactive, deleted, or owned by another application.
    #[error("queue not found")]
    QueueNotFound,
    /// Token is unknown or belongs to a cancelled participant.
    #[error("token not found")]
    TokenNotFound,
    /// Caller exceeded the admission rate ceiling.
    #[error("rate limit exceeded ({remaining} remaining)")]
    RateLimited {
        /// Admissions left in the current window.
        remaining: usize,
    },
    /// A freshly generated token collided with an existing participant.
    #[error("participant token already exists")]
    DuplicateToken,
    /// Conditional state transition lost to a concurrent writer.
    #[error("participant is no longer waiting")]
    StoreConflict,
    /// Callback could not be delivered.
    #[error("callback delivery failed: {0}")]
    DeliveryFailure(String),
    /// Backend-specific failure with context.
    #[error("backend error: {0}")]
    Backend(String),
}

impl EngineError {
    /// HTTP status class surfaced to request callers.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredential => 401,
            Self::QueueNotFound | Self::TokenNotFound => 404,
            Self::RateLimited { .. } => 429,
            Self::StoreConflict => 409,
            Self::DeliveryFailure(_) => 502,
            Self::DuplicateToken | Self::Backend(_) => 500,
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
