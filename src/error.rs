// SPDX-License-Identifier: MIT

//! Application error types.
//!
//! Note the deliberate gaps: "no active trip" and "already active" are
//! idempotent no-ops rather than errors, and a missing or malformed durable
//! snapshot decodes to "no active trip" instead of failing.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Location or notification permission not granted")]
    PermissionDenied,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for tracker and store operations.
pub type Result<T> = std::result::Result<T, AppError>;
