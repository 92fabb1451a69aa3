//! Unified error hierarchy for recoverrs
//!
//! Per-module errors ([`ScoreError`], [`StoreError`]) compose into a
//! single top-level type with severity levels and user-facing messages
//! for the CLI.

use thiserror::Error;

use crate::score::ScoreError;
use crate::store::StoreError;

/// Top-level error type for all recoverrs operations
#[derive(Debug, Error)]
pub enum RecoverrsError {
    /// Recovery score computation errors
    #[error("Scoring error: {0}")]
    Score(#[from] ScoreError),

    /// Sample store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for recoverrs operations
pub type Result<T> = std::result::Result<T, RecoverrsError>;

impl RecoverrsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RecoverrsError::Score(ScoreError::MissingRecord(_)) => ErrorSeverity::Warning,
            RecoverrsError::Score(ScoreError::InsufficientBaseline { .. }) => {
                ErrorSeverity::Warning
            }
            RecoverrsError::Store(StoreError::NotFound { .. }) => ErrorSeverity::Warning,
            RecoverrsError::Store(StoreError::Duplicate { .. }) => ErrorSeverity::Warning,
            RecoverrsError::Store(_) => ErrorSeverity::Error,
            RecoverrsError::Io(_) => ErrorSeverity::Error,
            RecoverrsError::Import(_) => ErrorSeverity::Error,
            RecoverrsError::Configuration(_) => ErrorSeverity::Error,
            RecoverrsError::Internal(_) => ErrorSeverity::Critical,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            RecoverrsError::Score(ScoreError::MissingRecord(date)) => {
                format!("No data recorded for {}. Import a sample for that day first.", date)
            }
            RecoverrsError::Score(ScoreError::InsufficientBaseline { .. }) => {
                "Not enough history to establish a personal baseline yet. \
                 Keep logging daily samples."
                    .to_string()
            }
            RecoverrsError::Store(StoreError::Duplicate { athlete, date }) => {
                format!("A record already exists for {} on {}.", athlete, date)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}
