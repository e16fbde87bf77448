//! Error types for kjappe-core.
//!
//! The evaluator never fails, so there is no error type for it. Everything
//! that touches stored state or parses a date key gets one here.

use std::path::PathBuf;

use thiserror::Error;

/// Failures turning a string into a quiz date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateKeyError {
    /// The string is not exactly eight ASCII digits.
    #[error("canonical date key must be exactly 8 digits (YYYYMMDD), got {0:?}")]
    Malformed(String),

    /// Eight digits, but not a real calendar day (e.g. "20240231").
    #[error("{0:?} is not a valid calendar date")]
    InvalidDate(String),
}

/// Failures reading or writing the local key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored value is not valid JSON of the expected shape.
    #[error("malformed stored value: {0}")]
    Json(#[from] serde_json::Error),

    /// A versioned value was written by a newer format than this build reads.
    #[error("stored value has unsupported version {found} (newest supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Failures of a play session operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No question file exists for the date.
    #[error("no quiz available for {0}")]
    NoQuiz(String),

    /// Not every question has a non-blank answer.
    #[error("all {expected} questions must be answered before submitting ({answered} answered)")]
    IncompleteAnswers { expected: usize, answered: usize },

    /// Answers were already submitted for this date.
    #[error("answers for {0} have already been submitted")]
    AlreadySubmitted(String),

    /// An overturn was requested before submitting.
    #[error("answers for {0} have not been submitted yet")]
    NotSubmitted(String),

    /// Overturn index outside the question range.
    #[error("question index {index} is out of range (quiz has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Overturn requested for an answer that was already accepted.
    #[error("question {} was already judged correct", .index + 1)]
    AlreadyCorrect { index: usize },

    /// The question source failed.
    #[error("failed to fetch questions: {0:#}")]
    Source(anyhow::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Returns `true` for errors caused by the player's input rather than the
    /// environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SessionError::IncompleteAnswers { .. }
                | SessionError::AlreadySubmitted(_)
                | SessionError::NotSubmitted(_)
                | SessionError::IndexOutOfRange { .. }
                | SessionError::AlreadyCorrect { .. }
        )
    }
}
