//! Collaborator traits for the question source, submission sink and summary
//! source.
//!
//! These async traits are implemented over a local directory here and over
//! HTTP by the `kjappe-client` crate.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::{DailySummary, QuizData, Submission, SubmissionAck, WeeklySummary};

/// Where questions come from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable source name (e.g. "directory").
    fn name(&self) -> &str;

    /// The quiz for `date`. `Ok(None)` means there is no quiz that day.
    async fn quiz(&self, date: NaiveDate) -> anyhow::Result<Option<QuizData>>;

    /// Canonical keys of every date with a quiz, ascending.
    async fn available_dates(&self) -> anyhow::Result<Vec<String>>;
}

/// Where submissions are reported.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, submission: &Submission) -> anyhow::Result<SubmissionAck>;
}

/// Where aggregate statistics come from.
#[async_trait]
pub trait SummarySource: Send + Sync {
    /// Today's average across all players.
    async fn daily_summary(&self) -> anyhow::Result<DailySummary>;

    /// This week's averages across all players.
    async fn weekly_summary(&self) -> anyhow::Result<WeeklySummary>;
}
