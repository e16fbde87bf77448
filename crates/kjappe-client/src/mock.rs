//! In-memory quiz backend for testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use kjappe_core::datekey::canonical_key;
use kjappe_core::model::{DailySummary, QuizData, Submission, SubmissionAck, WeeklySummary};
use kjappe_core::statistics::{self, SubmissionRecord, DEFAULT_QUESTIONS_PER_QUIZ};
use kjappe_core::traits::{QuestionSource, SubmissionSink, SummarySource};

/// A quiz server living in memory.
///
/// Serves fixed quizzes, records submissions and computes summaries from
/// them with the same aggregation the server uses. Can be switched into a
/// failing mode to exercise error paths.
pub struct MockBackend {
    /// Quizzes keyed by canonical date key.
    quizzes: BTreeMap<String, QuizData>,
    submissions: Mutex<Vec<SubmissionRecord>>,
    questions_per_quiz: usize,
    /// Clock used for new submissions and for "today" in summaries.
    now: DateTime<Utc>,
    call_count: AtomicU32,
    failing: AtomicBool,
}

impl MockBackend {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            quizzes: BTreeMap::new(),
            submissions: Mutex::new(Vec::new()),
            questions_per_quiz: DEFAULT_QUESTIONS_PER_QUIZ,
            now,
            call_count: AtomicU32::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn with_quiz(mut self, date: NaiveDate, quiz: QuizData) -> Self {
        self.quizzes.insert(canonical_key(date), quiz);
        self
    }

    pub fn with_questions_per_quiz(mut self, n: usize) -> Self {
        self.questions_per_quiz = n;
        self
    }

    /// Seed a submission made at `at`.
    pub fn with_submission(self, at: DateTime<Utc>, answers: Vec<String>, correct: usize) -> Self {
        self.lock_submissions()
            .push(SubmissionRecord::new(answers, correct, at));
        self
    }

    /// Make every subsequent call fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn submissions(&self) -> Vec<SubmissionRecord> {
        self.lock_submissions().clone()
    }

    fn lock_submissions(&self) -> std::sync::MutexGuard<'_, Vec<SubmissionRecord>> {
        self.submissions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_call(&self) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if self.failing.load(Ordering::Relaxed) {
            anyhow::bail!("mock backend is failing");
        }
        Ok(())
    }

    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

#[async_trait]
impl QuestionSource for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn quiz(&self, date: NaiveDate) -> anyhow::Result<Option<QuizData>> {
        self.begin_call()?;
        Ok(self.quizzes.get(&canonical_key(date)).cloned())
    }

    async fn available_dates(&self) -> anyhow::Result<Vec<String>> {
        self.begin_call()?;
        Ok(self.quizzes.keys().cloned().collect())
    }
}

#[async_trait]
impl SubmissionSink for MockBackend {
    async fn submit(&self, submission: &Submission) -> anyhow::Result<SubmissionAck> {
        self.begin_call()?;
        let record = SubmissionRecord::new(
            submission.answers.clone(),
            submission.number_of_correct,
            self.now,
        );
        let id = record.id.to_string();
        self.lock_submissions().push(record);
        Ok(SubmissionAck {
            id: Some(id),
            message: Some("Submission stored successfully.".into()),
        })
    }
}

#[async_trait]
impl SummarySource for MockBackend {
    async fn daily_summary(&self) -> anyhow::Result<DailySummary> {
        self.begin_call()?;
        Ok(statistics::daily_average(
            &self.lock_submissions(),
            self.today(),
            self.questions_per_quiz,
        ))
    }

    async fn weekly_summary(&self) -> anyhow::Result<WeeklySummary> {
        self.begin_call()?;
        Ok(statistics::weekly_summary(
            &self.lock_submissions(),
            self.today(),
            self.questions_per_quiz,
        ))
    }
}
