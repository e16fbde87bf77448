//! Play session orchestration.
//!
//! A [`Game`] ties the question source, local history, evaluator and the
//! remote sink/summary collaborators together. Remote failures on submission
//! and statistics are logged and swallowed: the local result always stands.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::datekey::canonical_key;
use crate::error::SessionError;
use crate::evaluator::{Evaluator, Verdict};
use crate::history::{History, PlayRecord};
use crate::model::{CorrectnessSet, DailySummary, QuizData, Submission, SubmissionAck};
use crate::questions::adjacent_dates;
use crate::share::{share_text, ResultStatus};
use crate::statistics::{self, ChartDay};
use crate::store::KeyValueStore;
use crate::traits::{QuestionSource, SubmissionSink, SummarySource};

/// Number of days the player's weekly statistics look back over.
const WEEKLY_LOOKBACK_DAYS: u32 = 7;

/// Everything known about a date after loading.
#[derive(Debug, Clone)]
pub struct LoadedQuiz {
    pub date: NaiveDate,
    /// `None` when there is no quiz that day.
    pub quiz: Option<QuizData>,
    /// `None` when the date has not been played.
    pub record: Option<PlayRecord>,
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl LoadedQuiz {
    pub fn is_submitted(&self) -> bool {
        self.record.is_some()
    }
}

/// The judged outcome of one question.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionResult {
    pub index: usize,
    pub question: String,
    pub answer: String,
    pub canonical_answer: String,
    pub verdict: Verdict,
    pub overturned: bool,
    pub status: ResultStatus,
}

/// Result of submitting answers.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub correct: CorrectnessSet,
    pub number_of_correct: usize,
    /// Acknowledgment from the sink, if one is configured and reachable.
    pub ack: Option<SubmissionAck>,
}

/// The player's week next to everyone else's.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    pub user_average: f64,
    pub server_average: f64,
    pub streak: usize,
    pub chart: Vec<ChartDay>,
}

/// A player's view of the quiz.
pub struct Game<S> {
    evaluator: Evaluator,
    history: History<S>,
    questions: Arc<dyn QuestionSource>,
    sink: Option<Arc<dyn SubmissionSink>>,
    summary: Option<Arc<dyn SummarySource>>,
}

impl<S: KeyValueStore> Game<S> {
    pub fn new(evaluator: Evaluator, store: S, questions: Arc<dyn QuestionSource>) -> Self {
        Self {
            evaluator,
            history: History::new(store),
            questions,
            sink: None,
            summary: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn SubmissionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_summary(mut self, summary: Arc<dyn SummarySource>) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn history(&self) -> &History<S> {
        &self.history
    }

    /// Fetch the quiz and resolve any stored state for `date`.
    pub async fn load(&mut self, date: NaiveDate) -> Result<LoadedQuiz, SessionError> {
        let (quiz, dates) =
            futures::join!(self.questions.quiz(date), self.questions.available_dates());
        let quiz = quiz.map_err(SessionError::Source)?;

        let dates = dates.unwrap_or_else(|e| {
            tracing::warn!("could not list available dates: {e:#}");
            Vec::new()
        });
        let (previous, next) = adjacent_dates(&dates, &canonical_key(date));

        let record = self.history.resolve(date)?;

        Ok(LoadedQuiz {
            date,
            quiz,
            record,
            previous,
            next,
        })
    }

    /// Every date the question source has a quiz for.
    pub async fn available_dates(&self) -> Result<Vec<String>, SessionError> {
        self.questions
            .available_dates()
            .await
            .map_err(SessionError::Source)
    }

    /// Grade, store and report a full set of answers.
    ///
    /// Local state is written before the sink is contacted; a sink failure is
    /// logged and does not undo it.
    pub async fn submit(
        &mut self,
        date: NaiveDate,
        quiz: &QuizData,
        answers: Vec<String>,
    ) -> Result<SubmitOutcome, SessionError> {
        if self.history.resolve(date)?.is_some() {
            return Err(SessionError::AlreadySubmitted(canonical_key(date)));
        }

        let answered = answers.iter().filter(|a| !a.trim().is_empty()).count();
        if answers.len() != quiz.len() || answered != quiz.len() {
            return Err(SessionError::IncompleteAnswers {
                expected: quiz.len(),
                answered,
            });
        }

        let correct = self.evaluator.grade(&quiz.questions, &answers);
        let number_of_correct = correct.iter().filter(|&&c| c).count();
        self.history.save_submission(date, &answers, &correct)?;

        let ack = match &self.sink {
            Some(sink) => {
                let submission = Submission {
                    answers,
                    number_of_correct,
                };
                match sink.submit(&submission).await {
                    Ok(ack) => {
                        tracing::info!("submission stored ({number_of_correct} correct)");
                        Some(ack)
                    }
                    Err(e) => {
                        tracing::warn!("submission failed, keeping local result: {e:#}");
                        None
                    }
                }
            }
            None => None,
        };

        Ok(SubmitOutcome {
            correct,
            number_of_correct,
            ack,
        })
    }

    /// Flip the player's overturn flag for question `index`.
    ///
    /// Stored correctness is rewritten as evaluator verdict OR overturn.
    pub fn toggle_overturn(
        &mut self,
        date: NaiveDate,
        quiz: &QuizData,
        index: usize,
    ) -> Result<PlayRecord, SessionError> {
        let mut record = self
            .history
            .resolve(date)?
            .ok_or_else(|| SessionError::NotSubmitted(canonical_key(date)))?;

        if index >= quiz.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: quiz.len(),
            });
        }

        let answer = record.answers.get(index).map(String::as_str);
        if !record.is_overturned(index)
            && self.evaluator.judge(&quiz.questions[index], answer).is_correct()
        {
            return Err(SessionError::AlreadyCorrect { index });
        }

        if record.overturns.len() < quiz.len() {
            record.overturns.resize(quiz.len(), false);
        }
        record.overturns[index] = !record.overturns[index];

        let correct: CorrectnessSet = self
            .evaluator
            .grade(&quiz.questions, &record.answers)
            .into_iter()
            .zip(&record.overturns)
            .map(|(c, &o)| c || o)
            .collect();

        self.history
            .save_overturns(date, &record.overturns, &correct)?;
        record.correct = Some(correct);
        record.migrated_from = None;
        Ok(record)
    }

    /// Judge each stored answer and merge in the overturns.
    pub fn results(&self, quiz: &QuizData, record: &PlayRecord) -> Vec<QuestionResult> {
        quiz.questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let answer = record.answers.get(index).cloned().unwrap_or_default();
                let verdict = self.evaluator.judge(question, Some(answer.as_str()));
                let overturned = record.is_overturned(index);
                QuestionResult {
                    index,
                    question: question.text.clone(),
                    canonical_answer: question.answer.clone(),
                    answer,
                    verdict,
                    overturned,
                    status: ResultStatus::merge(verdict.is_correct(), overturned),
                }
            })
            .collect()
    }

    /// The share text for a played date.
    pub fn share(
        &self,
        loaded: &LoadedQuiz,
        today: NaiveDate,
        share_url: &str,
    ) -> Result<String, SessionError> {
        let key = canonical_key(loaded.date);
        let quiz = loaded.quiz.as_ref().ok_or_else(|| SessionError::NoQuiz(key.clone()))?;
        let record = loaded
            .record
            .as_ref()
            .ok_or(SessionError::NotSubmitted(key))?;

        let statuses: Vec<ResultStatus> =
            self.results(quiz, record).iter().map(|r| r.status).collect();
        Ok(share_text(
            &statuses,
            loaded.date,
            today,
            share_url,
            quiz.theme.as_deref(),
        ))
    }

    /// Today's average across all players, if a summary source answers.
    pub async fn daily_summary(&self) -> Option<DailySummary> {
        let source = self.summary.as_ref()?;
        match source.daily_summary().await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("couldn't fetch summary: {e:#}");
                None
            }
        }
    }

    /// The player's week against the server's week.
    ///
    /// `Ok(None)` when no summary source is configured or it fails.
    pub async fn weekly_report(&self, today: NaiveDate) -> Result<Option<WeeklyReport>, SessionError> {
        let Some(source) = self.summary.as_ref() else {
            return Ok(None);
        };
        let summary = match source.weekly_summary().await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!("failed to fetch weekly summary: {e:#}");
                return Ok(None);
            }
        };

        let daily = self.history.daily_correct(today, WEEKLY_LOOKBACK_DAYS)?;
        Ok(Some(WeeklyReport {
            user_average: statistics::user_weekly_average(&daily),
            server_average: statistics::server_weekly_average(&summary),
            streak: statistics::streak(&daily),
            chart: statistics::weekly_chart(&summary, &daily),
        }))
    }
}
