//! Core data model types for kjappe.
//!
//! Questions as they come from a question file, the per-date answer,
//! correctness and overturn sets, and the wire shapes exchanged with the
//! submission sink and summary source.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// The answers a player typed, one per question, in question order.
pub type AnswerSet = Vec<String>;

/// Evaluator verdicts per question, derived from an [`AnswerSet`] at submission.
pub type CorrectnessSet = Vec<bool>;

/// Player-asserted manual corrections per question.
pub type OverturnSet = Vec<bool>;

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question text shown to the player.
    #[serde(rename = "question")]
    pub text: String,
    /// The canonical answer.
    pub answer: String,
    /// Alternative accepted answers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Question {
    pub fn new(text: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            answer: answer.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }
}

/// The questions for one date, plus optional theme and announcement.
///
/// Question files come in two shapes: a full object, or (older files) a bare
/// array of questions. Both deserialize into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "QuizFile")]
pub struct QuizData {
    pub questions: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement: Option<String>,
}

impl QuizData {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            theme: None,
            announcement: None,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuizFile {
    Full {
        questions: Vec<Question>,
        #[serde(default)]
        theme: Option<String>,
        #[serde(default)]
        announcement: Option<String>,
    },
    Bare(Vec<Question>),
}

impl From<QuizFile> for QuizData {
    fn from(file: QuizFile) -> Self {
        match file {
            QuizFile::Full {
                questions,
                theme,
                announcement,
            } => Self {
                questions,
                theme,
                announcement,
            },
            QuizFile::Bare(questions) => Self::new(questions),
        }
    }
}

/// Body sent to the submission sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub answers: AnswerSet,
    pub number_of_correct: usize,
}

/// Acknowledgment returned by the submission sink. Treated as opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAck {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Today's aggregate result across all players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// Fraction of all answers that were correct, in `0.0..=1.0`.
    #[serde(deserialize_with = "deserialize_lenient_f64")]
    pub average_correct: f64,
    #[serde(default)]
    pub total_submissions: Option<u64>,
}

/// This week's aggregate results across all players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    /// Fraction of all answers this week that were correct.
    #[serde(deserialize_with = "deserialize_lenient_f64")]
    pub weekly_average: f64,
    pub total_submissions: u64,
    /// Mean number of correct answers per submission, keyed by ISO date.
    pub daily_average_stats: BTreeMap<String, f64>,
    pub start_date: String,
    pub end_date: String,
}

/// Averages come back either as numbers or as pre-formatted strings ("0.60").
fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
