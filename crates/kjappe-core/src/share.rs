//! Shareable result text.

use chrono::NaiveDate;
use serde::Serialize;

use crate::datekey::iso_date;

/// Default public address of the quiz.
pub const DEFAULT_SHARE_URL: &str = "https://www.femkjappe.no";

/// Merged display state of one answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// Accepted by the evaluator.
    Correct,
    /// Rejected by the evaluator, but the player claimed it.
    Overturned,
    Incorrect,
}

impl ResultStatus {
    /// Evaluator verdict wins over an overturn.
    pub fn merge(evaluator_correct: bool, overturned: bool) -> Self {
        if evaluator_correct {
            ResultStatus::Correct
        } else if overturned {
            ResultStatus::Overturned
        } else {
            ResultStatus::Incorrect
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ResultStatus::Correct => "🟩",
            ResultStatus::Overturned => "🟨",
            ResultStatus::Incorrect => "🟥",
        }
    }

    pub fn counts_as_correct(self) -> bool {
        !matches!(self, ResultStatus::Incorrect)
    }
}

/// Build the text a player pastes to share their result.
///
/// Past quizzes link to their date; today's quiz links to the bare address.
pub fn share_text(
    statuses: &[ResultStatus],
    quiz_date: NaiveDate,
    today: NaiveDate,
    share_url: &str,
    theme: Option<&str>,
) -> String {
    let squares: String = statuses.iter().map(|s| s.symbol()).collect();

    let legend = if statuses.contains(&ResultStatus::Overturned) {
        "\n🟨 = rettet selv"
    } else {
        ""
    };

    let url = if quiz_date == today {
        share_url.to_string()
    } else {
        format!("{share_url}?date={}", iso_date(quiz_date))
    };

    let theme = theme
        .filter(|t| !t.trim().is_empty())
        .map(|t| format!(" Dagens tema: {t}"))
        .unwrap_or_default();

    format!("{squares}{legend}\nSpill fem kjappe på: {url}{theme}")
}
