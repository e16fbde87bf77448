//! Question files on disk.
//!
//! A question directory holds one `YYYYMMDD.json` file per quiz date.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::datekey::{canonical_key, parse_canonical_key};
use crate::model::QuizData;
use crate::traits::QuestionSource;

/// Path of the question file for `date` inside `dir`.
pub fn quiz_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}.json", canonical_key(date)))
}

/// Parse a question file's contents.
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<QuizData> {
    serde_json::from_str(content)
        .with_context(|| format!("failed to parse question file: {}", source_path.display()))
}

/// Load the quiz for `date`. A missing file means no quiz that day.
pub fn load_quiz(dir: &Path, date: NaiveDate) -> Result<Option<QuizData>> {
    let path = quiz_path(dir, date);
    if !path.exists() {
        tracing::debug!("no question file at {}", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read question file: {}", path.display()))?;
    parse_quiz_str(&content, &path).map(Some)
}

/// Every date with a question file, as canonical keys, ascending.
pub fn available_dates(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut dates = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if parse_canonical_key(stem).is_ok() {
            dates.push(stem.to_string());
        } else {
            tracing::warn!("skipping {}: file name is not a YYYYMMDD date", path.display());
        }
    }

    dates.sort();
    Ok(dates)
}

/// Previous and next quiz dates around `current`.
///
/// When `current` has no quiz, the latest available date is offered as
/// "previous" and there is no "next".
pub fn adjacent_dates(dates: &[String], current: &str) -> (Option<String>, Option<String>) {
    match dates.iter().position(|d| d == current) {
        Some(i) => {
            let prev = i.checked_sub(1).map(|p| dates[p].clone());
            let next = dates.get(i + 1).cloned();
            (prev, next)
        }
        None => (dates.last().cloned(), None),
    }
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Zero-based question index, if the warning concerns one question.
    pub question: Option<usize>,
    pub message: String,
}

/// Check a quiz for common authoring mistakes.
pub fn validate_quiz(quiz: &QuizData, expected_len: usize) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.len() != expected_len {
        warnings.push(ValidationWarning {
            question: None,
            message: format!(
                "expected {expected_len} questions, found {}",
                quiz.questions.len()
            ),
        });
    }

    for (i, q) in quiz.questions.iter().enumerate() {
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                question: Some(i),
                message: "question text is empty".into(),
            });
        }
        if q.answer.trim().is_empty() {
            warnings.push(ValidationWarning {
                question: Some(i),
                message: "answer is empty".into(),
            });
        }

        let mut seen = HashSet::new();
        for alias in &q.aliases {
            let normalized = crate::evaluator::normalize(alias);
            if normalized.is_empty() {
                warnings.push(ValidationWarning {
                    question: Some(i),
                    message: "alias is empty".into(),
                });
            } else if !seen.insert(normalized) {
                warnings.push(ValidationWarning {
                    question: Some(i),
                    message: format!("duplicate alias: {alias}"),
                });
            }
        }
    }

    warnings
}

/// Serves quizzes from a directory of question files.
#[derive(Debug, Clone)]
pub struct DirectoryQuestionSource {
    dir: PathBuf,
}

impl DirectoryQuestionSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl QuestionSource for DirectoryQuestionSource {
    fn name(&self) -> &str {
        "directory"
    }

    async fn quiz(&self, date: NaiveDate) -> Result<Option<QuizData>> {
        load_quiz(&self.dir, date)
    }

    async fn available_dates(&self) -> Result<Vec<String>> {
        available_dates(&self.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    const QUIZ_JSON: &str = r#"{
        "theme": "Musikk",
        "questions": [
            {"question": "Who wrote the Magic Flute?", "answer": "Mozart"},
            {"question": "Who wrote Peer Gynt's music?", "answer": "Grieg", "aliases": ["Edvard Grieg"]},
            {"question": "Fifth symphony?", "answer": "Beethoven"},
            {"question": "Four Seasons?", "answer": "Vivaldi"},
            {"question": "Brandenburg Concertos?", "answer": "Bach"}
        ]
    }"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn load_existing_and_missing_quiz() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("20240307.json"), QUIZ_JSON).unwrap();

        let quiz = load_quiz(dir.path(), date(2024, 3, 7)).unwrap().unwrap();
        assert_eq!(quiz.len(), 5);
        assert_eq!(quiz.theme.as_deref(), Some("Musikk"));

        assert!(load_quiz(dir.path(), date(2024, 3, 8)).unwrap().is_none());
    }

    #[test]
    fn load_malformed_quiz_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("20240307.json"), "{ nope").unwrap();
        let err = load_quiz(dir.path(), date(2024, 3, 7)).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn available_dates_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["20240308.json", "20240301.json", "notes.txt", "draft.json"] {
            std::fs::write(dir.path().join(name), "[]").unwrap();
        }
        let dates = available_dates(dir.path()).unwrap();
        assert_eq!(dates, vec!["20240301", "20240308"]);
    }

    #[test]
    fn available_dates_requires_directory() {
        assert!(available_dates(Path::new("/definitely/not/here")).is_err());
    }

    #[test]
    fn adjacent_dates_navigation() {
        let dates: Vec<String> = ["20240301", "20240304", "20240305"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(
            adjacent_dates(&dates, "20240304"),
            (Some("20240301".into()), Some("20240305".into()))
        );
        assert_eq!(adjacent_dates(&dates, "20240301"), (None, Some("20240304".into())));
        assert_eq!(adjacent_dates(&dates, "20240305"), (Some("20240304".into()), None));
        assert_eq!(adjacent_dates(&dates, "20240310"), (Some("20240305".into()), None));
        assert_eq!(adjacent_dates(&[], "20240310"), (None, None));
    }

    #[test]
    fn validate_flags_authoring_mistakes() {
        let quiz = QuizData::new(vec![
            Question::new("Q1", "A1").with_aliases(["x", "X ", ""]),
            Question::new("  ", ""),
        ]);
        let warnings = validate_quiz(&quiz, 5);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("expected 5 questions")));
        assert!(messages.iter().any(|m| m.contains("duplicate alias")));
        assert!(messages.contains(&"alias is empty"));
        assert!(messages.contains(&"question text is empty"));
        assert!(messages.contains(&"answer is empty"));
    }

    #[test]
    fn validate_clean_quiz() {
        let quiz = parse_quiz_str(QUIZ_JSON, Path::new("20240307.json")).unwrap();
        assert!(validate_quiz(&quiz, 5).is_empty());
    }

    #[tokio::test]
    async fn directory_source_serves_quizzes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("20240307.json"), QUIZ_JSON).unwrap();
        let source = DirectoryQuestionSource::new(dir.path());

        assert_eq!(source.name(), "directory");
        assert!(source.quiz(date(2024, 3, 7)).await.unwrap().is_some());
        assert!(source.quiz(date(2024, 3, 6)).await.unwrap().is_none());
        assert_eq!(source.available_dates().await.unwrap(), vec!["20240307"]);
    }
}
