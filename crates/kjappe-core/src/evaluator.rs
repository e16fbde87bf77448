//! Answer evaluation with typo tolerance.
//!
//! A player's answer is accepted when, after lower-casing and trimming, it
//! equals the canonical answer, or lies within a fixed Levenshtein distance of
//! any alias or of the canonical answer itself. The tolerance does not scale
//! with answer length: a two-letter answer accepts the same two edits as a
//! twenty-letter one.

use serde::{Deserialize, Serialize};

use crate::model::{CorrectnessSet, Question};

/// Default maximum edit distance for an answer to count as correct.
pub const DEFAULT_THRESHOLD: usize = 2;

/// Evaluator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Maximum Levenshtein distance (inclusive) accepted by fuzzy matching.
    pub threshold: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// How an answer was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Normalized answer equals the normalized canonical answer.
    Exact,
    /// Within the threshold of one of the aliases.
    Alias,
    /// Within the threshold of the canonical answer.
    Fuzzy,
    Incorrect,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        !matches!(self, Verdict::Incorrect)
    }
}

/// Judges player answers against questions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Shorthand for an evaluator with the given threshold.
    pub fn with_threshold(threshold: usize) -> Self {
        Self::new(EvaluatorConfig { threshold })
    }

    pub fn config(&self) -> EvaluatorConfig {
        self.config
    }

    /// Judge a raw answer against a canonical answer and its aliases.
    ///
    /// Precedence is exact, then alias, then fuzzy canonical match. Blank
    /// input is always incorrect.
    pub fn verdict<S: AsRef<str>>(
        &self,
        user_answer: &str,
        canonical: &str,
        aliases: &[S],
    ) -> Verdict {
        let user = normalize(user_answer);
        if user.is_empty() {
            return Verdict::Incorrect;
        }

        let canonical = normalize(canonical);
        if user == canonical {
            return Verdict::Exact;
        }

        let threshold = self.config.threshold;
        if aliases
            .iter()
            .any(|alias| levenshtein(&user, &normalize(alias.as_ref())) <= threshold)
        {
            return Verdict::Alias;
        }

        if levenshtein(&user, &canonical) <= threshold {
            return Verdict::Fuzzy;
        }

        Verdict::Incorrect
    }

    pub fn is_correct<S: AsRef<str>>(
        &self,
        user_answer: &str,
        canonical: &str,
        aliases: &[S],
    ) -> bool {
        self.verdict(user_answer, canonical, aliases).is_correct()
    }

    /// Judge an answer to a question. A missing answer is incorrect.
    pub fn judge(&self, question: &Question, answer: Option<&str>) -> Verdict {
        match answer {
            Some(answer) => self.verdict(answer, &question.answer, &question.aliases),
            None => Verdict::Incorrect,
        }
    }

    /// Grade a whole answer set positionally against the questions.
    ///
    /// The result always has one entry per question.
    pub fn grade<S: AsRef<str>>(&self, questions: &[Question], answers: &[S]) -> CorrectnessSet {
        questions
            .iter()
            .enumerate()
            .map(|(i, q)| self.judge(q, answers.get(i).map(AsRef::as_ref)).is_correct())
            .collect()
    }
}

/// [`Evaluator::is_correct`] with the default threshold.
pub fn is_correct<S: AsRef<str>>(user_answer: &str, canonical: &str, aliases: &[S]) -> bool {
    Evaluator::default().is_correct(user_answer, canonical, aliases)
}

/// Lower-case and trim. No other Unicode normalization is applied.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Levenshtein distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
