//! The `kjappe validate` command.

use std::path::PathBuf;

use anyhow::Result;

use kjappe_core::datekey::parse_canonical_key;
use kjappe_core::questions::{available_dates, load_quiz, validate_quiz};

use super::Options;

pub fn execute(opts: Options, questions: Option<PathBuf>) -> Result<()> {
    let config = opts.load_config()?;
    let dir = questions.unwrap_or(config.questions_dir);

    let dates = available_dates(&dir)?;
    if dates.is_empty() {
        println!("No question files found in {}.", dir.display());
        return Ok(());
    }

    let mut total_warnings = 0;

    for key in &dates {
        let date = parse_canonical_key(key)?;
        let Some(quiz) = load_quiz(&dir, date)? else {
            continue;
        };
        println!("{key}.json ({} questions)", quiz.len());

        let warnings = validate_quiz(&quiz, config.questions_per_quiz);
        for w in &warnings {
            let prefix = w
                .question
                .map(|i| format!("  [question {}]", i + 1))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All question files valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
