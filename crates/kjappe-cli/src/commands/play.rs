//! The `kjappe play` command.

use std::io::{BufRead, Write};

use anyhow::{Context as _, Result};

use kjappe_core::datekey::canonical_key;
use kjappe_core::model::{DailySummary, QuizData};
use kjappe_core::statistics::score_boxes;
use kjappe_core::PlayRecord;

use super::{print_results, Context, Options};

pub async fn execute(opts: Options, date: Option<String>, answers: Vec<String>) -> Result<()> {
    let mut ctx = Context::open(&opts)?;
    let date = ctx.date(date.as_deref())?;
    let (loaded, quiz) = ctx.load_quiz(date).await?;

    if let Some(announcement) = &quiz.announcement {
        println!("{announcement}\n");
    }
    if let Some(theme) = &quiz.theme {
        println!("Dagens tema: {theme}\n");
    }

    if let Some(record) = &loaded.record {
        println!("Already submitted for {}.", canonical_key(date));
        print_results(&ctx.game.results(&quiz, record));
        return Ok(());
    }

    let answers = if answers.is_empty() {
        read_answers(&quiz)?
    } else {
        answers
    };

    let outcome = ctx.game.submit(date, &quiz, answers.clone()).await?;
    let record = PlayRecord {
        answers,
        correct: Some(outcome.correct),
        overturns: Vec::new(),
        migrated_from: None,
    };
    print_results(&ctx.game.results(&quiz, &record));

    if date == ctx.today {
        if let Some(summary) = ctx.game.daily_summary().await {
            print_daily_summary(&summary, ctx.config.questions_per_quiz);
        }
    }

    Ok(())
}

/// Prompt for each question on stderr and read one answer per stdin line.
fn read_answers(quiz: &QuizData) -> Result<Vec<String>> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut answers = Vec::with_capacity(quiz.len());

    for (i, question) in quiz.questions.iter().enumerate() {
        eprint!("{}. {}\n> ", i + 1, question.text);
        std::io::stderr().flush()?;
        match lines.next() {
            Some(line) => answers.push(line.context("failed to read answer")?),
            None => anyhow::bail!(
                "expected {} answers on stdin, got {}",
                quiz.len(),
                answers.len()
            ),
        }
    }
    eprintln!();

    Ok(answers)
}

fn print_daily_summary(summary: &DailySummary, questions_per_quiz: usize) {
    let boxes = score_boxes(summary.average_correct, questions_per_quiz);
    let bar = format!(
        "{}{}{}",
        "■".repeat(boxes.full),
        if boxes.partial > 0.0 { "▣" } else { "" },
        "□".repeat(boxes.empty)
    );
    let players = summary
        .total_submissions
        .map(|n| format!(" ({n} players)"))
        .unwrap_or_default();
    println!(
        "\nEveryone today: {bar} {:.0}% correct{players}",
        summary.average_correct * 100.0
    );
}
