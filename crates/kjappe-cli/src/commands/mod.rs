//! Subcommands and the setup they share.

pub mod dates;
pub mod init;
pub mod overturn;
pub mod play;
pub mod share;
pub mod show;
pub mod validate;
pub mod weekly;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table};

use kjappe_client::config::load_config_from;
use kjappe_client::KjappeConfig;
use kjappe_core::datekey::{canonical_key, local_today, parse_date_input};
use kjappe_core::evaluator::Verdict;
use kjappe_core::model::QuizData;
use kjappe_core::questions::DirectoryQuestionSource;
use kjappe_core::session::{LoadedQuiz, QuestionResult};
use kjappe_core::share::ResultStatus;
use kjappe_core::{Evaluator, FileStore, Game, SessionError};

/// Global options every command receives.
pub struct Options {
    pub config: Option<PathBuf>,
    pub today: Option<String>,
    pub offline: bool,
}

impl Options {
    pub fn load_config(&self) -> Result<KjappeConfig> {
        load_config_from(self.config.as_deref())
    }

    pub fn today(&self) -> Result<NaiveDate> {
        match &self.today {
            Some(input) => parse_date(input),
            None => Ok(local_today()),
        }
    }
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    parse_date_input(input).with_context(|| format!("invalid date: {input}"))
}

/// A game wired to the configured store and backends.
pub struct Context {
    pub config: KjappeConfig,
    pub today: NaiveDate,
    pub game: Game<FileStore>,
}

impl Context {
    pub fn open(opts: &Options) -> Result<Self> {
        let config = opts.load_config()?;
        let today = opts.today()?;

        let store = FileStore::open(&config.store_path)
            .with_context(|| format!("failed to open store: {}", config.store_path.display()))?;
        let evaluator = Evaluator::new(config.evaluator_config());

        let client = if opts.offline {
            None
        } else {
            config.api_client()?
        };
        let game = match client {
            Some(client) => {
                tracing::debug!("using quiz server at {}", client.base_url());
                let client = Arc::new(client);
                Game::new(evaluator, store, client.clone())
                    .with_sink(client.clone())
                    .with_summary(client)
            }
            None => {
                let source = DirectoryQuestionSource::new(&config.questions_dir);
                Game::new(evaluator, store, Arc::new(source))
            }
        };

        Ok(Self {
            config,
            today,
            game,
        })
    }

    /// The requested date, or today.
    pub fn date(&self, input: Option<&str>) -> Result<NaiveDate> {
        input.map_or(Ok(self.today), parse_date)
    }

    /// Load `date`, failing when there is no quiz that day.
    pub async fn load_quiz(&mut self, date: NaiveDate) -> Result<(LoadedQuiz, QuizData)> {
        let loaded = self.game.load(date).await?;
        match loaded.quiz.clone() {
            Some(quiz) => Ok((loaded, quiz)),
            None => Err(SessionError::NoQuiz(canonical_key(date)).into()),
        }
    }
}

fn verdict_label(result: &QuestionResult) -> &'static str {
    match (result.status, result.verdict) {
        (ResultStatus::Overturned, _) => "overturned",
        (_, Verdict::Exact) => "correct",
        (_, Verdict::Alias) => "correct (alias)",
        (_, Verdict::Fuzzy) => "close enough",
        (_, Verdict::Incorrect) => "wrong",
    }
}

/// Print one row per question and the score line.
pub fn print_results(results: &[QuestionResult]) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Answer", "Result"]);

    for r in results {
        table.add_row(vec![
            Cell::new(r.index + 1),
            Cell::new(&r.question),
            Cell::new(&r.answer),
            Cell::new(&r.canonical_answer),
            Cell::new(format!("{} {}", r.status.symbol(), verdict_label(r))),
        ]);
    }

    let correct = results
        .iter()
        .filter(|r| r.status.counts_as_correct())
        .count();
    println!("{table}");
    println!("{correct}/{} correct", results.len());
}
