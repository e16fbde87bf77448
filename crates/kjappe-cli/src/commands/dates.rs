//! The `kjappe dates` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use kjappe_core::datekey::parse_canonical_key;

use super::{Context, Options};

pub async fn execute(opts: Options, date: Option<String>) -> Result<()> {
    let mut ctx = Context::open(&opts)?;
    let date = ctx.date(date.as_deref())?;

    let dates = ctx.game.available_dates().await?;
    if dates.is_empty() {
        println!("No quizzes available.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Played"]);
    for key in &dates {
        let played = match parse_canonical_key(key) {
            Ok(day) => ctx
                .game
                .history()
                .correct_count(day)?
                .map(|n| format!("{n} correct"))
                .unwrap_or_else(|| "-".into()),
            Err(_) => "-".into(),
        };
        table.add_row(vec![Cell::new(key), Cell::new(played)]);
    }
    println!("{table}");

    let loaded = ctx.game.load(date).await?;
    println!(
        "Previous: {}",
        loaded.previous.as_deref().unwrap_or("none")
    );
    println!("Next: {}", loaded.next.as_deref().unwrap_or("none"));

    Ok(())
}
