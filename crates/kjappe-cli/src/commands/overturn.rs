//! The `kjappe overturn` command.

use anyhow::Result;

use super::{print_results, Context, Options};

/// Toggle the overturn for question `number` (1-based).
pub async fn execute(opts: Options, date: Option<String>, number: usize) -> Result<()> {
    anyhow::ensure!(number >= 1, "question numbers start at 1");

    let mut ctx = Context::open(&opts)?;
    let date = ctx.date(date.as_deref())?;
    let (_, quiz) = ctx.load_quiz(date).await?;

    let record = ctx.game.toggle_overturn(date, &quiz, number - 1)?;
    if record.is_overturned(number - 1) {
        println!("Question {number} marked as correct.");
    } else {
        println!("Question {number} no longer marked as correct.");
    }
    print_results(&ctx.game.results(&quiz, &record));

    Ok(())
}
