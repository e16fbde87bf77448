//! The `kjappe show` command.

use anyhow::Result;

use kjappe_core::datekey::canonical_key;

use super::{print_results, Context, Options};

pub async fn execute(opts: Options, date: Option<String>) -> Result<()> {
    let mut ctx = Context::open(&opts)?;
    let date = ctx.date(date.as_deref())?;
    let (loaded, quiz) = ctx.load_quiz(date).await?;

    let Some(record) = &loaded.record else {
        println!("No answers stored for {}.", canonical_key(date));
        return Ok(());
    };

    if let Some(legacy) = &record.migrated_from {
        println!("(moved stored answers from old key {legacy})");
    }
    print_results(&ctx.game.results(&quiz, record));

    Ok(())
}
