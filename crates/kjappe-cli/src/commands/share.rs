//! The `kjappe share` command.

use anyhow::Result;

use super::{Context, Options};

pub async fn execute(opts: Options, date: Option<String>) -> Result<()> {
    let mut ctx = Context::open(&opts)?;
    let date = ctx.date(date.as_deref())?;
    let (loaded, _) = ctx.load_quiz(date).await?;

    let text = ctx.game.share(&loaded, ctx.today, &ctx.config.share_url)?;
    println!("{text}");

    Ok(())
}
