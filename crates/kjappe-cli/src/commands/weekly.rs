//! The `kjappe weekly` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use kjappe_core::statistics::is_friday;

use super::{Context, Options};

pub async fn execute(opts: Options, force: bool) -> Result<()> {
    let ctx = Context::open(&opts)?;

    if !is_friday(ctx.today) && !force {
        println!("The weekly summary is ready on Friday. Use --force to see it now.");
        return Ok(());
    }

    let Some(report) = ctx.game.weekly_report(ctx.today).await? else {
        println!("Weekly summary unavailable: no quiz server configured or it did not answer.");
        return Ok(());
    };

    let mut table = Table::new();
    table.set_header(vec!["Day", "Date", "You", "Everyone"]);
    for day in &report.chart {
        table.add_row(vec![
            Cell::new(day.day),
            Cell::new(&day.date_key),
            Cell::new(day.user_correct),
            Cell::new(format!("{:.1}", day.average_correct)),
        ]);
    }
    println!("{table}");

    println!("Your average: {:.1} correct", report.user_average);
    println!("Everyone's average: {:.1} correct", report.server_average);
    println!("Streak: {} day(s)", report.streak);

    Ok(())
}
