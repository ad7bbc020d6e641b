use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::balance::compute_net_balance;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::models::Watermark;
use crate::settings::{db_path, load_settings};
use crate::settlement::{confirm_settlement, preview_settlement};
use crate::split_rules::SplitRuleStore;

use super::balance::balance_line;

pub fn preview() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let settings = load_settings();
    let preview = preview_settlement(&conn)?;

    let watermark = match preview.watermark {
        Some(w) => w,
        None => {
            println!("Nothing to settle.");
            return Ok(());
        }
    };

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Category", "Paid by", "Amount"]);
    for tx in &preview.transactions {
        table.add_row(vec![
            Cell::new(tx.id),
            Cell::new(&tx.spent_on),
            Cell::new(&tx.category),
            Cell::new(settings.name_of(tx.payer)),
            Cell::new(money(tx.amount)),
        ]);
    }
    println!("Unsettled expenses\n{table}");
    let noun = if preview.count() == 1 { "expense" } else { "expenses" };
    println!(
        "{} {noun} totalling {}",
        preview.count(),
        money(preview.total_amount)
    );

    let rules = SplitRuleStore::new();
    let summary = compute_net_balance(&conn, &rules)?;
    println!("{}", balance_line(&settings, &summary));
    println!();
    println!("Watermark: {watermark}");
    println!("Settle everything above with:");
    println!("  splitbook settle confirm {watermark}");
    println!("Expenses recorded after this preview are not touched.");
    Ok(())
}

pub fn confirm(watermark: Watermark) -> Result<()> {
    let mut conn = get_connection(&db_path())?;
    let outcome = confirm_settlement(&mut conn, watermark)?;

    if outcome.settled_count == 0 {
        println!("Nothing left to settle at watermark {watermark} (already confirmed?).");
        return Ok(());
    }
    let noun = if outcome.settled_count == 1 { "expense" } else { "expenses" };
    println!(
        "{}",
        format!(
            "Settled {} {noun} through #{watermark}.",
            outcome.settled_count
        )
        .green()
    );

    let settings = load_settings();
    let rules = SplitRuleStore::new();
    let summary = compute_net_balance(&conn, &rules)?;
    println!("{}", balance_line(&settings, &summary));
    Ok(())
}
