use rust_decimal::Decimal;

use crate::balance::compute_net_balance;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::ledger;
use crate::models::{NewExpense, Party};
use crate::settings::{db_path, load_settings};
use crate::split_rules::SplitRuleStore;

use super::balance::balance_line;
use super::parse_split;

pub fn run(
    amount: Decimal,
    payer: Party,
    category: &str,
    split: Option<String>,
    date: Option<String>,
    description: &str,
) -> Result<()> {
    let split = split.as_deref().map(parse_split).transpose()?;
    let conn = get_connection(&db_path())?;
    let id = ledger::insert_expense(
        &conn,
        &NewExpense {
            amount,
            payer,
            category: category.to_string(),
            split,
            description: description.to_string(),
            spent_on: date,
        },
    )?;

    let settings = load_settings();
    println!(
        "Recorded expense #{id}: {} {} (paid by {})",
        money(amount),
        category.trim(),
        settings.name_of(payer)
    );

    let rules = SplitRuleStore::new();
    let summary = compute_net_balance(&conn, &rules)?;
    println!("{}", balance_line(&settings, &summary));
    Ok(())
}
