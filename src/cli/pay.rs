use colored::Colorize;
use rust_decimal::Decimal;

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::models::Party;
use crate::payment::record_payment;
use crate::settings::{db_path, load_settings};
use crate::split_rules::SplitRuleStore;

use super::balance::balance_line;

pub fn run(amount: Decimal, from: Party, description: &str) -> Result<()> {
    let mut conn = get_connection(&db_path())?;
    let settings = load_settings();
    let rules = SplitRuleStore::new();

    let receipt = record_payment(&mut conn, &rules, from, amount, description)?;
    println!(
        "Recorded payment #{}: {} from {}",
        receipt.transaction_id,
        money(amount),
        settings.name_of(from)
    );
    if receipt.was_settled {
        println!("{}", "All settled up!".green().bold());
    } else {
        println!("{}", balance_line(&settings, &receipt.new_balance));
    }
    Ok(())
}
