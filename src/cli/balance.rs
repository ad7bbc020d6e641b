use colored::Colorize;

use crate::balance::{compute_net_balance, BalanceSummary};
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::models::Party;
use crate::settings::{db_path, load_settings, Settings};
use crate::split_rules::SplitRuleStore;

/// One-line reading of a balance, with display names from settings.
pub(crate) fn balance_line(settings: &Settings, summary: &BalanceSummary) -> String {
    match summary.who_is_owed {
        Some(creditor) => format!(
            "{} owes {} {}",
            settings.name_of(creditor.other()),
            settings.name_of(creditor),
            money(summary.net_outstanding)
        ),
        None if summary.is_settled() => "All settled up".to_string(),
        None => format!(
            "{} owes {} and {} owes {}",
            settings.name_of(Party::A),
            money(summary.party_a_owes),
            settings.name_of(Party::B),
            money(summary.party_b_owes)
        ),
    }
}

pub fn run() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let settings = load_settings();
    let rules = SplitRuleStore::new();
    let summary = compute_net_balance(&conn, &rules)?;

    if summary.is_settled() {
        println!("{}", "All settled up!".green().bold());
    } else {
        println!("{}", balance_line(&settings, &summary).bold());
    }
    println!("Unsettled expenses: {}", summary.unsettled_count);
    Ok(())
}
