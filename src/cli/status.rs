use crate::balance::compute_net_balance;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::{db_path, load_settings, settings_file_exists};
use crate::split_rules::SplitRuleStore;

use super::balance::balance_line;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let path = db_path();

    if settings_file_exists() {
        println!("Settings:   saved");
    } else {
        println!("Settings:   defaults (run `splitbook init` to save)");
    }
    println!("Data dir:   {}", settings.data_dir);
    println!(
        "Parties:    {} (A), {} (B)",
        settings.party_a_name, settings.party_b_name
    );
    println!("Database:   {}", path.display());

    if !path.exists() {
        println!();
        println!("Database not found. Run `splitbook init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let conn = get_connection(&path)?;
    let total: i64 = conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?;
    let unsettled: i64 = conn.query_row(
        "SELECT count(*) FROM transactions WHERE is_settled = 0",
        [],
        |r| r.get(0),
    )?;
    let store = SplitRuleStore::new();

    println!();
    println!("Expenses:   {total} total, {unsettled} unsettled");
    println!("Rules:      {}", store.all_rules(&conn).len());

    let summary = compute_net_balance(&conn, &store)?;
    println!("Balance:    {}", balance_line(&settings, &summary));
    Ok(())
}
