use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::percent_pair;
use crate::settings::db_path;
use crate::split_rules::{normalize_category, SplitRuleStore};

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SplitRuleStore::new();
    let rules = store.all_rules(&conn);

    if rules.is_empty() {
        println!("No split rules set; every category splits 50/50.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Split (A/B)"]);
    for (category, rule) in &rules {
        table.add_row(vec![
            Cell::new(category),
            Cell::new(percent_pair(rule.percent_a, rule.percent_b)),
        ]);
    }
    println!("Split rules\n{table}");
    println!("Categories without a rule split 50/50.");
    Ok(())
}

pub fn get(category: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SplitRuleStore::new();
    let canonical = normalize_category(category);
    let rule = store.get_rule(&conn, category);
    let source = if store.all_rules(&conn).contains_key(&canonical) {
        "rule"
    } else {
        "default"
    };
    println!(
        "{category} \u{2192} {canonical}: {} ({source})",
        percent_pair(rule.percent_a, rule.percent_b)
    );
    Ok(())
}

pub fn set(category: &str, percent_a: Decimal, percent_b: Decimal) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SplitRuleStore::new();
    let canonical = store.update_rule(&conn, category, percent_a, percent_b)?;
    println!(
        "Set split for {canonical}: {}",
        percent_pair(percent_a, percent_b)
    );
    Ok(())
}
