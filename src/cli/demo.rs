use std::str::FromStr;

use chrono::{Datelike, Local};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::balance::compute_net_balance;
use crate::db::{get_connection, init_db};
use crate::error::{Result, SplitbookError};
use crate::ledger;
use crate::models::{NewExpense, Party};
use crate::settings::{db_path, load_settings};
use crate::split_rules::SplitRuleStore;

use super::balance::balance_line;

// (category, percent_a, percent_b)
const RULES: &[(&str, &str, &str)] = &[
    ("groceries", "0.6", "0.4"),
    ("rent", "0.7", "0.3"),
    ("dining", "0.5", "0.5"),
];

struct DemoExpense {
    months_ago: u32,
    day: u32,
    amount: &'static str,
    payer: Party,
    category: &'static str,
    split: Option<(&'static str, &'static str)>,
    description: &'static str,
}

const EXPENSES: &[DemoExpense] = &[
    DemoExpense { months_ago: 2, day: 1, amount: "1800.00", payer: Party::A, category: "Rent", split: None, description: "monthly rent" },
    DemoExpense { months_ago: 2, day: 4, amount: "112.40", payer: Party::B, category: "Groceries", split: None, description: "weekly shop" },
    DemoExpense { months_ago: 2, day: 10, amount: "88.17", payer: Party::B, category: "Utilities", split: None, description: "power + internet" },
    DemoExpense { months_ago: 2, day: 15, amount: "64.00", payer: Party::A, category: "Dining", split: None, description: "thai takeout" },
    DemoExpense { months_ago: 2, day: 21, amount: "41.30", payer: Party::B, category: "Transport", split: None, description: "fuel" },
    DemoExpense { months_ago: 1, day: 1, amount: "1800.00", payer: Party::A, category: "Rent", split: None, description: "monthly rent" },
    DemoExpense { months_ago: 1, day: 6, amount: "131.25", payer: Party::B, category: "Groceries", split: None, description: "weekly shop" },
    DemoExpense { months_ago: 1, day: 12, amount: "150.00", payer: Party::A, category: "Entertainment", split: Some(("0", "1")), description: "concert tickets, B's treat" },
    DemoExpense { months_ago: 1, day: 18, amount: "92.60", payer: Party::B, category: "Utilities", split: None, description: "power + internet" },
    DemoExpense { months_ago: 0, day: 1, amount: "1800.00", payer: Party::A, category: "Rent", split: None, description: "monthly rent" },
    DemoExpense { months_ago: 0, day: 3, amount: "98.75", payer: Party::B, category: "Groceries", split: None, description: "weekly shop" },
    DemoExpense { months_ago: 0, day: 8, amount: "57.20", payer: Party::A, category: "Dining", split: None, description: "brunch" },
    DemoExpense { months_ago: 0, day: 14, amount: "320.00", payer: Party::B, category: "Travel", split: None, description: "weekend cabin deposit" },
];

fn parse_amount(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| SplitbookError::Validation(format!("bad demo amount '{raw}': {e}")))
}

fn make_date(months_ago: u32, day: u32) -> String {
    let target = Local::now().date_naive() - chrono::Months::new(months_ago);
    format!("{:04}-{:02}-{day:02}", target.year(), target.month())
}

fn insert_demo_data(conn: &Connection, store: &SplitRuleStore) -> Result<usize> {
    for (category, pa, pb) in RULES {
        store.update_rule(conn, category, parse_amount(pa)?, parse_amount(pb)?)?;
    }

    for e in EXPENSES {
        let split = match e.split {
            Some((pa, pb)) => Some((parse_amount(pa)?, parse_amount(pb)?)),
            None => None,
        };
        ledger::insert_expense(
            conn,
            &NewExpense {
                amount: parse_amount(e.amount)?,
                payer: e.payer,
                category: e.category.to_string(),
                split,
                description: e.description.to_string(),
                spent_on: Some(make_date(e.months_ago, e.day)),
            },
        )?;
    }
    Ok(EXPENSES.len())
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let path = db_path();

    if !path.exists() {
        eprintln!("No database found. Run `splitbook init` first.");
        std::process::exit(1);
    }

    let conn = get_connection(&path)?;
    init_db(&conn)?;

    // Idempotency guard
    let has_rows: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM transactions)",
        [],
        |r| r.get(0),
    )?;
    if has_rows {
        println!("Demo data not loaded: the ledger already has transactions.");
        return Ok(());
    }

    let store = SplitRuleStore::new();
    let count = insert_demo_data(&conn, &store)?;
    let summary = compute_net_balance(&conn, &store)?;

    println!("Demo data loaded!");
    println!("  Expenses: {count}");
    println!("  Rules:    {}", RULES.len());
    println!("  Balance:  {}", balance_line(&settings, &summary));
    println!();
    println!("Try these next:");
    println!("  splitbook balance");
    println!("  splitbook history");
    println!("  splitbook rules list");
    println!("  splitbook settle preview");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_demo_creates_data() {
        let (_dir, conn) = test_db();
        let store = SplitRuleStore::new();
        let count = insert_demo_data(&conn, &store).unwrap();

        let rows: i64 = conn
            .query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, count as i64);
        assert_eq!(store.all_rules(&conn).len(), RULES.len());
    }

    #[test]
    fn test_demo_dates_are_valid() {
        for e in EXPENSES {
            let date = make_date(e.months_ago, e.day);
            assert!(
                NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok(),
                "invalid date: {date}"
            );
        }
    }

    #[test]
    fn test_demo_leaves_an_outstanding_balance() {
        let (_dir, conn) = test_db();
        let store = SplitRuleStore::new();
        insert_demo_data(&conn, &store).unwrap();

        let summary = compute_net_balance(&conn, &store).unwrap();
        assert!(summary.net_outstanding > Decimal::ZERO);
        // A fronts the rent, so B ends up owing
        assert_eq!(summary.who_is_owed, Some(Party::A));
    }
}
