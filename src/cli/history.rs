use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{money, percent_pair};
use crate::ledger;
use crate::settings::{db_path, load_settings};

pub fn run(all: bool) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let settings = load_settings();
    let rows = ledger::list_transactions(&conn, all)?;

    if rows.is_empty() {
        if all {
            println!("No transactions recorded yet.");
        } else {
            println!("No unsettled transactions. Try `splitbook history --all`.");
        }
        return Ok(());
    }

    let mut table = Table::new();
    let mut header = vec!["ID", "Date", "Category", "Paid by", "Split (A/B)", "Amount", "Description"];
    if all {
        header.push("Settled");
    }
    table.set_header(header);
    for tx in &rows {
        let split = match tx.explicit_split() {
            Some(split) => percent_pair(split.percent_a, split.percent_b),
            None => "(rule)".to_string(),
        };
        let mut cells = vec![
            Cell::new(tx.id),
            Cell::new(&tx.spent_on),
            Cell::new(&tx.category),
            Cell::new(settings.name_of(tx.payer)),
            Cell::new(split),
            Cell::new(money(tx.amount)),
            Cell::new(&tx.description),
        ];
        if all {
            cells.push(Cell::new(if tx.is_settled { "yes" } else { "" }));
        }
        table.add_row(cells);
    }
    let label = if all { "All transactions" } else { "Unsettled transactions" };
    println!("{label}\n{table}");
    let noun = if rows.len() == 1 { "row" } else { "rows" };
    println!("{} {noun}", rows.len());
    Ok(())
}
