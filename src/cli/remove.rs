use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::ledger;
use crate::settings::db_path;

pub fn run(id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let doomed = ledger::get_transaction(&conn, id)?;
    ledger::delete_expense(&conn, id)?;
    if let Some(tx) = doomed {
        println!("Removed expense #{id}: {} {}", money(tx.amount), tx.category);
    }
    Ok(())
}
