use std::path::Path;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::Result;

// AUTOINCREMENT keeps ids strictly increasing even after deletes;
// settlement watermarks rely on ids never being reused. Money columns
// are canonical decimal strings, parsed on read.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    amount TEXT NOT NULL,
    payer TEXT NOT NULL CHECK (payer IN ('A', 'B')),
    category TEXT NOT NULL,
    percent_a TEXT,
    percent_b TEXT,
    is_settled INTEGER NOT NULL DEFAULT 0,
    description TEXT NOT NULL DEFAULT '',
    spent_on TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_transactions_unsettled
    ON transactions (is_settled, id);

CREATE TABLE IF NOT EXISTS config (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Runs `f` inside an immediate-mode transaction: the write lock is
/// taken up front, so a read-modify-write sequence inside `f` sees a
/// stable ledger. Commits on `Ok`, rolls back on `Err`.
pub fn write_tx<T>(conn: &mut Connection, f: impl FnOnce(&Transaction) -> Result<T>) -> Result<T> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let out = f(&tx)?;
    tx.commit()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SplitbookError;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn insert_raw(conn: &Connection) -> i64 {
        conn.execute(
            "INSERT INTO transactions (amount, payer, category, spent_on) VALUES ('10', 'A', 'Groceries', '2026-01-01')",
            [],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["transactions", "config"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_ids_are_never_reused() {
        let (_dir, conn) = test_db();
        let first = insert_raw(&conn);
        let second = insert_raw(&conn);
        assert!(second > first);
        conn.execute("DELETE FROM transactions WHERE id = ?1", [second]).unwrap();
        let third = insert_raw(&conn);
        assert!(third > second, "id {third} reused after deleting {second}");
    }

    #[test]
    fn test_write_tx_commits_on_ok() {
        let (_dir, mut conn) = test_db();
        write_tx(&mut conn, |tx| {
            insert_raw(tx);
            Ok(())
        })
        .unwrap();
        let count: i64 = conn
            .query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_write_tx_rolls_back_on_err() {
        let (_dir, mut conn) = test_db();
        let result: Result<()> = write_tx(&mut conn, |tx| {
            insert_raw(tx);
            Err(SplitbookError::Validation("boom".into()))
        });
        assert!(result.is_err());
        let count: i64 = conn
            .query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
