use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::info;

use crate::db;
use crate::error::Result;
use crate::ledger;
use crate::models::{Transaction, Watermark};

/// Snapshot of the unsettled ledger at preview time. The watermark is
/// the highest unsettled id seen; `None` when there is nothing to
/// settle. Cancelling a preview is just dropping this value, there is
/// no server-side state to clean up.
#[derive(Debug, Clone)]
pub struct SettlementPreview {
    pub watermark: Option<Watermark>,
    pub total_amount: Decimal,
    pub transactions: Vec<Transaction>,
}

impl SettlementPreview {
    pub fn count(&self) -> usize {
        self.transactions.len()
    }
}

/// What a confirm actually did. A `settled_count` of zero means the
/// watermark's rows were already settled; callers treat that as
/// success, not failure.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementOutcome {
    pub settled_count: usize,
    pub settled_ids: Vec<i64>,
}

pub fn preview_settlement(conn: &Connection) -> Result<SettlementPreview> {
    let transactions = ledger::unsettled_transactions(conn)?;
    let total_amount = transactions.iter().map(|t| t.amount).sum();
    let watermark = transactions.last().map(|t| Watermark::new(t.id)).transpose()?;
    Ok(SettlementPreview {
        watermark,
        total_amount,
        transactions,
    })
}

/// Marks every unsettled row at or below the watermark as settled, in
/// one write transaction. Rows recorded after the preview carry higher
/// ids and are left alone. The update re-checks `is_settled` at write
/// time, so replaying a confirm is a harmless no-op.
pub fn confirm_settlement(conn: &mut Connection, watermark: Watermark) -> Result<SettlementOutcome> {
    db::write_tx(conn, |tx| {
        let mut stmt =
            tx.prepare("SELECT id FROM transactions WHERE is_settled = 0 AND id <= ?1 ORDER BY id")?;
        let settled_ids: Vec<i64> = stmt
            .query_map([watermark.as_i64()], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if settled_ids.is_empty() {
            info!(%watermark, "confirm found nothing to settle");
            return Ok(SettlementOutcome {
                settled_count: 0,
                settled_ids,
            });
        }
        let settled_count = tx.execute(
            "UPDATE transactions SET is_settled = 1, updated_at = datetime('now') \
             WHERE is_settled = 0 AND id <= ?1",
            [watermark.as_i64()],
        )?;
        info!(%watermark, settled_count, "settlement confirmed");
        Ok(SettlementOutcome {
            settled_count,
            settled_ids,
        })
    })
}
