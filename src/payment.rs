use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::info;

use crate::balance::{self, BalanceSummary};
use crate::db;
use crate::error::{Result, SplitbookError};
use crate::ledger;
use crate::models::{NewExpense, Party};
use crate::split_rules::SplitRuleStore;

/// Category under which payments land in the ledger.
pub const SETTLEMENT_CATEGORY: &str = "Settlement";

#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub transaction_id: i64,
    pub was_settled: bool,
    pub new_balance: BalanceSummary,
}

/// Records a payment from `payer` against what they currently owe.
///
/// The outstanding amount is recomputed and the row inserted inside
/// one write transaction, so a concurrent expense or second payment
/// cannot slip between the check and the insert. Paying more than is
/// owed at write time is a concurrency error; the caller re-reads the
/// balance and retries.
///
/// The payment row allocates the full share to the receiving side and
/// flows through the same balance math as any expense: paying $30 of
/// a $30 debt nets both parties to zero.
pub fn record_payment(
    conn: &mut Connection,
    rules: &SplitRuleStore,
    payer: Party,
    amount: Decimal,
    description: &str,
) -> Result<PaymentReceipt> {
    if amount <= Decimal::ZERO {
        return Err(SplitbookError::Validation(format!(
            "payment amount must be positive, got {amount}"
        )));
    }
    db::write_tx(conn, |tx| {
        let before = balance::compute_net_balance(tx, rules)?;
        let outstanding = before.owed_by(payer);
        if amount > outstanding {
            return Err(SplitbookError::Concurrency(format!(
                "payment of {amount} exceeds the {outstanding} owed by party {payer}; \
                 re-check the balance and retry"
            )));
        }
        let split = match payer {
            Party::A => (Decimal::ZERO, Decimal::ONE),
            Party::B => (Decimal::ONE, Decimal::ZERO),
        };
        let transaction_id = ledger::insert_expense(
            tx,
            &NewExpense {
                amount,
                payer,
                category: SETTLEMENT_CATEGORY.to_string(),
                split: Some(split),
                description: description.to_string(),
                spent_on: None,
            },
        )?;
        let new_balance = balance::compute_net_balance(tx, rules)?;
        let was_settled = new_balance.net_outstanding.is_zero();
        info!(%payer, %amount, transaction_id, was_settled, "payment recorded");
        Ok(PaymentReceipt {
            transaction_id,
            was_settled,
            new_balance,
        })
    })
}
