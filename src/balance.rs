use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::ledger;
use crate::models::Party;
use crate::split_rules::SplitRuleStore;

/// Who owes what across the unsettled ledger. `who_is_owed` is `None`
/// when nothing is outstanding or when neither side is a clear
/// creditor.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSummary {
    pub party_a_owes: Decimal,
    pub party_b_owes: Decimal,
    pub net_outstanding: Decimal,
    pub who_is_owed: Option<Party>,
    pub unsettled_count: usize,
}

impl BalanceSummary {
    pub fn owed_by(&self, party: Party) -> Decimal {
        match party {
            Party::A => self.party_a_owes,
            Party::B => self.party_b_owes,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.net_outstanding.is_zero()
    }
}

/// Recomputes the net balance from a fresh scan of unsettled rows.
/// Nothing is cached; a row committed before this call is in the
/// answer.
///
/// Per row: the payer's paid total grows by the amount, and each
/// party's fair-share total grows by amount times their split
/// fraction (row override first, then category rule, then the even
/// default). A party owes when their fair share exceeds what they
/// paid.
pub fn compute_net_balance(conn: &Connection, rules: &SplitRuleStore) -> Result<BalanceSummary> {
    let rows = ledger::unsettled_transactions(conn)?;

    let mut paid_a = Decimal::ZERO;
    let mut paid_b = Decimal::ZERO;
    let mut share_a = Decimal::ZERO;
    let mut share_b = Decimal::ZERO;

    for row in &rows {
        let split = row
            .explicit_split()
            .unwrap_or_else(|| rules.get_rule(conn, &row.category));
        match row.payer {
            Party::A => paid_a += row.amount,
            Party::B => paid_b += row.amount,
        }
        share_a += row.amount * split.percent_a;
        share_b += row.amount * split.percent_b;
    }

    let net_a = paid_a - share_a;
    let net_b = paid_b - share_b;
    let party_a_owes = if net_a < Decimal::ZERO { -net_a } else { Decimal::ZERO };
    let party_b_owes = if net_b < Decimal::ZERO { -net_b } else { Decimal::ZERO };
    let who_is_owed = match (party_a_owes > Decimal::ZERO, party_b_owes > Decimal::ZERO) {
        (true, false) => Some(Party::B),
        (false, true) => Some(Party::A),
        _ => None,
    };

    Ok(BalanceSummary {
        party_a_owes,
        party_b_owes,
        net_outstanding: party_a_owes + party_b_owes,
        who_is_owed,
        unsettled_count: rows.len(),
    })
}
