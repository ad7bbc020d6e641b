use rust_decimal::Decimal;

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::ledger;
use crate::models::{AmendExpense, Party, SplitPatch};
use crate::settings::{db_path, load_settings};

use super::parse_split;

pub struct EditArgs {
    pub amount: Option<Decimal>,
    pub payer: Option<Party>,
    pub category: Option<String>,
    pub split: Option<String>,
    pub clear_split: bool,
    pub date: Option<String>,
    pub description: Option<String>,
}

pub fn run(id: i64, args: EditArgs) -> Result<()> {
    let split = if args.clear_split {
        Some(SplitPatch::Clear)
    } else {
        match args.split.as_deref() {
            Some(raw) => {
                let (pa, pb) = parse_split(raw)?;
                Some(SplitPatch::Set(pa, pb))
            }
            None => None,
        }
    };
    let patch = AmendExpense {
        amount: args.amount,
        payer: args.payer,
        category: args.category,
        split,
        spent_on: args.date,
        description: args.description,
    };

    let conn = get_connection(&db_path())?;
    ledger::amend_expense(&conn, id, &patch)?;

    println!("Amended expense #{id}.");
    if let Some(tx) = ledger::get_transaction(&conn, id)? {
        let settings = load_settings();
        println!(
            "  {} {} {} (paid by {})",
            tx.spent_on,
            money(tx.amount),
            tx.category,
            settings.name_of(tx.payer)
        );
    }
    Ok(())
}
