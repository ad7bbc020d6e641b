use std::str::FromStr;

use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::error::{Result, SplitbookError};
use crate::models::{validate_split, AmendExpense, NewExpense, Party, SplitPatch, Transaction};

const COLUMNS: &str = "id, amount, payer, category, percent_a, percent_b, is_settled, description, spent_on, created_at, updated_at";

pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn checked_date(raw: &str) -> Result<String> {
    let raw = raw.trim();
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        SplitbookError::Validation(format!("invalid date '{raw}' (expected YYYY-MM-DD)"))
    })?;
    Ok(raw.to_string())
}

fn decimal_value(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(raw.trim()).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn optional_decimal_value(row: &Row, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        Decimal::from_str(s.trim()).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    })
    .transpose()
}

fn party_value(row: &Row, idx: usize) -> rusqlite::Result<Party> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown party '{raw}'").into(),
        )
    })
}

fn from_row(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        amount: decimal_value(row, 1)?,
        payer: party_value(row, 2)?,
        category: row.get(3)?,
        percent_a: optional_decimal_value(row, 4)?,
        percent_b: optional_decimal_value(row, 5)?,
        is_settled: row.get(6)?,
        description: row.get(7)?,
        spent_on: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Records a shared expense and returns its id. Amounts must be
/// positive; a per-row split override is validated before it lands.
pub fn insert_expense(conn: &Connection, expense: &NewExpense) -> Result<i64> {
    if expense.amount <= Decimal::ZERO {
        return Err(SplitbookError::Validation(format!(
            "amount must be positive, got {}",
            expense.amount
        )));
    }
    let category = expense.category.trim();
    if category.is_empty() {
        return Err(SplitbookError::Validation("category must not be empty".into()));
    }
    if let Some((pa, pb)) = expense.split {
        validate_split(pa, pb)?;
    }
    let spent_on = match expense.spent_on.as_deref() {
        Some(d) => checked_date(d)?,
        None => today(),
    };
    let (percent_a, percent_b) = match expense.split {
        Some((pa, pb)) => (Some(pa.to_string()), Some(pb.to_string())),
        None => (None, None),
    };
    conn.execute(
        "INSERT INTO transactions (amount, payer, category, percent_a, percent_b, description, spent_on) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            expense.amount.to_string(),
            expense.payer.as_str(),
            category,
            percent_a,
            percent_b,
            expense.description.trim(),
            spent_on,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let sql = format!("SELECT {COLUMNS} FROM transactions WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], from_row).optional()?)
}

pub fn list_transactions(conn: &Connection, include_settled: bool) -> Result<Vec<Transaction>> {
    let sql = if include_settled {
        format!("SELECT {COLUMNS} FROM transactions ORDER BY id")
    } else {
        format!("SELECT {COLUMNS} FROM transactions WHERE is_settled = 0 ORDER BY id")
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Unsettled rows in id order. Balance and settlement both read the
/// ledger through this.
pub fn unsettled_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    list_transactions(conn, false)
}

/// Applies a partial amendment. Settled rows can be amended too; they
/// stay out of the balance either way.
pub fn amend_expense(conn: &Connection, id: i64, patch: &AmendExpense) -> Result<()> {
    if patch.is_empty() {
        return Err(SplitbookError::Validation("nothing to amend".into()));
    }
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(amount) = patch.amount {
        if amount <= Decimal::ZERO {
            return Err(SplitbookError::Validation(format!(
                "amount must be positive, got {amount}"
            )));
        }
        params.push(amount.to_string());
        clauses.push(format!("amount = ?{}", params.len()));
    }
    if let Some(payer) = patch.payer {
        params.push(payer.as_str().to_string());
        clauses.push(format!("payer = ?{}", params.len()));
    }
    if let Some(category) = &patch.category {
        let category = category.trim();
        if category.is_empty() {
            return Err(SplitbookError::Validation("category must not be empty".into()));
        }
        params.push(category.to_string());
        clauses.push(format!("category = ?{}", params.len()));
    }
    match &patch.split {
        Some(SplitPatch::Set(pa, pb)) => {
            validate_split(*pa, *pb)?;
            params.push(pa.to_string());
            clauses.push(format!("percent_a = ?{}", params.len()));
            params.push(pb.to_string());
            clauses.push(format!("percent_b = ?{}", params.len()));
        }
        Some(SplitPatch::Clear) => {
            clauses.push("percent_a = NULL".to_string());
            clauses.push("percent_b = NULL".to_string());
        }
        None => {}
    }
    if let Some(date) = &patch.spent_on {
        params.push(checked_date(date)?);
        clauses.push(format!("spent_on = ?{}", params.len()));
    }
    if let Some(description) = &patch.description {
        params.push(description.trim().to_string());
        clauses.push(format!("description = ?{}", params.len()));
    }
    clauses.push("updated_at = datetime('now')".to_string());

    params.push(id.to_string());
    let sql = format!(
        "UPDATE transactions SET {} WHERE id = ?{}",
        clauses.join(", "),
        params.len()
    );
    let param_values: Vec<&dyn rusqlite::types::ToSql> =
        params.iter().map(|p| p as &dyn rusqlite::types::ToSql).collect();
    let updated = conn.execute(&sql, param_values.as_slice())?;
    if updated == 0 {
        return Err(SplitbookError::Validation(format!("no transaction with id {id}")));
    }
    Ok(())
}

pub fn delete_expense(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Err(SplitbookError::Validation(format!("no transaction with id {id}")));
    }
    Ok(())
}
