use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SplitbookError};

/// One of the two fixed ledger participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    A,
    B,
}

impl Party {
    pub fn other(self) -> Party {
        match self {
            Party::A => Party::B,
            Party::B => Party::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Party::A => "A",
            Party::B => "B",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Party {
    type Err = SplitbookError;

    fn from_str(s: &str) -> Result<Party> {
        match s.trim() {
            "A" | "a" => Ok(Party::A),
            "B" | "b" => Ok(Party::B),
            other => Err(SplitbookError::Validation(format!(
                "unknown party '{other}' (expected A or B)"
            ))),
        }
    }
}

/// How a dollar splits between the parties: fractions in [0, 1] that
/// sum to 1.0 within a 0.001 tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRule {
    pub percent_a: Decimal,
    pub percent_b: Decimal,
}

/// Checks the split invariant: each fraction in [0, 1], sum within
/// 0.001 of 1.0. Everything that writes a split goes through this.
pub fn validate_split(percent_a: Decimal, percent_b: Decimal) -> Result<()> {
    let tolerance = Decimal::new(1, 3); // 0.001
    for pct in [percent_a, percent_b] {
        if pct < Decimal::ZERO || pct > Decimal::ONE {
            return Err(SplitbookError::Validation(format!(
                "split percentage {pct} is outside [0, 1]"
            )));
        }
    }
    if ((percent_a + percent_b) - Decimal::ONE).abs() > tolerance {
        return Err(SplitbookError::Validation(format!(
            "split percentages must sum to 1.0, got {percent_a} + {percent_b}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub amount: Decimal,
    pub payer: Party,
    pub category: String,
    pub percent_a: Option<Decimal>,
    pub percent_b: Option<Decimal>,
    pub is_settled: bool,
    pub description: String,
    pub spent_on: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Transaction {
    /// Row-level split override, honored only when both halves are set.
    pub fn explicit_split(&self) -> Option<SplitRule> {
        match (self.percent_a, self.percent_b) {
            (Some(percent_a), Some(percent_b)) => Some(SplitRule { percent_a, percent_b }),
            _ => None,
        }
    }
}

/// Input for recording an expense. `split` overrides the category rule
/// for this row only; `spent_on` defaults to today.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: Decimal,
    pub payer: Party,
    pub category: String,
    pub split: Option<(Decimal, Decimal)>,
    pub description: String,
    pub spent_on: Option<String>,
}

/// Patch for a row-level split override.
#[derive(Debug, Clone)]
pub enum SplitPatch {
    Set(Decimal, Decimal),
    /// Drop the override so the category rule applies again.
    Clear,
}

/// Field-by-field amendment; `None` leaves the column alone.
#[derive(Debug, Clone, Default)]
pub struct AmendExpense {
    pub amount: Option<Decimal>,
    pub payer: Option<Party>,
    pub category: Option<String>,
    pub split: Option<SplitPatch>,
    pub spent_on: Option<String>,
    pub description: Option<String>,
}

impl AmendExpense {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.payer.is_none()
            && self.category.is_none()
            && self.split.is_none()
            && self.spent_on.is_none()
            && self.description.is_none()
    }
}

/// Upper-bound transaction id captured by a settlement preview.
/// Confirm only touches unsettled rows at or below this id, so
/// expenses recorded after the preview survive untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark(i64);

impl Watermark {
    pub fn new(id: i64) -> Result<Watermark> {
        if id < 1 {
            return Err(SplitbookError::Validation(format!(
                "watermark must be a positive transaction id, got {id}"
            )));
        }
        Ok(Watermark(id))
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Watermark {
    type Err = SplitbookError;

    fn from_str(s: &str) -> Result<Watermark> {
        let id: i64 = s
            .trim()
            .parse()
            .map_err(|_| SplitbookError::Validation(format!("malformed watermark '{s}'")))?;
        Watermark::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_party_parses_either_case() {
        assert_eq!("A".parse::<Party>().unwrap(), Party::A);
        assert_eq!(" b ".parse::<Party>().unwrap(), Party::B);
        assert!("C".parse::<Party>().is_err());
        assert!("".parse::<Party>().is_err());
    }

    #[test]
    fn test_party_other() {
        assert_eq!(Party::A.other(), Party::B);
        assert_eq!(Party::B.other(), Party::A);
    }

    #[test]
    fn test_validate_split_accepts_exact_and_tolerant_sums() {
        assert!(validate_split(dec!(0.5), dec!(0.5)).is_ok());
        assert!(validate_split(dec!(0.7), dec!(0.3)).is_ok());
        assert!(validate_split(dec!(1), dec!(0)).is_ok());
        // off by exactly the tolerance
        assert!(validate_split(dec!(0.5), dec!(0.499)).is_ok());
        assert!(validate_split(dec!(0.5), dec!(0.501)).is_ok());
    }

    #[test]
    fn test_validate_split_rejects_bad_sums_and_ranges() {
        assert!(validate_split(dec!(0.5), dec!(0.4)).is_err());
        assert!(validate_split(dec!(0.5), dec!(0.4989)).is_err());
        assert!(validate_split(dec!(0.6), dec!(0.6)).is_err());
        assert!(validate_split(dec!(-0.1), dec!(1.1)).is_err());
        assert!(validate_split(dec!(1.5), dec!(-0.5)).is_err());
    }

    #[test]
    fn test_explicit_split_requires_both_halves() {
        let mut tx = Transaction {
            id: 1,
            amount: dec!(10),
            payer: Party::A,
            category: "Groceries".into(),
            percent_a: Some(dec!(0.7)),
            percent_b: Some(dec!(0.3)),
            is_settled: false,
            description: String::new(),
            spent_on: "2026-01-01".into(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(
            tx.explicit_split(),
            Some(SplitRule {
                percent_a: dec!(0.7),
                percent_b: dec!(0.3)
            })
        );
        tx.percent_b = None;
        assert_eq!(tx.explicit_split(), None);
    }

    #[test]
    fn test_watermark_parsing() {
        assert_eq!("42".parse::<Watermark>().unwrap().as_i64(), 42);
        assert_eq!(" 7 ".parse::<Watermark>().unwrap().as_i64(), 7);
        assert!("0".parse::<Watermark>().is_err());
        assert!("-3".parse::<Watermark>().is_err());
        assert!("abc".parse::<Watermark>().is_err());
        assert!("".parse::<Watermark>().is_err());
    }
}
