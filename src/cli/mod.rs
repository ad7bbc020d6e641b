pub mod add;
pub mod balance;
pub mod demo;
pub mod edit;
pub mod history;
pub mod init;
pub mod pay;
pub mod remove;
pub mod rules;
pub mod settle;
pub mod status;

use std::str::FromStr;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::error::{Result, SplitbookError};
use crate::models::{Party, Watermark};

/// Parse a `--split` value like `0.7,0.3` into its two fractions.
pub(crate) fn parse_split(raw: &str) -> Result<(Decimal, Decimal)> {
    let (a, b) = raw.split_once(',').ok_or_else(|| {
        SplitbookError::Validation(format!(
            "split '{raw}' must be two comma-separated fractions, e.g. 0.7,0.3"
        ))
    })?;
    let fraction = |s: &str| {
        let s = s.trim();
        Decimal::from_str(s)
            .map_err(|_| SplitbookError::Validation(format!("bad split fraction '{s}'")))
    };
    Ok((fraction(a)?, fraction(b)?))
}

#[derive(Parser)]
#[command(name = "splitbook", about = "Two-person shared-expense ledger with race-safe settlement.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up splitbook: choose a data directory and initialize the database.
    Init {
        /// Path for splitbook data (default: ~/Documents/splitbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Display name for party A
        #[arg(long = "party-a")]
        party_a: Option<String>,
        /// Display name for party B
        #[arg(long = "party-b")]
        party_b: Option<String>,
    },
    /// Record a shared expense.
    Add {
        /// Amount spent, e.g. 52.10
        amount: Decimal,
        /// Who paid: A or B
        #[arg(long)]
        payer: Party,
        /// Expense category, e.g. groceries
        #[arg(long)]
        category: String,
        /// Per-row split override as A,B fractions summing to 1.0, e.g. 0.7,0.3
        #[arg(long, value_name = "A,B")]
        split: Option<String>,
        /// Expense date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Free-form note
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Amend a recorded expense.
    Edit {
        /// Transaction ID (shown in `splitbook history`)
        id: i64,
        /// New amount
        #[arg(long)]
        amount: Option<Decimal>,
        /// New payer: A or B
        #[arg(long)]
        payer: Option<Party>,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// New split override as A,B fractions, e.g. 0.7,0.3
        #[arg(long, value_name = "A,B")]
        split: Option<String>,
        /// Drop the row override so the category rule applies
        #[arg(long = "clear-split", conflicts_with = "split")]
        clear_split: bool,
        /// New expense date: YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// New note
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an expense outright.
    Remove {
        /// Transaction ID (shown in `splitbook history`)
        id: i64,
    },
    /// Show who owes whom right now.
    Balance,
    /// Manage per-category split rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Settle the books up to a previewed watermark.
    Settle {
        #[command(subcommand)]
        command: SettleCommands,
    },
    /// Record a payment from the owing party toward the balance.
    Pay {
        /// Amount being paid
        amount: Decimal,
        /// Who is paying: A or B
        #[arg(long)]
        from: Party,
        /// Free-form note
        #[arg(long, default_value = "Settle up")]
        description: String,
    },
    /// List ledger transactions.
    History {
        /// Include settled rows
        #[arg(long)]
        all: bool,
    },
    /// Load deterministic sample data to explore splitbook.
    Demo,
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// List all persisted split rules.
    List,
    /// Show the effective split for a category.
    Get {
        /// Category name (synonyms are folded, e.g. food -> Groceries)
        category: String,
    },
    /// Set the split for a category.
    Set {
        /// Category name
        category: String,
        /// Party A's fraction, e.g. 0.7
        percent_a: Decimal,
        /// Party B's fraction, e.g. 0.3
        percent_b: Decimal,
    },
}

#[derive(Subcommand)]
pub enum SettleCommands {
    /// Snapshot the unsettled ledger and print its watermark.
    Preview,
    /// Mark everything up to a previewed watermark as settled.
    Confirm {
        /// Watermark printed by `splitbook settle preview`
        watermark: Watermark,
    },
}
