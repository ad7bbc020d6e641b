//! Shared-expense ledger for two people: record who paid what, split
//! costs by category rules, and settle up without racing each other.

pub mod balance;
pub mod cli;
pub mod db;
pub mod error;
pub mod fmt;
pub mod ledger;
pub mod models;
pub mod payment;
pub mod settings;
pub mod settlement;
pub mod split_rules;

pub use error::{Result, SplitbookError};
