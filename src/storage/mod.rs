mod memory;
mod repository;

pub use memory::*;
pub use repository::*;

use anyhow::Result;

use crate::domain::{Account, AccountNumber, BalanceRow, LedgerEntry};

/// SQL migration for initial schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// Store capabilities the balance-sheet job depends on.
#[allow(async_fn_in_trait)]
pub trait BalanceSheetStore {
    /// Every ledger entry of every event, in storage order.
    async fn scan_entries(&self) -> Result<Vec<LedgerEntry>>;

    /// Look up an account by number.
    async fn find_account(&self, number: AccountNumber) -> Result<Option<Account>>;

    /// Insert or replace the row keyed by `row.id` in `collection`.
    async fn upsert_row(&self, collection: &str, row: &BalanceRow) -> Result<()>;
}
