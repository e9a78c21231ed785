use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use anyhow::{anyhow, Result};

use crate::domain::{Account, AccountNumber, BalanceRow, LedgerEntry};

use super::BalanceSheetStore;

/// In-memory store, used by tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<AccountNumber, Account>>,
    entries: RwLock<Vec<LedgerEntry>>,
    collections: RwLock<HashMap<String, BTreeMap<AccountNumber, BalanceRow>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account. Accounts without a number cannot be looked up and are ignored.
    pub fn add_account(&self, account: Account) -> Result<()> {
        if let Some(number) = account.number {
            self.accounts
                .write()
                .map_err(|_| anyhow!("account lock poisoned"))?
                .insert(number, account);
        }
        Ok(())
    }

    pub fn add_entry(&self, entry: LedgerEntry) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| anyhow!("entry lock poisoned"))?
            .push(entry);
        Ok(())
    }

    /// Rows of a collection, ordered by account number.
    pub fn rows(&self, collection: &str) -> Result<Vec<BalanceRow>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| anyhow!("collection lock poisoned"))?;
        Ok(collections
            .get(collection)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }
}

impl BalanceSheetStore for MemoryStore {
    async fn scan_entries(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self
            .entries
            .read()
            .map_err(|_| anyhow!("entry lock poisoned"))?
            .clone())
    }

    async fn find_account(&self, number: AccountNumber) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .map_err(|_| anyhow!("account lock poisoned"))?
            .get(&number)
            .cloned())
    }

    async fn upsert_row(&self, collection: &str, row: &BalanceRow) -> Result<()> {
        self.collections
            .write()
            .map_err(|_| anyhow!("collection lock poisoned"))?
            .entry(collection.to_string())
            .or_default()
            .insert(row.id, row.clone());
        Ok(())
    }
}
