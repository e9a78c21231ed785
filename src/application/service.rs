use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::{summarize, Account, AccountNumber, BalanceRow, Cents, Event, LedgerEntry};
use crate::storage::Repository;

use super::{
    build_earnings_report, run_balance_sheet, AppError, BalanceSheetReport, EarningsReport,
    MissingAccountPolicy,
};

/// Application service providing high-level operations over the ledger store.
/// This is the primary interface for any client (CLI, importer, tests).
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        info!(database = database_path, "Database initialized");
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        debug!(database = database_path, "Connected");
        Ok(Self::new(repo))
    }

    // ========================
    // Account operations
    // ========================

    /// Save a prepared account as-is. Number uniqueness is checked by the caller.
    pub async fn save_account(&self, account: &Account) -> Result<(), AppError> {
        Ok(self.repo.save_account(account).await?)
    }

    /// Whether an account with this number exists.
    pub async fn has_account(&self, number: AccountNumber) -> Result<bool, AppError> {
        Ok(self.repo.get_account_by_number(number).await?.is_some())
    }

    /// List all accounts in tree insertion order.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.repo.list_accounts().await?)
    }

    // ========================
    // Event operations
    // ========================

    /// Record an event. Each entry's account name is copied from the account record.
    pub async fn record_event(
        &self,
        date: NaiveDate,
        description: String,
        entries: &[(AccountNumber, Option<Cents>)],
    ) -> Result<Event, AppError> {
        let mut event = Event::new(date, description);

        for &(number, amount) in entries {
            let reference = self
                .repo
                .get_account_by_number(number)
                .await?
                .and_then(|account| account.reference())
                .ok_or_else(|| AppError::UnknownEntryAccount {
                    description: event.description.clone(),
                    number,
                })?;
            event.entries.push(LedgerEntry {
                account: reference,
                amount,
            });
        }

        self.repo.save_event(&event).await?;
        debug!(event = %event.id, entries = event.entries.len(), "Event recorded");
        Ok(event)
    }

    /// List all events with their entries.
    pub async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        Ok(self.repo.list_events().await?)
    }

    // ========================
    // Balance sheet
    // ========================

    /// Compute the balance sheet and upsert it into `collection`.
    pub async fn run_balance_sheet(
        &self,
        collection: &str,
        policy: MissingAccountPolicy,
    ) -> Result<BalanceSheetReport, AppError> {
        debug!(collection, policy = policy.as_str(), "Running balance sheet");
        run_balance_sheet(&self.repo, collection, policy).await
    }

    /// Rows previously written to `collection`, ordered by account number.
    pub async fn balance_rows(&self, collection: &str) -> Result<Vec<BalanceRow>, AppError> {
        Ok(self.repo.list_balance_rows(collection).await?)
    }

    // ========================
    // Reporting
    // ========================

    /// Earnings per result-type account, in account tree order.
    pub async fn earnings_report(&self) -> Result<EarningsReport, AppError> {
        let accounts = self.repo.list_accounts().await?;
        let entries = self.repo.list_entries().await?;
        let totals = summarize(&entries)?;
        Ok(build_earnings_report(&accounts, &totals)?)
    }
}
