use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Account, AccountNumber, AccountRef, AccountType, BalanceRow, Event, LedgerEntry,
};

use super::{BalanceSheetStore, MIGRATION_001_INITIAL};

/// Repository for persisting and querying accounts, events and output collections.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Account operations
    // ========================

    /// Save a new account. Accounts are listed back in insertion order.
    pub async fn save_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, number, name, account_type, parent_id, position)
            VALUES (?, ?, ?, ?, ?, (SELECT COALESCE(MAX(position), 0) + 1 FROM accounts))
            "#,
        )
        .bind(account.id.to_string())
        .bind(account.number)
        .bind(&account.name)
        .bind(account.account_type.as_str())
        .bind(account.parent.map(|id| id.to_string()))
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save account '{}'", account.name))?;
        Ok(())
    }

    /// Get an account by number.
    pub async fn get_account_by_number(&self, number: AccountNumber) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, number, name, account_type, parent_id
            FROM accounts
            WHERE number = ?
            "#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account by number")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    /// List all accounts in insertion order.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            r#"
            SELECT id, number, name, account_type, parent_id
            FROM accounts
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        rows.iter().map(Self::row_to_account).collect()
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let id_str: String = row.get("id");
        let account_type_str: String = row.get("account_type");
        let parent_str: Option<String> = row.get("parent_id");

        Ok(Account {
            id: Uuid::parse_str(&id_str).context("Invalid account ID")?,
            number: row.get("number"),
            name: row.get("name"),
            account_type: AccountType::from_str(&account_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid account type: {}", account_type_str))?,
            parent: parent_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid parent account ID")?,
        })
    }

    // ========================
    // Event operations
    // ========================

    /// Save an event and its entries.
    pub async fn save_event(&self, event: &Event) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, date, description, recorded_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(event.date.format("%Y-%m-%d").to_string())
        .bind(&event.description)
        .bind(event.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save event")?;

        for entry in &event.entries {
            sqlx::query(
                r#"
                INSERT INTO entries (event_id, account_number, account_name, amount_cents)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(event.id.to_string())
            .bind(entry.account.number)
            .bind(&entry.account.name)
            .bind(entry.amount)
            .execute(&self.pool)
            .await
            .context("Failed to save entry")?;
        }

        Ok(())
    }

    /// List all events with their entries, ordered by date.
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query(
            r#"
            SELECT id, date, description, recorded_at
            FROM events
            ORDER BY date, recorded_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list events")?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let id_str: String = row.get("id");
            let date_str: String = row.get("date");
            let recorded_at_str: String = row.get("recorded_at");

            let entries = sqlx::query(
                r#"
                SELECT account_number, account_name, amount_cents
                FROM entries
                WHERE event_id = ?
                ORDER BY id
                "#,
            )
            .bind(&id_str)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list entries for event")?;

            events.push(Event {
                id: Uuid::parse_str(&id_str).context("Invalid event ID")?,
                date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                    .context("Invalid event date")?,
                description: row.get("description"),
                recorded_at: DateTime::parse_from_rfc3339(&recorded_at_str)
                    .context("Invalid recorded_at timestamp")?
                    .with_timezone(&Utc),
                entries: entries.iter().map(Self::row_to_entry).collect(),
            });
        }

        Ok(events)
    }

    /// Full scan of every stored entry.
    pub async fn list_entries(&self) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT account_number, account_name, amount_cents
            FROM entries
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to scan entries")?;

        Ok(rows.iter().map(Self::row_to_entry).collect())
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> LedgerEntry {
        LedgerEntry {
            account: AccountRef {
                number: row.get("account_number"),
                name: row.get("account_name"),
            },
            amount: row.get("amount_cents"),
        }
    }

    // ========================
    // Output collections
    // ========================

    /// Insert or replace a balance row in the named collection.
    pub async fn save_balance_row(&self, collection: &str, row: &BalanceRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO balance_rows (collection, account_number, account_name, amount_cents)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (collection, account_number) DO UPDATE SET
                account_name = excluded.account_name,
                amount_cents = excluded.amount_cents
            "#,
        )
        .bind(collection)
        .bind(row.id)
        .bind(&row.account.name)
        .bind(row.amount)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save row into collection '{}'", collection))?;
        Ok(())
    }

    /// List the rows of a collection, ordered by account number.
    pub async fn list_balance_rows(&self, collection: &str) -> Result<Vec<BalanceRow>> {
        let rows = sqlx::query(
            r#"
            SELECT account_number, account_name, amount_cents
            FROM balance_rows
            WHERE collection = ?
            ORDER BY account_number
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list balance rows")?;

        Ok(rows
            .iter()
            .map(|row| {
                let number: AccountNumber = row.get("account_number");
                BalanceRow {
                    id: number,
                    account: AccountRef {
                        number,
                        name: row.get("account_name"),
                    },
                    amount: row.get("amount_cents"),
                }
            })
            .collect())
    }
}

impl BalanceSheetStore for Repository {
    async fn scan_entries(&self) -> Result<Vec<LedgerEntry>> {
        self.list_entries().await
    }

    async fn find_account(&self, number: AccountNumber) -> Result<Option<Account>> {
        self.get_account_by_number(number).await
    }

    async fn upsert_row(&self, collection: &str, row: &BalanceRow) -> Result<()> {
        self.save_balance_row(collection, row).await
    }
}
