use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountRef, Cents};

pub type EventId = Uuid;

/// A single transaction line.
/// The amount is optional: entries recorded without one count as zero when summed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub account: AccountRef,
    pub amount: Option<Cents>,
}

impl LedgerEntry {
    pub fn new(account: AccountRef, amount: Cents) -> Self {
        Self {
            account,
            amount: Some(amount),
        }
    }
}

/// A dated group of entries, e.g. one receipt or one bank statement line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub date: NaiveDate,
    pub description: String,
    pub recorded_at: DateTime<Utc>,
    pub entries: Vec<LedgerEntry>,
}

impl Event {
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            description: description.into(),
            recorded_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: LedgerEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Sum of all entry amounts. `Some(0)` for a balanced event.
    pub fn total(&self) -> Option<Cents> {
        super::sum_amounts(self.entries.iter().map(|e| e.amount))
    }
}
