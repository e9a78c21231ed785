//! Tappio ledger files.
//!
//! A Tappio file is a single s-expression holding the fiscal year, an account
//! forest of three trees (vastaavaa, vastattavaa, tulos) and numbered events:
//!
//! ```text
//! (identity "Tappio" version "..." finances
//!   (fiscal-year "name" (date 2010 1 1) (date 2010 12 31)
//!     (account-map (account -1 "Vastaavaa" ((account 1910 "Pankkitili" ()))) ...)
//!     ((event 1 (date 2010 1 1) "Alkusaldo" ((1910 (money 100000)) ...)))))
//! ```

mod grammar;
mod writer;

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate, Utc};

use super::{AccountForest, DocumentAccount, DocumentEntry, DocumentEvent, LedgerDocument};
use crate::domain::{self, AccountId, AccountNumber, AccountType, Cents};

pub use grammar::{parse, tokenize, Token};
pub use writer::Writer;

pub const DEFAULT_IDENTITY: &str = "Tappio";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub identity: String,
    pub version: String,
    pub name: String,
    pub begin: NaiveDate,
    pub end: NaiveDate,
    pub accounts: Vec<Account>,
    pub events: Vec<Event>,
}

/// An account or, when `number` is `None`, an account group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub number: Option<AccountNumber>,
    pub name: String,
    pub subaccounts: Vec<Account>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub number: i64,
    pub date: NaiveDate,
    pub description: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub account_number: AccountNumber,
    pub cents: Cents,
}

/// Decode a Tappio file. Files are traditionally ISO-8859-1; UTF-8 input is
/// passed through unchanged.
pub fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

impl Document {
    /// Convert into a ledger document.
    ///
    /// The three top-level groups only name the branches: their subaccounts
    /// become the roots of the vastaavaa, vastattavaa and tulos branches.
    /// Event numbers and fiscal-year metadata are dropped.
    pub fn into_ledger_document(self) -> Result<LedgerDocument> {
        let count = self.accounts.len();
        let [vastaavaa, vastattavaa, tulos]: [Account; 3] =
            self.accounts.try_into().map_err(|_| {
                anyhow!("Expected 3 top-level account groups, found {}", count)
            })?;

        let events = self
            .events
            .into_iter()
            .map(|event| DocumentEvent {
                date: event.date,
                description: event.description,
                entries: event
                    .entries
                    .into_iter()
                    .map(|entry| DocumentEntry {
                        account_number: entry.account_number,
                        cents: Some(entry.cents),
                    })
                    .collect(),
            })
            .collect();

        Ok(LedgerDocument {
            accounts: AccountForest {
                vastaavaa: into_document_accounts(vastaavaa.subaccounts),
                vastattavaa: into_document_accounts(vastattavaa.subaccounts),
                tulos: into_document_accounts(tulos.subaccounts),
            },
            events,
        })
    }

    /// Build a document from stored accounts and events.
    ///
    /// Each account type becomes one top-level group. Events are numbered from
    /// 1 in the given order, and absent amounts are written as zero. The fiscal
    /// year spans the calendar years the events fall in.
    pub fn from_ledger(
        accounts: &[domain::Account],
        events: &[domain::Event],
        version: impl Into<String>,
    ) -> Self {
        let known: HashMap<AccountId, &domain::Account> =
            accounts.iter().map(|a| (a.id, a)).collect();
        let mut children: HashMap<AccountId, Vec<&domain::Account>> = HashMap::new();
        let mut roots = Vec::new();
        for account in accounts {
            match account.parent.and_then(|parent| known.get(&parent)) {
                Some(parent) => children.entry(parent.id).or_default().push(account),
                None => roots.push(account),
            }
        }

        let groups = AccountType::ALL
            .into_iter()
            .map(|account_type| Account {
                number: None,
                name: group_name(account_type).to_string(),
                subaccounts: roots
                    .iter()
                    .filter(|account| account.account_type == account_type)
                    .map(|account| subtree(account, &children))
                    .collect(),
            })
            .collect();

        let first = events.iter().map(|e| e.date).min();
        let last = events.iter().map(|e| e.date).max();
        let today = Utc::now().date_naive();
        let begin = first.unwrap_or(today);
        let end = last.unwrap_or(today);

        Self {
            identity: DEFAULT_IDENTITY.to_string(),
            version: version.into(),
            name: String::new(),
            begin: NaiveDate::from_ymd_opt(begin.year(), 1, 1).unwrap_or(begin),
            end: NaiveDate::from_ymd_opt(end.year(), 12, 31).unwrap_or(end),
            accounts: groups,
            events: events
                .iter()
                .zip(1..)
                .map(|(event, number)| Event {
                    number,
                    date: event.date,
                    description: event.description.clone(),
                    entries: event
                        .entries
                        .iter()
                        .map(|entry| Entry {
                            account_number: entry.account.number,
                            cents: entry.amount.unwrap_or(0),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

fn into_document_accounts(accounts: Vec<Account>) -> Vec<DocumentAccount> {
    accounts
        .into_iter()
        .map(|account| DocumentAccount {
            number: account.number,
            name: account.name,
            subaccounts: into_document_accounts(account.subaccounts),
        })
        .collect()
}

fn subtree(
    account: &domain::Account,
    children: &HashMap<AccountId, Vec<&domain::Account>>,
) -> Account {
    Account {
        number: account.number,
        name: account.name.clone(),
        subaccounts: children
            .get(&account.id)
            .map(|kids| kids.iter().map(|kid| subtree(kid, children)).collect())
            .unwrap_or_default(),
    }
}

fn group_name(account_type: AccountType) -> &'static str {
    match account_type {
        AccountType::Assets => "Vastaavaa",
        AccountType::Liabilities => "Vastattavaa",
        AccountType::Result => "Tulos",
    }
}
