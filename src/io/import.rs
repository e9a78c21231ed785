use std::collections::HashSet;
use std::io::Read;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::tappio;
use crate::application::{AppError, LedgerService};
use crate::domain::{Account, AccountId, AccountNumber, AccountType, Cents};

/// A ledger document: the account forest plus the list of events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerDocument {
    pub accounts: AccountForest,
    #[serde(default)]
    pub events: Vec<DocumentEvent>,
}

/// Accounts split into the three top-level branches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountForest {
    #[serde(default)]
    pub vastaavaa: Vec<DocumentAccount>,
    #[serde(default)]
    pub vastattavaa: Vec<DocumentAccount>,
    #[serde(default)]
    pub tulos: Vec<DocumentAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAccount {
    #[serde(default)]
    pub number: Option<AccountNumber>,
    pub name: String,
    #[serde(default)]
    pub subaccounts: Vec<DocumentAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEvent {
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub entries: Vec<DocumentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub account_number: AccountNumber,
    #[serde(default)]
    pub cents: Option<Cents>,
}

impl LedgerDocument {
    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        serde_json::from_reader(reader).context("Failed to parse ledger document")
    }

    /// Flatten the forest into accounts with parent links, depth-first.
    pub fn accounts(&self) -> Vec<Account> {
        let mut out = Vec::new();
        for (account_type, branch) in [
            (AccountType::Assets, &self.accounts.vastaavaa),
            (AccountType::Liabilities, &self.accounts.vastattavaa),
            (AccountType::Result, &self.accounts.tulos),
        ] {
            flatten_branch(branch, account_type, None, &mut out);
        }
        out
    }
}

fn flatten_branch(
    nodes: &[DocumentAccount],
    account_type: AccountType,
    parent: Option<AccountId>,
    out: &mut Vec<Account>,
) {
    for node in nodes {
        let mut account = Account::new(node.number, node.name.clone(), account_type);
        if let Some(parent) = parent {
            account = account.with_parent(parent);
        }
        let id = account.id;
        out.push(account);
        flatten_branch(&node.subaccounts, account_type, Some(id), out);
    }
}

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub accounts: usize,
    pub events: usize,
    pub entries: usize,
}

/// Importer for loading ledger documents into the store
pub struct Importer<'a> {
    service: &'a LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Import a JSON ledger document.
    pub async fn import_json<R: Read>(&self, reader: R) -> Result<ImportResult, AppError> {
        let document = LedgerDocument::from_reader(reader).map_err(AppError::InvalidDocument)?;
        self.import_document(&document).await
    }

    /// Import a Tappio ledger file. The fiscal-year metadata is not stored.
    pub async fn import_tappio<R: Read>(&self, mut reader: R) -> Result<ImportResult, AppError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .context("Failed to read tappio document")
            .map_err(AppError::InvalidDocument)?;

        let document = tappio::parse(&tappio::decode(bytes))
            .and_then(tappio::Document::into_ledger_document)
            .map_err(AppError::InvalidDocument)?;
        self.import_document(&document).await
    }

    /// Import accounts first, then events.
    ///
    /// Every account number and entry reference is checked before anything is
    /// written, so a rejected document leaves the store untouched.
    pub async fn import_document(
        &self,
        document: &LedgerDocument,
    ) -> Result<ImportResult, AppError> {
        let accounts = document.accounts();

        let mut numbers = HashSet::new();
        for number in accounts.iter().filter_map(|a| a.number) {
            if !numbers.insert(number) || self.service.has_account(number).await? {
                return Err(AppError::DuplicateAccountNumber(number));
            }
        }

        for event in &document.events {
            for entry in &event.entries {
                if !numbers.contains(&entry.account_number)
                    && !self.service.has_account(entry.account_number).await?
                {
                    return Err(AppError::UnknownEntryAccount {
                        description: event.description.clone(),
                        number: entry.account_number,
                    });
                }
            }
        }

        for account in &accounts {
            self.service.save_account(account).await?;
        }

        let mut result = ImportResult {
            accounts: accounts.len(),
            ..Default::default()
        };

        for event in &document.events {
            let entries: Vec<(AccountNumber, Option<Cents>)> = event
                .entries
                .iter()
                .map(|e| (e.account_number, e.cents))
                .collect();
            self.service
                .record_event(event.date, event.description.clone(), &entries)
                .await?;
            result.events += 1;
            result.entries += entries.len();
        }

        info!(
            accounts = result.accounts,
            events = result.events,
            entries = result.entries,
            "Ledger document imported"
        );
        Ok(result)
    }
}
