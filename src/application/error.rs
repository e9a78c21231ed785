use thiserror::Error;

use crate::domain::{AccountNumber, AmountOverflow};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountNumber),

    #[error("Event '{description}' references unknown account {number}")]
    UnknownEntryAccount {
        description: String,
        number: AccountNumber,
    },

    #[error("Account number already exists: {0}")]
    DuplicateAccountNumber(AccountNumber),

    #[error("Invalid ledger document: {0:#}")]
    InvalidDocument(anyhow::Error),

    #[error(transparent)]
    Overflow(#[from] AmountOverflow),

    #[error("Invalid collection name: {0:?}")]
    InvalidCollectionName(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
