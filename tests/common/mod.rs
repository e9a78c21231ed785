// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use saldo::application::LedgerService;
use saldo::domain::{Account, AccountNumber, AccountType, Cents};
use saldo::io::Importer;
use saldo::storage::Repository;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Like `test_service`, plus a second connection to the same database for
/// reading or writing rows behind the service's back.
pub async fn test_service_with_store() -> Result<(LedgerService, Repository, TempDir)> {
    let (service, temp_dir) = test_service().await?;
    let db_path = temp_dir.path().join("test.db");
    let repo = Repository::connect(&format!("sqlite:{}", db_path.display())).await?;
    Ok((service, repo, temp_dir))
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// A small chart of accounts with one header per branch.
pub const SAMPLE_DOCUMENT: &str = r#"{
    "accounts": {
        "vastaavaa": [
            {"name": "VASTAAVAA", "subaccounts": [
                {"number": 1900, "name": "Kassa"},
                {"number": 1910, "name": "Pankkitili"}
            ]}
        ],
        "vastattavaa": [
            {"name": "VASTATTAVAA", "subaccounts": [
                {"number": 2000, "name": "Oma pääoma"},
                {"number": 2870, "name": "Ostovelat"}
            ]}
        ],
        "tulos": [
            {"name": "TULOS", "subaccounts": [
                {"number": 3000, "name": "Myynti"},
                {"number": 4000, "name": "Ostot"}
            ]}
        ]
    },
    "events": [
        {"date": "2010-01-01", "description": "Alkusaldo", "entries": [
            {"account_number": 1910, "cents": 100000},
            {"account_number": 2000, "cents": -100000}
        ]},
        {"date": "2010-02-10", "description": "Myyntilasku", "entries": [
            {"account_number": 1910, "cents": 25000},
            {"account_number": 3000, "cents": -25000}
        ]},
        {"date": "2010-03-05", "description": "Ostolasku", "entries": [
            {"account_number": 4000, "cents": 8000},
            {"account_number": 2870, "cents": -8000}
        ]}
    ]
}"#;

/// Import the sample document into the service.
pub async fn import_sample(service: &LedgerService) -> Result<()> {
    Importer::new(service)
        .import_json(SAMPLE_DOCUMENT.as_bytes())
        .await?;
    Ok(())
}

/// Create flat accounts without a tree, one per `(number, type)` pair.
pub async fn create_accounts(
    service: &LedgerService,
    accounts: &[(AccountNumber, &str, AccountType)],
) -> Result<()> {
    for &(number, name, account_type) in accounts {
        let account = Account::new(Some(number), name.to_string(), account_type);
        service.save_account(&account).await?;
    }
    Ok(())
}

/// Record one event with the given entries.
pub async fn record(
    service: &LedgerService,
    date: &str,
    entries: &[(AccountNumber, Option<Cents>)],
) -> Result<()> {
    service
        .record_event(parse_date(date), "test".into(), entries)
        .await?;
    Ok(())
}
