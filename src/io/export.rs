use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use super::tappio;
use crate::application::{EarningsReport, LedgerService};
use crate::domain::{format_cents, Account, BalanceRow, Event};

/// Database snapshot for full export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<Account>,
    pub events: Vec<Event>,
}

/// Write balance rows as CSV.
pub fn write_balance_rows_csv<W: Write>(rows: &[BalanceRow], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["number", "name", "amount"])?;

    for row in rows {
        csv_writer.write_record([
            row.account.number.to_string(),
            row.account.name.clone(),
            format_cents(row.amount),
        ])?;
    }

    csv_writer.flush()?;
    Ok(rows.len())
}

/// Write balance rows as a JSON array.
pub fn write_balance_rows_json<W: Write>(rows: &[BalanceRow], mut writer: W) -> Result<usize> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(rows.len())
}

/// Write an earnings report as CSV, without a header.
pub fn write_earnings_csv<W: Write>(report: &EarningsReport, writer: W) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for row in &report.rows {
        csv_writer.write_record([
            row.number.to_string(),
            row.name.clone(),
            format_cents(row.amount),
        ])?;
    }

    csv_writer.flush()?;
    Ok(report.rows.len())
}

/// Exporter for reading collections and ledger data out of the store
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export an output collection to CSV format
    pub async fn export_collection_csv<W: Write>(
        &self,
        collection: &str,
        writer: W,
    ) -> Result<usize> {
        let rows = self.service.balance_rows(collection).await?;
        write_balance_rows_csv(&rows, writer)
    }

    /// Export an output collection to JSON format
    pub async fn export_collection_json<W: Write>(
        &self,
        collection: &str,
        writer: W,
    ) -> Result<usize> {
        let rows = self.service.balance_rows(collection).await?;
        write_balance_rows_json(&rows, writer)
    }

    /// Export accounts and events as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<DatabaseSnapshot> {
        let snapshot = DatabaseSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            accounts: self.service.list_accounts().await?,
            events: self.service.list_events().await?,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }

    /// Export accounts and events as a Tappio document
    pub async fn export_tappio<W: Write>(
        &self,
        writer: W,
        pretty: bool,
    ) -> Result<tappio::Document> {
        let accounts = self.service.list_accounts().await?;
        let events = self.service.list_events().await?;
        let version = format!("saldo {}", env!("CARGO_PKG_VERSION"));

        let document = tappio::Document::from_ledger(&accounts, &events, version);
        tappio::Writer::new(writer, pretty).write_document(&document)?;

        Ok(document)
    }
}
