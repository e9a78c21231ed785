use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{
    sum_amounts, summarize, AccountNumber, AccountRef, AmountOverflow, BalanceRow, Cents,
    GroupedTotal,
};
use crate::storage::BalanceSheetStore;

use super::AppError;

/// Default output collection for the balance sheet.
pub const DEFAULT_COLLECTION: &str = "balance_sheet";

/// What to do with a grouped total whose account number has no account record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingAccountPolicy {
    /// Drop the total and record its number in the report.
    #[default]
    Skip,
    /// Abort the run with `AppError::AccountNotFound`.
    Fail,
}

impl MissingAccountPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingAccountPolicy::Skip => "skip",
            MissingAccountPolicy::Fail => "fail",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "skip" => Some(MissingAccountPolicy::Skip),
            "fail" => Some(MissingAccountPolicy::Fail),
            _ => None,
        }
    }
}

/// Outcome of one balance-sheet run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BalanceSheetReport {
    pub collection: String,
    /// Number of grouped totals produced by the summarizer.
    pub grouped: usize,
    /// Rows upserted, in the order they were written.
    pub written: Vec<BalanceRow>,
    /// Result-type accounts left out of the sheet.
    pub excluded: Vec<AccountNumber>,
    /// Totals whose account number matched no account.
    pub missing: Vec<AccountNumber>,
}

impl BalanceSheetReport {
    /// Sum of the written rows.
    pub fn total(&self) -> Result<Cents, AmountOverflow> {
        sum_amounts(self.written.iter().map(|row| Some(row.amount)))
            .ok_or(AmountOverflow::Total)
    }
}

/// Join grouped totals against account metadata and upsert the balance rows.
///
/// Result-type accounts are skipped. Totals without an account are skipped or
/// rejected according to `policy`.
pub async fn format_balance_sheet<S: BalanceSheetStore>(
    store: &S,
    totals: &[GroupedTotal],
    collection: &str,
    policy: MissingAccountPolicy,
) -> Result<BalanceSheetReport, AppError> {
    validate_collection_name(collection)?;

    let mut report = BalanceSheetReport {
        collection: collection.to_string(),
        grouped: totals.len(),
        ..Default::default()
    };

    for total in totals {
        let Some(account) = store.find_account(total.key).await? else {
            if policy == MissingAccountPolicy::Fail {
                return Err(AppError::AccountNotFound(total.key));
            }
            warn!(
                account = total.key,
                amount = total.amount,
                "No account for grouped total, skipping"
            );
            report.missing.push(total.key);
            continue;
        };

        if account.is_result() {
            debug!(account = total.key, "Result-type account excluded");
            report.excluded.push(total.key);
            continue;
        }

        let row = BalanceRow {
            id: total.key,
            account: AccountRef {
                number: total.key,
                name: account.name,
            },
            amount: total.amount,
        };
        store.upsert_row(collection, &row).await?;
        report.written.push(row);
    }

    Ok(report)
}

/// Run the whole pipeline: scan entries, sum them per account, write the sheet.
pub async fn run_balance_sheet<S: BalanceSheetStore>(
    store: &S,
    collection: &str,
    policy: MissingAccountPolicy,
) -> Result<BalanceSheetReport, AppError> {
    validate_collection_name(collection)?;

    let entries = store.scan_entries().await?;
    let totals = summarize(&entries)?;
    info!(
        entries = entries.len(),
        accounts = totals.len(),
        "Grouped ledger entries"
    );

    let report = format_balance_sheet(store, &totals, collection, policy).await?;
    info!(
        collection = %report.collection,
        written = report.written.len(),
        excluded = report.excluded.len(),
        missing = report.missing.len(),
        "Balance sheet written"
    );
    Ok(report)
}

fn validate_collection_name(collection: &str) -> Result<(), AppError> {
    if collection.trim().is_empty() {
        return Err(AppError::InvalidCollectionName(collection.to_string()));
    }
    Ok(())
}
