use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    flatten_tree, sum_amounts, Account, AccountNumber, AmountOverflow, Cents, GroupedTotal,
};

/// Per-account earnings over the result-type accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsReport {
    pub rows: Vec<EarningsRow>,
    pub total: Cents,
}

/// Income is booked as a credit (negative), so amounts are shown negated:
/// positive earnings, negative costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsRow {
    pub number: AccountNumber,
    pub name: String,
    pub depth: usize,
    pub amount: Cents,
}

/// Build the earnings report, walking result-type accounts in tree order.
/// Every numbered result account gets a row, with zero when it has no entries.
pub fn build_earnings_report(
    accounts: &[Account],
    totals: &[GroupedTotal],
) -> Result<EarningsReport, AmountOverflow> {
    let by_number: HashMap<AccountNumber, Cents> =
        totals.iter().map(|t| (t.key, t.amount)).collect();

    let mut rows = Vec::new();
    for node in flatten_tree(accounts) {
        let Some(number) = node.account.number.filter(|_| node.account.is_result()) else {
            continue;
        };
        let booked = by_number.get(&number).copied().unwrap_or(0);
        rows.push(EarningsRow {
            number,
            name: node.account.name.clone(),
            depth: node.depth,
            amount: booked.checked_neg().ok_or(AmountOverflow::Account(number))?,
        });
    }

    let total = sum_amounts(rows.iter().map(|r| Some(r.amount)))
        .ok_or(AmountOverflow::Total)?;
    Ok(EarningsReport { rows, total })
}
