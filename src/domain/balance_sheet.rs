use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{sum_amounts, AccountNumber, AccountRef, AmountOverflow, Cents, LedgerEntry};

/// Value emitted by the grouper for one entry, and produced by `reduce` for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedValue {
    pub amount: Option<Cents>,
}

/// Summed amount for one account number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedTotal {
    pub key: AccountNumber,
    pub amount: Cents,
}

/// One line of the balance sheet, keyed by account number in its collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub id: AccountNumber,
    pub account: AccountRef,
    pub amount: Cents,
}

/// Emit the grouping key and value for a single entry.
pub fn map_entry(entry: &LedgerEntry) -> (AccountNumber, EmittedValue) {
    (
        entry.account.number,
        EmittedValue {
            amount: entry.amount,
        },
    )
}

/// Collect emitted values per account number.
pub fn group_entries<'a, I>(entries: I) -> BTreeMap<AccountNumber, Vec<EmittedValue>>
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let mut groups: BTreeMap<AccountNumber, Vec<EmittedValue>> = BTreeMap::new();
    for entry in entries {
        let (key, value) = map_entry(entry);
        groups.entry(key).or_default().push(value);
    }
    groups
}

/// Sum the values sharing one key.
///
/// The output has the same shape as the input, so a reduced value may be fed
/// back in with further values and yields the same total. `None` means the
/// sum does not fit in `Cents`.
pub fn reduce(values: &[EmittedValue]) -> Option<EmittedValue> {
    let amount = sum_amounts(values.iter().map(|v| v.amount))?;
    Some(EmittedValue {
        amount: Some(amount),
    })
}

/// Group and reduce in one pass. Totals come out ordered by account number.
pub fn summarize<'a, I>(entries: I) -> Result<Vec<GroupedTotal>, AmountOverflow>
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    group_entries(entries)
        .into_iter()
        .map(|(key, values)| {
            let reduced = reduce(&values).ok_or(AmountOverflow::Account(key))?;
            Ok(GroupedTotal {
                key,
                amount: reduced.amount.unwrap_or(0),
            })
        })
        .collect()
}
