use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AccountId = Uuid;
pub type AccountNumber = i64;

/// The three branches of the account forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Assets (vastaavaa)
    #[serde(rename = "vastaavaa")]
    Assets,
    /// Liabilities and equity (vastattavaa)
    #[serde(rename = "vastattavaa")]
    Liabilities,
    /// Profit and loss accounts (tulos), settled outside the balance sheet
    #[serde(rename = "tulos")]
    Result,
}

impl AccountType {
    pub const ALL: [AccountType; 3] = [
        AccountType::Assets,
        AccountType::Liabilities,
        AccountType::Result,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Assets => "vastaavaa",
            AccountType::Liabilities => "vastattavaa",
            AccountType::Result => "tulos",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vastaavaa" => Some(AccountType::Assets),
            "vastattavaa" => Some(AccountType::Liabilities),
            "tulos" => Some(AccountType::Result),
            _ => None,
        }
    }

    /// Result-type accounts never appear on the balance sheet.
    pub fn is_result(&self) -> bool {
        matches!(self, AccountType::Result)
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account reference data. Grouping headers in the tree have no number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub number: Option<AccountNumber>,
    pub name: String,
    pub account_type: AccountType,
    pub parent: Option<AccountId>,
}

impl Account {
    pub fn new(number: Option<AccountNumber>, name: String, account_type: AccountType) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            name,
            account_type,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: AccountId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn is_result(&self) -> bool {
        self.account_type.is_result()
    }

    pub fn reference(&self) -> Option<AccountRef> {
        self.number.map(|number| AccountRef {
            number,
            name: self.name.clone(),
        })
    }
}

/// Denormalized `{ number, name }` pair embedded in entries and output rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub number: AccountNumber,
    pub name: String,
}

/// An account together with its depth in the tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeNode<'a> {
    pub depth: usize,
    pub account: &'a Account,
}

/// Walk the account forest depth-first.
/// Roots and siblings keep the order in which they appear in `accounts`.
/// Accounts whose parent is not in the slice are treated as roots.
pub fn flatten_tree(accounts: &[Account]) -> Vec<TreeNode<'_>> {
    let known: HashSet<AccountId> = accounts.iter().map(|a| a.id).collect();
    let mut children: HashMap<AccountId, Vec<&Account>> = HashMap::new();
    let mut roots = Vec::new();

    for account in accounts {
        match account.parent {
            Some(parent) if known.contains(&parent) => {
                children.entry(parent).or_default().push(account)
            }
            _ => roots.push(account),
        }
    }

    let mut nodes = Vec::with_capacity(accounts.len());
    let mut stack: Vec<TreeNode<'_>> = roots
        .into_iter()
        .rev()
        .map(|account| TreeNode { depth: 0, account })
        .collect();

    while let Some(node) = stack.pop() {
        if let Some(kids) = children.get(&node.account.id) {
            stack.extend(kids.iter().rev().map(|&account| TreeNode {
                depth: node.depth + 1,
                account,
            }));
        }
        nodes.push(node);
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_roundtrip() {
        for at in AccountType::ALL {
            assert_eq!(AccountType::from_str(at.as_str()), Some(at));
        }
        assert_eq!(AccountType::from_str("TULOS"), Some(AccountType::Result));
        assert_eq!(AccountType::from_str("asset"), None);
    }

    #[test]
    fn test_only_result_type_is_result() {
        assert!(!AccountType::Assets.is_result());
        assert!(!AccountType::Liabilities.is_result());
        assert!(AccountType::Result.is_result());
    }

    #[test]
    fn test_reference_requires_number() {
        let header = Account::new(None, "VASTAAVAA".into(), AccountType::Assets);
        assert!(header.reference().is_none());

        let cash = Account::new(Some(1910), "Pankkitili".into(), AccountType::Assets);
        assert_eq!(
            cash.reference(),
            Some(AccountRef {
                number: 1910,
                name: "Pankkitili".into()
            })
        );
    }

    #[test]
    fn test_flatten_tree_is_depth_first() {
        let assets = Account::new(None, "Assets".into(), AccountType::Assets);
        let bank =
            Account::new(Some(1910), "Bank".into(), AccountType::Assets).with_parent(assets.id);
        let result = Account::new(None, "Result".into(), AccountType::Result);
        let sales =
            Account::new(Some(3000), "Sales".into(), AccountType::Result).with_parent(result.id);
        let cash =
            Account::new(Some(1900), "Cash".into(), AccountType::Assets).with_parent(assets.id);

        let accounts = vec![assets, result, bank, sales, cash];
        let names: Vec<(usize, &str)> = flatten_tree(&accounts)
            .iter()
            .map(|n| (n.depth, n.account.name.as_str()))
            .collect();

        assert_eq!(
            names,
            vec![
                (0, "Assets"),
                (1, "Bank"),
                (1, "Cash"),
                (0, "Result"),
                (1, "Sales"),
            ]
        );
    }

    #[test]
    fn test_flatten_tree_orphan_becomes_root() {
        let orphan =
            Account::new(Some(1), "Orphan".into(), AccountType::Assets).with_parent(Uuid::new_v4());
        let nodes = flatten_tree(std::slice::from_ref(&orphan));
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].depth, 0);
    }
}
