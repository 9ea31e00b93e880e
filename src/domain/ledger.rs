use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::{
    Account, AccountId, Cents, Transaction, TransactionId, TransactionKind, format_cents,
};

/// Recompute a balance from history alone.
/// Balance = sum of credits - sum of debits
///
/// Sums in `i128` so a corrupted history cannot overflow the replay.
pub fn replay_balance(transactions: &[Transaction]) -> i128 {
    transactions.iter().fold(0, |balance, tx| {
        let amount = i128::from(tx.amount);
        if tx.kind.is_credit() {
            balance + amount
        } else {
            balance - amount
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum IntegrityIssue {
    NegativeBalance {
        account_id: AccountId,
        balance: Cents,
    },
    BalanceMismatch {
        account_id: AccountId,
        stored: Cents,
        replayed: i128,
    },
    NonPositiveAmount {
        account_id: AccountId,
        transaction_id: TransactionId,
        amount: Cents,
    },
    DuplicateTransactionId {
        transaction_id: TransactionId,
    },
    /// Totals span the whole ledger and may exceed a single balance.
    UnbalancedTransfers {
        transferred_out: i128,
        transferred_in: i128,
    },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::NegativeBalance {
                account_id,
                balance,
            } => write!(
                f,
                "account {} has negative balance {}",
                account_id,
                format_cents(*balance)
            ),
            IntegrityIssue::BalanceMismatch {
                account_id,
                stored,
                replayed,
            } => write!(
                f,
                "account {} stores balance {} but its history adds up to {}",
                account_id,
                format_cents(*stored),
                format_cents(*replayed)
            ),
            IntegrityIssue::NonPositiveAmount {
                account_id,
                transaction_id,
                amount,
            } => write!(
                f,
                "transaction {} on account {} has non-positive amount {}",
                transaction_id,
                account_id,
                format_cents(*amount)
            ),
            IntegrityIssue::DuplicateTransactionId { transaction_id } => {
                write!(f, "transaction id {} is used more than once", transaction_id)
            }
            IntegrityIssue::UnbalancedTransfers {
                transferred_out,
                transferred_in,
            } => write!(
                f,
                "transfers out total {} but transfers in total {}",
                format_cents(*transferred_out),
                format_cents(*transferred_in)
            ),
        }
    }
}

/// Check one account against its own history.
pub fn verify_account(account: &Account) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    let id = account.id();

    if account.balance() < 0 {
        issues.push(IntegrityIssue::NegativeBalance {
            account_id: id.clone(),
            balance: account.balance(),
        });
    }

    let replayed = replay_balance(account.transactions());
    if replayed != i128::from(account.balance()) {
        issues.push(IntegrityIssue::BalanceMismatch {
            account_id: id.clone(),
            stored: account.balance(),
            replayed,
        });
    }

    let mut seen = HashSet::new();
    for tx in account.transactions() {
        if tx.amount <= 0 {
            issues.push(IntegrityIssue::NonPositiveAmount {
                account_id: id.clone(),
                transaction_id: tx.id.clone(),
                amount: tx.amount,
            });
        }
        if !seen.insert(&tx.id) {
            issues.push(IntegrityIssue::DuplicateTransactionId {
                transaction_id: tx.id.clone(),
            });
        }
    }

    issues
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    pub account_count: usize,
    pub transaction_count: usize,
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check every account and the cross-account properties: ids unique across
/// the whole ledger, and money moved by transfers neither created nor lost.
pub fn build_integrity_report(accounts: &[Account]) -> IntegrityReport {
    let mut report = IntegrityReport {
        account_count: accounts.len(),
        ..Default::default()
    };

    let mut owners: HashMap<&TransactionId, &AccountId> = HashMap::new();
    let mut transferred_out: i128 = 0;
    let mut transferred_in: i128 = 0;

    for account in accounts {
        report.issues.extend(verify_account(account));
        report.transaction_count += account.transactions().len();

        for tx in account.transactions() {
            // Duplicates inside one account were already reported above.
            if let Some(owner) = owners.insert(&tx.id, account.id()) {
                if owner != account.id() {
                    report.issues.push(IntegrityIssue::DuplicateTransactionId {
                        transaction_id: tx.id.clone(),
                    });
                }
            }
            match tx.kind {
                TransactionKind::TransferOut { .. } => transferred_out += i128::from(tx.amount),
                TransactionKind::TransferIn { .. } => transferred_in += i128::from(tx.amount),
                TransactionKind::Deposit | TransactionKind::Withdraw => {}
            }
        }
    }

    if transferred_out != transferred_in {
        report.issues.push(IntegrityIssue::UnbalancedTransfers {
            transferred_out,
            transferred_in,
        });
    }

    report
}
