use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Cents, TransactionId, format_cents};

/// What a transaction did to its owning account.
///
/// A transfer produces one record on each side: `TransferOut` on the debited
/// account naming the target, `TransferIn` on the credited account naming the
/// source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    TransferOut { to: AccountId },
    TransferIn { from: AccountId },
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdraw => "WITHDRAW",
            TransactionKind::TransferOut { .. } => "TRANSFER_OUT",
            TransactionKind::TransferIn { .. } => "TRANSFER_IN",
        }
    }

    /// True for kinds that add money to the owning account.
    pub fn is_credit(&self) -> bool {
        matches!(
            self,
            TransactionKind::Deposit | TransactionKind::TransferIn { .. }
        )
    }

    /// The other account of a transfer leg.
    pub fn counterparty(&self) -> Option<&AccountId> {
        match self {
            TransactionKind::TransferOut { to } => Some(to),
            TransactionKind::TransferIn { from } => Some(from),
            TransactionKind::Deposit | TransactionKind::Withdraw => None,
        }
    }

    fn describe(&self, amount: Cents) -> String {
        let amount = format_cents(amount);
        match self {
            TransactionKind::Deposit => format!("Deposit of {}", amount),
            TransactionKind::Withdraw => format!("Withdrawal of {}", amount),
            TransactionKind::TransferOut { to } => format!("Transfer of {} to {}", amount, to),
            TransactionKind::TransferIn { from } => {
                format!("Transfer of {} from {}", amount, from)
            }
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of one balance-affecting event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    /// Always positive; direction comes from `kind`.
    pub amount: Cents,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        kind: TransactionKind,
        amount: Cents,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let message = kind.describe(amount);
        Self {
            id,
            kind,
            amount,
            timestamp,
            message,
        }
    }

    /// Amount with the sign of its effect on the owning account.
    pub fn signed_amount(&self) -> Cents {
        if self.kind.is_credit() {
            self.amount
        } else {
            -self.amount
        }
    }
}
