use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Cents, Transaction};

/// An owner's balance plus the full history that produced it.
///
/// State only changes through [`Account::apply`], which the transaction engine
/// calls after validating the request, so `balance` never goes negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    owner_name: String,
    balance: Cents,
    transactions: Vec<Transaction>,
    created_at: DateTime<Utc>,
}

/// Balance and history length captured before a mutation, used to undo it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    balance: Cents,
    len: usize,
}

impl Account {
    pub fn new(id: AccountId, owner_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_name: owner_name.into(),
            balance: 0,
            transactions: Vec::new(),
            created_at,
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn balance(&self) -> Cents {
        self.balance
    }

    /// History in the order it was appended.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Append a validated transaction and move the balance by its signed amount.
    pub(crate) fn apply(&mut self, transaction: Transaction) {
        self.balance += transaction.signed_amount();
        self.transactions.push(transaction);
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            balance: self.balance,
            len: self.transactions.len(),
        }
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.balance = checkpoint.balance;
        self.transactions.truncate(checkpoint.len);
    }
}
