use thiserror::Error;

use crate::domain::{AccountId, Cents, format_cents};
use crate::storage::StorageError;

/// Every failure the engine reports. None of them leave an account changed.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount {}: must be greater than zero", money(.0))]
    InvalidAmount(Cents),

    #[error(
        "Insufficient funds in account {account_id}: balance {}, required {}",
        money(.balance),
        money(.required)
    )]
    InsufficientFunds {
        account_id: AccountId,
        balance: Cents,
        required: Cents,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Cannot transfer from account {0} to itself")]
    SameAccountTransfer(AccountId),

    #[error("Balance of account {0} would overflow")]
    BalanceOverflow(AccountId),

    #[error("Owner name must not be empty")]
    InvalidOwnerName,

    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),
}

fn money(cents: &Cents) -> String {
    format_cents(*cents)
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AccountNotFound(id) => AppError::AccountNotFound(id),
            other => AppError::Storage(other),
        }
    }
}
