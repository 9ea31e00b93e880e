use std::future::Future;

use thiserror::Error;

use crate::domain::{Account, AccountId};

mod memory;

pub use memory::MemoryStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Persistence contract the transaction engine depends on.
///
/// Backends store the full state of an account (balance and history) under
/// its identifier. `save` is an upsert and must be idempotent. `list_all` makes
/// no ordering promise.
pub trait Storage: Send + Sync {
    fn save(&self, account: &Account) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn load(
        &self,
        id: &AccountId,
    ) -> impl Future<Output = Result<Account, StorageError>> + Send;

    fn list_all(&self) -> impl Future<Output = Result<Vec<Account>, StorageError>> + Send;
}
