use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use tracing::debug;

use crate::domain::{Account, AccountId};

use super::{Storage, StorageError};

/// Volatile backend: a map from account id to the last saved state.
///
/// Saves are last-writer-wins with no versioning. Every read hands out a
/// clone, so callers never observe a later save through an earlier load.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<AccountId, Account>>, StorageError> {
        self.accounts
            .read()
            .map_err(|_| StorageError::Backend(anyhow!("account map lock poisoned")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<AccountId, Account>>, StorageError> {
        self.accounts
            .write()
            .map_err(|_| StorageError::Backend(anyhow!("account map lock poisoned")))
    }
}

impl Storage for MemoryStorage {
    async fn save(&self, account: &Account) -> Result<(), StorageError> {
        self.write()?.insert(account.id().clone(), account.clone());
        debug!(
            account_id = %account.id(),
            balance = account.balance(),
            transactions = account.transactions().len(),
            "account saved"
        );
        Ok(())
    }

    async fn load(&self, id: &AccountId) -> Result<Account, StorageError> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::AccountNotFound(id.clone()))
    }

    async fn list_all(&self) -> Result<Vec<Account>, StorageError> {
        Ok(self.read()?.values().cloned().collect())
    }
}
