use std::collections::HashMap;

use crate::domain::{Account, AccountId};
use crate::storage::Storage;

use super::AppError;

/// Accounts the caller has loaded, keyed by id.
///
/// Accounts are handed out by value with [`checkout`](Self::checkout) and
/// returned with [`checkin`](Self::checkin). While an account is checked out
/// the cache does not hold it, so two accounts can be worked on at once
/// without aliasing.
#[derive(Debug, Default)]
pub struct SessionCache {
    accounts: HashMap<AccountId, Account>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the cached account, loading it from storage on a miss.
    pub async fn checkout<S: Storage>(
        &mut self,
        storage: &S,
        id: &AccountId,
    ) -> Result<Account, AppError> {
        match self.accounts.remove(id) {
            Some(account) => Ok(account),
            None => Ok(storage.load(id).await?),
        }
    }

    pub fn checkin(&mut self, account: Account) {
        self.accounts.insert(account.id().clone(), account);
    }

    pub fn get(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn contains(&self, id: &AccountId) -> bool {
        self.accounts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
