// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use bankbook::application::{AccountService, open_account};
use bankbook::domain::{Account, AccountId, FixedClock, SequentialIds};
use bankbook::storage::{MemoryStorage, Storage, StorageError};
use chrono::{DateTime, TimeZone, Utc};

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

/// Storage, id generator and clock wired together the way a caller would.
pub struct TestLedger<S: Storage = MemoryStorage> {
    pub storage: S,
    pub ids: SequentialIds,
    pub clock: FixedClock,
}

impl TestLedger<MemoryStorage> {
    pub fn new() -> Self {
        Self::with_storage(MemoryStorage::new())
    }
}

impl<S: Storage> TestLedger<S> {
    pub fn with_storage(storage: S) -> Self {
        Self {
            storage,
            ids: SequentialIds::new(),
            clock: FixedClock(fixed_time()),
        }
    }

    pub async fn open(&self, owner: &str) -> Result<Account> {
        Ok(open_account(&self.storage, &self.ids, &self.clock, owner).await?)
    }

    /// Open an account and fund it with a single deposit.
    pub async fn open_funded(&self, owner: &str, amount: i64) -> Result<Account> {
        let mut account = self.open(owner).await?;
        self.service(&mut account).deposit(amount).await?;
        Ok(account)
    }

    pub fn service<'a>(&'a self, account: &'a mut Account) -> AccountService<'a, S> {
        AccountService::new(account, &self.storage, &self.ids).with_clock(&self.clock)
    }
}

/// In-memory storage that can be told to fail writes.
///
/// Writes fail for any account id in the failing set, and once the optional
/// save budget is used up.
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    failing: Mutex<HashSet<AccountId>>,
    save_budget: Mutex<Option<usize>>,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_saves_for(&self, id: &AccountId) {
        self.failing.lock().unwrap().insert(id.clone());
    }

    /// Allow `n` more successful saves, then fail every save after that.
    pub fn allow_saves(&self, n: usize) {
        *self.save_budget.lock().unwrap() = Some(n);
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
        *self.save_budget.lock().unwrap() = None;
    }

    fn should_fail(&self, id: &AccountId) -> bool {
        if self.failing.lock().unwrap().contains(id) {
            return true;
        }
        let mut budget = self.save_budget.lock().unwrap();
        match *budget {
            Some(0) => true,
            Some(ref mut n) => {
                *n -= 1;
                false
            }
            None => false,
        }
    }
}

impl Storage for FlakyStorage {
    async fn save(&self, account: &Account) -> Result<(), StorageError> {
        if self.should_fail(account.id()) {
            return Err(StorageError::Backend(anyhow!(
                "simulated write failure for {}",
                account.id()
            )));
        }
        self.inner.save(account).await
    }

    async fn load(&self, id: &AccountId) -> Result<Account, StorageError> {
        self.inner.load(id).await
    }

    async fn list_all(&self) -> Result<Vec<Account>, StorageError> {
        self.inner.list_all().await
    }
}
