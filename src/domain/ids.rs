use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of account and transaction identifiers.
///
/// Implementations must never hand out the same identifier twice for the
/// lifetime of the generator, even when called back-to-back.
pub trait IdGenerator: Send + Sync {
    fn account_id(&self) -> AccountId;
    fn transaction_id(&self, account: &AccountId) -> TransactionId;
}

/// Counter-based identifiers: `ACC000001`, `TX-ACC000001-000001`.
///
/// The transaction sequence is shared by all accounts, so ids stay unique
/// even if two generators' account ids were ever to collide.
#[derive(Debug, Default)]
pub struct SequentialIds {
    accounts: AtomicU64,
    transactions: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn account_id(&self) -> AccountId {
        let n = self.accounts.fetch_add(1, Ordering::Relaxed) + 1;
        AccountId(format!("ACC{:06}", n))
    }

    fn transaction_id(&self, account: &AccountId) -> TransactionId {
        let n = self.transactions.fetch_add(1, Ordering::Relaxed) + 1;
        TransactionId(format!("TX-{}-{:06}", account, n))
    }
}

/// Random identifiers, for sessions where ids from separate runs may meet.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn account_id(&self) -> AccountId {
        AccountId(format!("ACC-{}", Uuid::new_v4()))
    }

    fn transaction_id(&self, _account: &AccountId) -> TransactionId {
        TransactionId(format!("TX-{}", Uuid::new_v4()))
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant. Makes statements reproducible.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
