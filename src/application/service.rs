use tracing::{debug, error, info, warn};

use crate::domain::{
    Account, Cents, Clock, IdGenerator, SystemClock, Transaction, TransactionKind, format_cents,
};
use crate::storage::Storage;

use super::{AppError, render_statement};

/// The transaction engine for a single account.
///
/// Holds the account exclusively for its lifetime, so a deposit, withdrawal or
/// transfer runs its validate, mutate, append and persist steps without any
/// other code observing the account in between. Every mutation is persisted
/// before the call returns; if persisting fails, the in-memory account is
/// restored to its state before the call.
pub struct AccountService<'a, S: Storage> {
    account: &'a mut Account,
    storage: &'a S,
    ids: &'a dyn IdGenerator,
    clock: &'a dyn Clock,
}

/// Both legs of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub outgoing: Transaction,
    pub incoming: Transaction,
}

impl<'a, S: Storage> AccountService<'a, S> {
    pub fn new(account: &'a mut Account, storage: &'a S, ids: &'a dyn IdGenerator) -> Self {
        Self {
            account,
            storage,
            ids,
            clock: &SystemClock,
        }
    }

    pub fn with_clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn account(&self) -> &Account {
        self.account
    }

    pub fn balance(&self) -> Cents {
        self.account.balance()
    }

    pub fn statement(&self) -> String {
        render_statement(self.account)
    }

    pub async fn deposit(&mut self, amount: Cents) -> Result<Transaction, AppError> {
        self.validate_amount(amount)?;
        if self.account.balance().checked_add(amount).is_none() {
            return Err(self.reject(AppError::BalanceOverflow(self.account.id().clone())));
        }

        let tx = self.new_transaction(self.account, TransactionKind::Deposit, amount);
        self.commit(tx).await
    }

    pub async fn withdraw(&mut self, amount: Cents) -> Result<Transaction, AppError> {
        self.validate_amount(amount)?;
        self.ensure_funds(amount)?;

        let tx = self.new_transaction(self.account, TransactionKind::Withdraw, amount);
        self.commit(tx).await
    }

    /// Move `amount` from the bound account to `target`.
    ///
    /// Both accounts are mutated in memory, then the source is persisted,
    /// then the target. If the target cannot be persisted after the source
    /// was, both accounts are rolled back and the source is saved again in its
    /// prior state; the target's error is returned.
    pub async fn transfer(
        &mut self,
        target: &mut Account,
        amount: Cents,
    ) -> Result<TransferReceipt, AppError> {
        if self.account.id() == target.id() {
            return Err(self.reject(AppError::SameAccountTransfer(self.account.id().clone())));
        }
        self.validate_amount(amount)?;
        self.ensure_funds(amount)?;
        if target.balance().checked_add(amount).is_none() {
            return Err(self.reject(AppError::BalanceOverflow(target.id().clone())));
        }

        let outgoing = self.new_transaction(
            self.account,
            TransactionKind::TransferOut {
                to: target.id().clone(),
            },
            amount,
        );
        let incoming = self.new_transaction(
            target,
            TransactionKind::TransferIn {
                from: self.account.id().clone(),
            },
            amount,
        );

        let source_checkpoint = self.account.checkpoint();
        let target_checkpoint = target.checkpoint();
        self.account.apply(outgoing.clone());
        target.apply(incoming.clone());

        if let Err(err) = self.storage.save(self.account).await {
            self.account.rollback(source_checkpoint);
            target.rollback(target_checkpoint);
            warn!(account_id = %self.account.id(), error = %err, "transfer rolled back");
            return Err(err.into());
        }

        if let Err(err) = self.storage.save(target).await {
            self.account.rollback(source_checkpoint);
            target.rollback(target_checkpoint);
            warn!(
                account_id = %self.account.id(),
                target_id = %target.id(),
                error = %err,
                "transfer rolled back after source was persisted"
            );
            if let Err(compensation) = self.storage.save(self.account).await {
                error!(
                    account_id = %self.account.id(),
                    error = %compensation,
                    "failed to restore persisted source after aborted transfer"
                );
            }
            return Err(err.into());
        }

        info!(
            account_id = %self.account.id(),
            target_id = %target.id(),
            amount = %format_cents(amount),
            "transfer committed"
        );
        Ok(TransferReceipt { outgoing, incoming })
    }

    fn validate_amount(&self, amount: Cents) -> Result<(), AppError> {
        if amount <= 0 {
            return Err(self.reject(AppError::InvalidAmount(amount)));
        }
        Ok(())
    }

    fn ensure_funds(&self, amount: Cents) -> Result<(), AppError> {
        if self.account.balance() < amount {
            return Err(self.reject(AppError::InsufficientFunds {
                account_id: self.account.id().clone(),
                balance: self.account.balance(),
                required: amount,
            }));
        }
        Ok(())
    }

    fn reject(&self, err: AppError) -> AppError {
        debug!(account_id = %self.account.id(), reason = %err, "request rejected");
        err
    }

    fn new_transaction(&self, owner: &Account, kind: TransactionKind, amount: Cents) -> Transaction {
        Transaction::new(
            self.ids.transaction_id(owner.id()),
            kind,
            amount,
            self.clock.now(),
        )
    }

    async fn commit(&mut self, tx: Transaction) -> Result<Transaction, AppError> {
        let checkpoint = self.account.checkpoint();
        self.account.apply(tx.clone());

        if let Err(err) = self.storage.save(self.account).await {
            self.account.rollback(checkpoint);
            warn!(account_id = %self.account.id(), error = %err, "{} rolled back", tx.kind);
            return Err(err.into());
        }

        info!(
            account_id = %self.account.id(),
            transaction_id = %tx.id,
            kind = %tx.kind,
            amount = %format_cents(tx.amount),
            balance = %format_cents(self.account.balance()),
            "transaction committed"
        );
        Ok(tx)
    }
}

/// Create and persist a new account with a zero balance.
pub async fn open_account<S: Storage>(
    storage: &S,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
    owner_name: &str,
) -> Result<Account, AppError> {
    let owner_name = owner_name.trim();
    if owner_name.is_empty() {
        return Err(AppError::InvalidOwnerName);
    }

    let account = Account::new(ids.account_id(), owner_name, clock.now());
    storage.save(&account).await?;
    info!(account_id = %account.id(), owner = owner_name, "account opened");
    Ok(account)
}
