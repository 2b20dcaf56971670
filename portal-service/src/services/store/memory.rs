use async_trait::async_trait;
use mongodb::bson::DateTime;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{AccountStore, PaymentStore, StoreError};
use crate::models::{Account, Payment, PaymentStatus};

/// In-process store with the same semantics as `MongoStore`.
#[derive(Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<String, Account>>,
    /// Insertion order.
    payments: Mutex<Vec<Payment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|e| StoreError::Backend(anyhow::anyhow!("Memory store mutex poisoned: {}", e)))
}

/// Stable sort over reversed insertion order, so same-millisecond writes stay newest first.
fn newest_first<'a>(payments: impl DoubleEndedIterator<Item = &'a Payment>) -> Vec<Payment> {
    let mut sorted: Vec<Payment> = payments.rev().cloned().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = lock(&self.accounts)?;

        if accounts
            .values()
            .any(|a| a.account_number == account.account_number)
        {
            return Err(StoreError::Duplicate(account.account_number.clone()));
        }

        accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn find_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(lock(&self.accounts)?
            .values()
            .find(|a| a.account_number == account_number)
            .cloned())
    }

    async fn find_accounts_by_ids(&self, ids: &[String]) -> Result<Vec<Account>, StoreError> {
        let accounts = lock(&self.accounts)?;
        Ok(ids.iter().filter_map(|id| accounts.get(id).cloned()).collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        lock(&self.accounts).map(|_| ())
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn insert_payment(&self, payment: &Payment) -> Result<(), StoreError> {
        lock(&self.payments)?.push(payment.clone());
        Ok(())
    }

    async fn find_payment(&self, id: &str) -> Result<Option<Payment>, StoreError> {
        Ok(lock(&self.payments)?.iter().find(|p| p.id == id).cloned())
    }

    async fn list_payments_by_owner(&self, owner_id: &str) -> Result<Vec<Payment>, StoreError> {
        let payments = lock(&self.payments)?;
        let owned: Vec<&Payment> = payments.iter().filter(|p| p.owner_id == owner_id).collect();
        Ok(newest_first(owned.into_iter()))
    }

    async fn list_all_payments(&self) -> Result<Vec<Payment>, StoreError> {
        Ok(newest_first(lock(&self.payments)?.iter()))
    }

    async fn decide_pending(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, StoreError> {
        let mut payments = lock(&self.payments)?;

        match payments.iter_mut().find(|p| p.id == id) {
            Some(payment) if payment.status == PaymentStatus::Pending => {
                payment.status = status;
                payment.updated_at = DateTime::now();
                Ok(Some(payment.clone()))
            }
            _ => Ok(None),
        }
    }
}
