//! Persistence seams for accounts and payments.
//!
//! `MongoStore` is the production backend. `MemoryStore` keeps everything in
//! process and backs the integration tests and `STORE_BACKEND=memory` runs.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Account, Payment, PaymentStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write. Carries the offending key.
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `StoreError::Duplicate` if the account number is taken.
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError>;

    async fn find_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, StoreError>;

    async fn find_accounts_by_ids(&self, ids: &[String]) -> Result<Vec<Account>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert_payment(&self, payment: &Payment) -> Result<(), StoreError>;

    async fn find_payment(&self, id: &str) -> Result<Option<Payment>, StoreError>;

    /// Newest first.
    async fn list_payments_by_owner(&self, owner_id: &str) -> Result<Vec<Payment>, StoreError>;

    /// Newest first.
    async fn list_all_payments(&self) -> Result<Vec<Payment>, StoreError>;

    /// Move a payment from `pending` to `status` in one conditional write.
    ///
    /// Returns the updated payment, or `None` when no pending payment with
    /// that id exists.
    async fn decide_pending(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, StoreError>;
}
