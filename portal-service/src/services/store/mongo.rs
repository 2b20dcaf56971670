use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, DateTime},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client, Collection, Database, IndexModel,
};
use secrecy::ExposeSecret;

use super::{AccountStore, PaymentStore, StoreError};
use crate::config::MongoConfig;
use crate::models::{Account, Payment, PaymentStatus};

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
    accounts: Collection<Account>,
    payments: Collection<Payment>,
}

impl MongoStore {
    pub async fn connect(config: &MongoConfig, app_name: &str) -> Result<Self, anyhow::Error> {
        let mut client_options = ClientOptions::parse(config.uri.expose_secret()).await?;
        client_options.app_name = Some(app_name.to_string());

        let client = Client::with_options(client_options)?;
        Ok(Self::new(client.database(&config.database)))
    }

    pub fn new(db: Database) -> Self {
        Self {
            accounts: db.collection("accounts"),
            payments: db.collection("payments"),
            db,
        }
    }

    pub async fn init_indexes(&self) -> Result<(), anyhow::Error> {
        let account_number_index = IndexModel::builder()
            .keys(doc! { "account_number": 1 })
            .options(
                IndexOptions::builder()
                    .name("account_number_unique_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.accounts
            .create_indexes([account_number_index], None)
            .await?;

        let owner_index = IndexModel::builder()
            .keys(doc! { "owner_id": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("owner_created_idx".to_string())
                    .build(),
            )
            .build();

        let created_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("created_at_idx".to_string())
                    .build(),
            )
            .build();

        self.payments
            .create_indexes([owner_index, created_index], None)
            .await?;

        tracing::info!("Portal indexes initialized");
        Ok(())
    }

    fn newest_first() -> FindOptions {
        FindOptions::builder().sort(doc! { "created_at": -1 }).build()
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY_CODE
    )
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(anyhow::Error::new(err))
    }
}

#[async_trait]
impl AccountStore for MongoStore {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        match self.accounts.insert_one(account, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => {
                Err(StoreError::Duplicate(account.account_number.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, StoreError> {
        let filter = doc! { "account_number": account_number };
        Ok(self.accounts.find_one(filter, None).await?)
    }

    async fn find_accounts_by_ids(&self, ids: &[String]) -> Result<Vec<Account>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let filter = doc! { "_id": { "$in": ids.to_vec() } };
        let cursor = self.accounts.find(filter, None).await?;
        Ok(cursor.try_collect::<Vec<_>>().await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for MongoStore {
    async fn insert_payment(&self, payment: &Payment) -> Result<(), StoreError> {
        self.payments.insert_one(payment, None).await?;
        Ok(())
    }

    async fn find_payment(&self, id: &str) -> Result<Option<Payment>, StoreError> {
        Ok(self.payments.find_one(doc! { "_id": id }, None).await?)
    }

    async fn list_payments_by_owner(&self, owner_id: &str) -> Result<Vec<Payment>, StoreError> {
        let cursor = self
            .payments
            .find(doc! { "owner_id": owner_id }, Self::newest_first())
            .await?;
        Ok(cursor.try_collect::<Vec<_>>().await?)
    }

    async fn list_all_payments(&self) -> Result<Vec<Payment>, StoreError> {
        let cursor = self.payments.find(doc! {}, Self::newest_first()).await?;
        Ok(cursor.try_collect::<Vec<_>>().await?)
    }

    async fn decide_pending(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, StoreError> {
        let filter = doc! { "_id": id, "status": PaymentStatus::Pending.as_str() };
        let update = doc! {
            "$set": {
                "status": status.as_str(),
                "updated_at": DateTime::now()
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .payments
            .find_one_and_update(filter, update, options)
            .await?)
    }
}
