use secrecy::ExposeSecret;
use std::sync::Arc;

use crate::config::BootstrapAdminConfig;
use crate::models::{Account, Role};
use crate::services::metrics::record_login;
use crate::services::store::AccountStore;
use crate::services::{JwtService, Operation, Policy, ServiceError};
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};

/// Identity fields for an account that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub id_number: String,
    pub account_number: String,
    pub password: Password,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    jwt: JwtService,
    policy: Policy,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>, jwt: JwtService, policy: Policy) -> Self {
        Self { store, jwt, policy }
    }

    /// Public self-registration. Always creates a `user`.
    pub async fn register(&self, new: NewAccount) -> Result<Account, ServiceError> {
        self.create(new, Role::User).await
    }

    /// Admin route. `requested_role` must name `employee` or `user`.
    ///
    /// The caller is checked before the requested role is looked at.
    pub async fn admin_create(
        &self,
        caller: Role,
        new: NewAccount,
        requested_role: Option<&str>,
    ) -> Result<Account, ServiceError> {
        self.policy.authorize(Operation::CreateAccount, caller)?;

        let requested = requested_role.unwrap_or_default();
        let target: Role = requested
            .parse()
            .map_err(|_| ServiceError::InvalidRole(requested.to_string()))?;

        self.policy
            .authorize(Operation::create_account(target), caller)?;
        self.create(new, target).await
    }

    /// Employee route. The new account is a `user` whatever role was asked for.
    pub async fn employee_create(
        &self,
        caller: Role,
        new: NewAccount,
    ) -> Result<Account, ServiceError> {
        self.policy
            .authorize(Operation::EmployeeCreateUser, caller)?;
        self.create(new, Role::User).await
    }

    /// Verify credentials and mint a session token.
    pub async fn login(
        &self,
        account_number: &str,
        password: Password,
    ) -> Result<(Account, String), ServiceError> {
        let Some(account) = self.store.find_by_account_number(account_number).await? else {
            tracing::warn!(account_number = %account_number, "Login failed: account not found");
            record_login("not_found");
            return Err(ServiceError::AccountNotFound);
        };

        let hash = PasswordHashString::new(account.password_hash.clone());
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;

        if !matches {
            tracing::warn!(account_number = %account_number, "Login failed: invalid credentials");
            record_login("invalid_credentials");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.jwt.issue(&account)?;

        tracing::info!(account_id = %account.id, role = %account.role, "Login successful");
        record_login("success");

        Ok((account, token))
    }

    /// Create the configured admin if its account number is still free.
    ///
    /// Returns whether an account was created.
    pub async fn bootstrap_admin(&self, config: &BootstrapAdminConfig) -> Result<bool, ServiceError> {
        if self
            .store
            .find_by_account_number(&config.account_number)
            .await?
            .is_some()
        {
            tracing::debug!(account_number = %config.account_number, "Bootstrap admin already present");
            return Ok(false);
        }

        let new = NewAccount {
            full_name: config.full_name.clone(),
            id_number: config.id_number.clone(),
            account_number: config.account_number.clone(),
            password: Password::new(config.password.expose_secret().clone()),
        };

        let account = self.create(new, Role::Admin).await?;
        tracing::info!(account_id = %account.id, "Bootstrap admin created");
        Ok(true)
    }

    pub fn expiry_seconds(&self) -> i64 {
        self.jwt.expiry_seconds()
    }

    async fn create(&self, new: NewAccount, role: Role) -> Result<Account, ServiceError> {
        if self
            .store
            .find_by_account_number(&new.account_number)
            .await?
            .is_some()
        {
            return Err(ServiceError::AccountNumberExists);
        }

        let password = new.password;
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;

        let account = Account::new(
            new.full_name,
            new.id_number,
            new.account_number,
            hash.into_string(),
            role,
        );

        // The unique index still catches a concurrent insert of the same number.
        self.store.insert_account(&account).await?;

        tracing::info!(account_id = %account.id, role = %role, "Account created");
        Ok(account)
    }
}
