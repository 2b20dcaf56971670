use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{Account, Decision, Payment};
use crate::services::metrics::{record_payment_decision, record_payment_submitted};
use crate::services::store::{AccountStore, PaymentStore};
use crate::services::{Operation, Policy, ServiceError, SessionClaims};

/// Validated fields of a payment submission.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount: f64,
    pub currency: String,
    pub account_info: String,
    pub swift_code: String,
}

#[derive(Clone)]
pub struct PaymentService {
    payments: Arc<dyn PaymentStore>,
    accounts: Arc<dyn AccountStore>,
    policy: Policy,
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentStore>,
        accounts: Arc<dyn AccountStore>,
        policy: Policy,
    ) -> Self {
        Self {
            payments,
            accounts,
            policy,
        }
    }

    pub async fn create(
        &self,
        caller: &SessionClaims,
        new: NewPayment,
    ) -> Result<Payment, ServiceError> {
        self.policy.authorize(Operation::SubmitPayment, caller.role)?;

        let payment = Payment::new(
            caller.sub.clone(),
            new.amount,
            new.currency,
            new.account_info,
            new.swift_code,
        );
        self.payments.insert_payment(&payment).await?;

        tracing::info!(
            payment_id = %payment.id,
            owner_id = %payment.owner_id,
            currency = %payment.currency,
            "Payment submitted"
        );
        record_payment_submitted(&payment.currency);

        Ok(payment)
    }

    pub async fn list_own(&self, caller: &SessionClaims) -> Result<Vec<Payment>, ServiceError> {
        self.policy
            .authorize(Operation::ListOwnPayments, caller.role)?;
        Ok(self.payments.list_payments_by_owner(&caller.sub).await?)
    }

    /// Every payment paired with its owner, newest first.
    pub async fn list_all(
        &self,
        caller: &SessionClaims,
    ) -> Result<Vec<(Payment, Option<Account>)>, ServiceError> {
        self.policy
            .authorize(Operation::ListAllPayments, caller.role)?;

        let payments = self.payments.list_all_payments().await?;

        let mut owner_ids: Vec<String> = payments.iter().map(|p| p.owner_id.clone()).collect();
        owner_ids.sort();
        owner_ids.dedup();

        let owners: HashMap<String, Account> = self
            .accounts
            .find_accounts_by_ids(&owner_ids)
            .await?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();

        Ok(payments
            .into_iter()
            .map(|p| {
                let owner = owners.get(&p.owner_id).cloned();
                (p, owner)
            })
            .collect())
    }

    /// Apply a staff decision to a pending payment.
    ///
    /// Repeating the decision already taken returns the payment unchanged;
    /// the opposite decision on a decided payment is a conflict.
    pub async fn decide(
        &self,
        caller: &SessionClaims,
        id: &str,
        decision: Decision,
    ) -> Result<Payment, ServiceError> {
        self.policy.authorize(Operation::DecidePayment, caller.role)?;

        let target = decision.target_status();

        if let Some(payment) = self.payments.decide_pending(id, target).await? {
            tracing::info!(
                payment_id = %payment.id,
                decided_by = %caller.sub,
                status = %target.as_str(),
                "Payment decided"
            );
            record_payment_decision(decision.as_str());
            return Ok(payment);
        }

        let payment = self
            .payments
            .find_payment(id)
            .await?
            .ok_or(ServiceError::PaymentNotFound)?;

        // The conditional update only misses on a decided payment
        if !payment.status.is_terminal() {
            tracing::error!(
                payment_id = %payment.id,
                "Pending payment was not matched by the conditional update"
            );
            return Err(
                anyhow::anyhow!("Payment {} is still pending after decision", payment.id).into(),
            );
        }

        if payment.status == target {
            tracing::warn!(
                payment_id = %payment.id,
                status = %payment.status.as_str(),
                "Payment already has the requested status"
            );
            Ok(payment)
        } else {
            tracing::warn!(
                payment_id = %payment.id,
                status = %payment.status.as_str(),
                decision = %decision.as_str(),
                "Rejected decision on a decided payment"
            );
            Err(ServiceError::AlreadyDecided(payment.status.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentStatus, Role};
    use crate::services::store::StoreError;
    use crate::services::MemoryStore;
    use async_trait::async_trait;

    fn claims(sub: &str, role: Role) -> SessionClaims {
        SessionClaims {
            sub: sub.to_string(),
            account_number: "123456".to_string(),
            role,
            iat: 0,
            exp: 0,
            jti: "jti".to_string(),
        }
    }

    fn new_payment() -> NewPayment {
        NewPayment {
            amount: 150.5,
            currency: "EUR".to_string(),
            account_info: "DE89370400440532013000".to_string(),
            swift_code: "COBADEFF".to_string(),
        }
    }

    fn service() -> PaymentService {
        let store = Arc::new(MemoryStore::new());
        PaymentService::new(store.clone(), store, Policy)
    }

    #[tokio::test]
    async fn new_payment_is_pending_and_owned_by_caller() {
        let svc = service();
        let payment = svc.create(&claims("u1", Role::User), new_payment()).await.unwrap();

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.owner_id, "u1");
        assert_eq!(svc.list_own(&claims("u1", Role::User)).await.unwrap().len(), 1);
        assert!(svc.list_own(&claims("u2", Role::User)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn decisions_follow_the_state_machine() {
        let svc = service();
        let staff = claims("s1", Role::Employee);
        let payment = svc.create(&claims("u1", Role::User), new_payment()).await.unwrap();

        let approved = svc.decide(&staff, &payment.id, Decision::Approve).await.unwrap();
        assert_eq!(approved.status, PaymentStatus::Approved);

        let again = svc.decide(&staff, &payment.id, Decision::Approve).await.unwrap();
        assert_eq!(again.status, PaymentStatus::Approved);

        let err = svc.decide(&staff, &payment.id, Decision::Deny).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyDecided("approved")));
    }

    /// Store whose conditional update never matches, as if it lost a race
    /// that left the payment pending.
    struct StuckPending(Payment);

    #[async_trait]
    impl PaymentStore for StuckPending {
        async fn insert_payment(&self, _payment: &Payment) -> Result<(), StoreError> {
            Ok(())
        }

        async fn find_payment(&self, _id: &str) -> Result<Option<Payment>, StoreError> {
            Ok(Some(self.0.clone()))
        }

        async fn list_payments_by_owner(&self, _owner_id: &str) -> Result<Vec<Payment>, StoreError> {
            Ok(vec![self.0.clone()])
        }

        async fn list_all_payments(&self) -> Result<Vec<Payment>, StoreError> {
            Ok(vec![self.0.clone()])
        }

        async fn decide_pending(
            &self,
            _id: &str,
            _status: PaymentStatus,
        ) -> Result<Option<Payment>, StoreError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn missed_update_on_pending_payment_is_internal_error() {
        let pending = Payment::new(
            "u1".to_string(),
            10.0,
            "USD".to_string(),
            "GB29NWBK60161331926819".to_string(),
            "NWBKGB2L".to_string(),
        );
        let id = pending.id.clone();
        let svc = PaymentService::new(
            Arc::new(StuckPending(pending)),
            Arc::new(MemoryStore::new()),
            Policy,
        );

        let err = svc
            .decide(&claims("a1", Role::Admin), &id, Decision::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[tokio::test]
    async fn unknown_payment_is_not_found() {
        let svc = service();
        let err = svc
            .decide(&claims("a1", Role::Admin), "nope", Decision::Deny)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PaymentNotFound));
    }

    #[tokio::test]
    async fn users_cannot_decide_or_list_all() {
        let svc = service();
        let user = claims("u1", Role::User);
        let payment = svc.create(&user, new_payment()).await.unwrap();

        assert!(matches!(
            svc.decide(&user, &payment.id, Decision::Approve).await,
            Err(ServiceError::PermissionDenied(_))
        ));
        assert!(matches!(
            svc.list_all(&user).await,
            Err(ServiceError::PermissionDenied(_))
        ));
    }
}
