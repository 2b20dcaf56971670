//! Payment model - a transfer request awaiting staff review.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Denied,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Denied => "denied",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

/// A staff decision on a pending payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Deny,
}

impl Decision {
    pub fn target_status(&self) -> PaymentStatus {
        match self {
            Decision::Approve => PaymentStatus::Approved,
            Decision::Deny => PaymentStatus::Denied,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Deny => "deny",
        }
    }
}

/// Payment entity as persisted in the `payments` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner_id: String,
    pub amount: f64,
    pub currency: String,
    pub account_info: String,
    pub swift_code: String,
    pub status: PaymentStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Payment {
    /// New payments always start out pending.
    pub fn new(
        owner_id: String,
        amount: f64,
        currency: String,
        account_info: String,
        swift_code: String,
    ) -> Self {
        let now = DateTime::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            amount,
            currency,
            account_info,
            swift_code,
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_payment_is_pending() {
        let payment = Payment::new(
            "owner".to_string(),
            10.0,
            "USD".to_string(),
            "DE89370400440532013000".to_string(),
            "DEUTDEFF".to_string(),
        );
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(!payment.status.is_terminal());
    }

    #[test]
    fn decisions_map_to_terminal_states() {
        assert_eq!(Decision::Approve.target_status(), PaymentStatus::Approved);
        assert_eq!(Decision::Deny.target_status(), PaymentStatus::Denied);
        assert!(Decision::Deny.target_status().is_terminal());
    }
}
