use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{Account, Payment, PaymentStatus};
use crate::utils::Normalize;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    #[validate(range(exclusive_min = 0.0, max = 1_000_000_000.0, message = "Amount must be positive"))]
    pub amount: f64,

    #[validate(custom(function = "validate_currency"))]
    pub currency: String,

    #[validate(length(min = 1, max = 100, message = "Account info is required"))]
    pub account_info: String,

    #[validate(custom(function = "validate_swift_code"))]
    pub swift_code: String,
}

impl Normalize for CreatePaymentRequest {
    fn normalize(self) -> Self {
        Self {
            currency: self.currency.trim().to_uppercase(),
            account_info: self.account_info.trim().to_string(),
            swift_code: self.swift_code.trim().to_uppercase(),
            ..self
        }
    }
}

/// Three ASCII letters, e.g. `USD`.
fn validate_currency(value: &str) -> Result<(), ValidationError> {
    if value.len() == 3 && value.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::new("currency_code"))
    }
}

/// BIC: 4 bank letters, 2 country letters, 2 location chars, optional 3 branch chars.
fn validate_swift_code(value: &str) -> Result<(), ValidationError> {
    let bytes = value.as_bytes();
    let well_formed = matches!(bytes.len(), 8 | 11)
        && bytes[..6].iter().all(|b| b.is_ascii_alphabetic())
        && bytes[6..].iter().all(|b| b.is_ascii_alphanumeric());

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("swift_code"))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner_id: String,
    pub amount: f64,
    pub currency: String,
    pub account_info: String,
    pub swift_code: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            amount: p.amount,
            currency: p.currency,
            account_info: p.account_info,
            swift_code: p.swift_code,
            status: p.status,
            created_at: p.created_at.to_chrono(),
            updated_at: p.updated_at.to_chrono(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDetails {
    pub full_name: String,
    pub account_number: String,
}

impl From<&Account> for OwnerDetails {
    fn from(a: &Account) -> Self {
        Self {
            full_name: a.full_name.clone(),
            account_number: a.account_number.clone(),
        }
    }
}

/// Staff view of a payment. `userDetails` is null if the owner record is gone.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWithOwnerResponse {
    #[serde(flatten)]
    pub payment: PaymentResponse,
    pub user_details: Option<OwnerDetails>,
}
