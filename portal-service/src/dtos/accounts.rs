use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{models::Role, services::SessionClaims, utils::Normalize};

/// Body shared by self-registration and the staff account-creation routes.
///
/// `role` is only honoured on the admin route; registration and employee
/// creation always produce a `user`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAccountRequest {
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,

    #[validate(length(min = 1, max = 32, message = "ID number is required"))]
    pub id_number: String,

    #[validate(
        length(min = 6, max = 20, message = "Account number must be 6-20 digits"),
        custom(function = "validate_account_number")
    )]
    pub account_number: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: Option<String>,
}

impl Normalize for NewAccountRequest {
    fn normalize(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            id_number: self.id_number.trim().to_string(),
            account_number: self.account_number.trim().to_string(),
            role: self.role.map(|r| r.trim().to_string()),
            ..self
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 20, message = "Account number is required"))]
    pub account_number: String,

    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

impl Normalize for LoginRequest {
    fn normalize(self) -> Self {
        Self {
            account_number: self.account_number.trim().to_string(),
            ..self
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub role: Role,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub message: String,
    pub decoded: SessionClaims,
}

fn validate_account_number(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("account_number_digits"))
    }
}
