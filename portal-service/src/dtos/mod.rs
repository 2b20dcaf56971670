pub mod accounts;
pub mod payments;

use serde::Serialize;

pub use accounts::{LoginRequest, LoginResponse, NewAccountRequest, ProtectedResponse};
pub use payments::{CreatePaymentRequest, OwnerDetails, PaymentResponse, PaymentWithOwnerResponse};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
