pub mod account;
pub mod payment;

pub use account::{Account, Role};
pub use payment::{Decision, Payment, PaymentStatus};
