pub mod accounts;
pub mod error;
pub mod jwt;
pub mod metrics;
pub mod payments;
pub mod policy;
pub mod store;

pub use accounts::{AccountService, NewAccount};
pub use error::ServiceError;
pub use jwt::{JwtService, SessionClaims, TokenError};
pub use metrics::{get_metrics, init_metrics};
pub use payments::{NewPayment, PaymentService};
pub use policy::{Operation, Policy};
pub use store::{AccountStore, MemoryStore, MongoStore, PaymentStore, StoreError};
