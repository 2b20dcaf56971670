use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::Validate;

/// Canonicalise user input (trim, upper-case codes) before it is validated.
pub trait Normalize {
    fn normalize(self) -> Self;
}

/// JSON body that has been parsed, normalised and validated.
///
/// Parse and validation failures are both rejected with 400.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Normalize + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        let value = value.normalize();
        value.validate()?;

        Ok(ValidatedJson(value))
    }
}
