use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::{Account, Role};

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_minutes: i64,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// Account id
    pub sub: String,
    pub account_number: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token signature")]
    BadSignature,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry_minutes: config.expiry_minutes,
        }
    }

    pub fn issue(&self, account: &Account) -> Result<String, anyhow::Error> {
        self.issue_at(account, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, account: &Account, now: DateTime<Utc>) -> Result<String, anyhow::Error> {
        let exp = now + Duration::minutes(self.expiry_minutes);

        let claims = SessionClaims {
            sub: account.id.clone(),
            account_number: account.account_number.clone(),
            role: account.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode session token: {}", e))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })
    }

    pub fn expiry_seconds(&self) -> i64 {
        self.expiry_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn service(secret: &str) -> JwtService {
        JwtService::new(&JwtConfig {
            secret: Secret::new(secret.to_string()),
            expiry_minutes: 60,
        })
    }

    fn account(role: Role) -> Account {
        Account::new(
            "Grace Hopper".to_string(),
            "7001015009087".to_string(),
            "1002003004".to_string(),
            "hash".to_string(),
            role,
        )
    }

    #[test]
    fn issued_token_carries_identity_and_role() {
        let jwt = service("unit-test-secret");
        let account = account(Role::Employee);

        let token = jwt.issue(&account).unwrap();
        let claims = jwt.verify(&token).unwrap();

        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.account_number, "1002003004");
        assert_eq!(claims.role, Role::Employee);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(jwt.expiry_seconds(), 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = service("unit-test-secret");
        let issued = Utc::now() - Duration::minutes(61);

        let token = jwt.issue_at(&account(Role::User), issued).unwrap();

        assert_eq!(jwt.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = service("first-secret").issue(&account(Role::Admin)).unwrap();

        assert_eq!(
            service("second-secret").verify(&token),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            service("unit-test-secret").verify("not.a.token"),
            Err(TokenError::Malformed)
        );
    }
}
