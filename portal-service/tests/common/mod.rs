//! Shared setup for portal-service integration tests.
//!
//! Every `TestApp` runs the full router over a fresh in-memory store, so no
//! MongoDB is needed.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use portal_service::{
    build_router,
    config::{
        BootstrapAdminConfig, Environment, JwtConfig, MongoConfig, PortalConfig, RateLimitConfig,
        SecurityConfig, StoreBackend,
    },
    models::Role,
    services::{MemoryStore, NewAccount},
    utils::Password,
    AppState,
};
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN_ACCOUNT: &str = "100000001";
pub const PASSWORD: &str = "CorrectHorse42";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub fn test_config() -> PortalConfig {
    PortalConfig {
        common: service_core::config::Config::default(),
        environment: Environment::Dev,
        service_name: "portal-service-test".to_string(),
        log_level: "error".to_string(),
        store: StoreBackend::Memory,
        mongodb: MongoConfig {
            uri: Secret::new("mongodb://localhost:27017".to_string()),
            database: "portal_test".to_string(),
        },
        jwt: JwtConfig {
            secret: Secret::new("integration-test-secret-0123456789abcdef".to_string()),
            expiry_minutes: 60,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            secure_cookies: false,
        },
        rate_limit: RateLimitConfig {
            global_ip_limit: 10_000,
            global_ip_window_seconds: 900,
            login_attempts: 1_000,
            login_window_seconds: 900,
            trust_proxy: false,
        },
        bootstrap_admin: Some(BootstrapAdminConfig {
            full_name: "Portal Admin".to_string(),
            id_number: "0".to_string(),
            account_number: ADMIN_ACCOUNT.to_string(),
            password: Secret::new(PASSWORD.to_string()),
        }),
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: PortalConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config.clone(), store.clone(), store);

        if let Some(admin) = &config.bootstrap_admin {
            state
                .account_service
                .bootstrap_admin(admin)
                .await
                .expect("Failed to bootstrap admin");
        }

        let router = build_router(state.clone());
        Self { router, state }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn register(&self, account_number: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/api/register",
            None,
            Some(account_body(account_number, None)),
        )
        .await
    }

    pub async fn login(&self, account_number: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "accountNumber": account_number, "password": password })),
        )
        .await
    }

    /// Log in and return the bearer token, panicking on failure.
    pub async fn token_for(&self, account_number: &str) -> String {
        let res = self.login(account_number, PASSWORD).await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);
        res.body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.token_for(ADMIN_ACCOUNT).await
    }

    /// Seed an employee directly through the service layer.
    pub async fn seed_employee(&self, account_number: &str) -> String {
        self.state
            .account_service
            .admin_create(Role::Admin, new_account(account_number), Some("employee"))
            .await
            .unwrap();
        self.token_for(account_number).await
    }

    /// Register a customer and return its token.
    pub async fn seed_user(&self, account_number: &str) -> String {
        let res = self.register(account_number).await;
        assert_eq!(res.status, StatusCode::CREATED, "register failed: {}", res.body);
        self.token_for(account_number).await
    }

    pub async fn submit_payment(&self, token: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/api/payments",
            Some(token),
            Some(payment_body()),
        )
        .await
    }
}

pub fn new_account(account_number: &str) -> NewAccount {
    NewAccount {
        full_name: "Staff Member".to_string(),
        id_number: "9001015009087".to_string(),
        account_number: account_number.to_string(),
        password: Password::new(PASSWORD.to_string()),
    }
}

pub fn account_body(account_number: &str, role: Option<&str>) -> Value {
    let mut body = json!({
        "fullName": "Jane Customer",
        "idNumber": "9202204720082",
        "accountNumber": account_number,
        "password": PASSWORD,
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    body
}

pub fn payment_body() -> Value {
    json!({
        "amount": 250.75,
        "currency": "usd",
        "accountInfo": "GB29NWBK60161331926819",
        "swiftCode": "nwbkgb2l",
    })
}
