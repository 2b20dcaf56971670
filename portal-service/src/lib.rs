pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware,
    rate_limit::{create_ip_rate_limiter, ip_rate_limit_middleware, IpRateLimit},
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use config::PortalConfig;
use services::{
    AccountService, AccountStore, JwtService, PaymentService, PaymentStore, Policy,
};

pub use startup::Application;

#[derive(Clone)]
pub struct AppState {
    pub config: PortalConfig,
    pub accounts: Arc<dyn AccountStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub jwt: JwtService,
    pub policy: Policy,
    pub account_service: AccountService,
    pub payment_service: PaymentService,
    pub login_rate_limiter: IpRateLimit,
    pub ip_rate_limiter: IpRateLimit,
}

impl AppState {
    pub fn new(
        config: PortalConfig,
        accounts: Arc<dyn AccountStore>,
        payments: Arc<dyn PaymentStore>,
    ) -> Self {
        let jwt = JwtService::new(&config.jwt);
        let policy = Policy;

        let trust_proxy = config.rate_limit.trust_proxy;
        let login_rate_limiter = IpRateLimit::new(
            create_ip_rate_limiter(
                config.rate_limit.login_attempts,
                config.rate_limit.login_window_seconds,
            ),
            trust_proxy,
        );
        let ip_rate_limiter = IpRateLimit::new(
            create_ip_rate_limiter(
                config.rate_limit.global_ip_limit,
                config.rate_limit.global_ip_window_seconds,
            ),
            trust_proxy,
        );

        Self {
            account_service: AccountService::new(accounts.clone(), jwt.clone(), policy),
            payment_service: PaymentService::new(payments.clone(), accounts.clone(), policy),
            config,
            accounts,
            payments,
            jwt,
            policy,
            login_rate_limiter,
            ip_rate_limiter,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let login_route = Router::new()
        .route("/api/login", post(handlers::session::login))
        .layer(from_fn_with_state(
            state.login_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let protected_routes = Router::new()
        .route("/api/protected", get(handlers::session::protected))
        .route(
            "/api/admin/create-account",
            post(handlers::accounts::admin_create_account),
        )
        .route(
            "/api/employee/create-user",
            post(handlers::accounts::employee_create_user),
        )
        .route(
            "/api/payments",
            post(handlers::payments::create_payment).get(handlers::payments::list_own_payments),
        )
        .route(
            "/api/admin/payments",
            get(handlers::payments::list_all_payments),
        )
        .route(
            "/api/admin/payments/:id/approve",
            put(handlers::payments::approve_payment),
        )
        .route(
            "/api/admin/payments/:id/deny",
            put(handlers::payments::deny_payment),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/api/register", post(handlers::accounts::register))
        .route("/api/logout", post(handlers::session::logout))
        .merge(login_route)
        .merge(protected_routes)
        .with_state(state.clone())
        .layer(from_fn_with_state(
            state.ip_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config.security.allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
