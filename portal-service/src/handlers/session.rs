use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use service_core::error::AppError;

use crate::{
    dtos::{LoginRequest, LoginResponse, MessageResponse, ProtectedResponse},
    middleware::{AuthUser, SESSION_COOKIE},
    services::Operation,
    utils::{Password, ValidatedJson},
    AppState,
};

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let (account, token) = state
        .account_service
        .login(&payload.account_number, Password::new(payload.password))
        .await?;

    let expires_in = state.account_service.expiry_seconds();

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .secure(state.config.security.secure_cookies)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(expires_in))
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            token,
            role: account.role,
            expires_in,
        }),
    ))
}

/// Tokens are stateless; logging out only drops the cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(MessageResponse::new("Logged out")),
    )
}

pub async fn protected(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ProtectedResponse>, AppError> {
    state
        .policy
        .authorize(Operation::ViewSession, claims.role)?;

    Ok(Json(ProtectedResponse {
        message: "Access granted to protected route".to_string(),
        decoded: claims,
    }))
}
