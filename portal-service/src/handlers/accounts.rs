//! Account creation: public registration and the two staff routes.

use axum::{
    extract::{FromRequest, Request, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{MessageResponse, NewAccountRequest},
    middleware::AuthUser,
    services::{NewAccount, Operation},
    utils::{Password, ValidatedJson},
    AppState,
};

impl From<NewAccountRequest> for NewAccount {
    fn from(req: NewAccountRequest) -> Self {
        Self {
            full_name: req.full_name,
            id_number: req.id_number,
            account_number: req.account_number,
            password: Password::new(req.password),
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewAccountRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    state.account_service.register(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

pub async fn admin_create_account(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    request: Request,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    // Gate on the caller before the body is parsed
    state.policy.authorize(Operation::CreateAccount, caller.role)?;
    let ValidatedJson(mut payload) =
        ValidatedJson::<NewAccountRequest>::from_request(request, &state).await?;

    let role = payload.role.take();

    let account = state
        .account_service
        .admin_create(caller.role, payload.into(), role.as_deref())
        .await?;

    tracing::info!(created_by = %caller.sub, role = %account.role, "Admin created account");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Admin created account successfully")),
    ))
}

pub async fn employee_create_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    request: Request,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    state
        .policy
        .authorize(Operation::EmployeeCreateUser, caller.role)?;
    let ValidatedJson(payload) =
        ValidatedJson::<NewAccountRequest>::from_request(request, &state).await?;

    if let Some(requested) = payload.role.as_deref() {
        tracing::debug!(requested_role = %requested, "Ignoring requested role on employee route");
    }

    state
        .account_service
        .employee_create(caller.role, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Employee created user account successfully",
        )),
    ))
}
