use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{CreatePaymentRequest, OwnerDetails, PaymentResponse, PaymentWithOwnerResponse},
    middleware::AuthUser,
    models::Decision,
    services::NewPayment,
    utils::ValidatedJson,
    AppState,
};

impl From<CreatePaymentRequest> for NewPayment {
    fn from(req: CreatePaymentRequest) -> Self {
        Self {
            amount: req.amount,
            currency: req.currency,
            account_info: req.account_info,
            swift_code: req.swift_code,
        }
    }
}

pub async fn create_payment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    let payment = state
        .payment_service
        .create(&caller, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

pub async fn list_own_payments(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let payments = state.payment_service.list_own(&caller).await?;

    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

pub async fn list_all_payments(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<PaymentWithOwnerResponse>>, AppError> {
    let payments = state.payment_service.list_all(&caller).await?;

    Ok(Json(
        payments
            .into_iter()
            .map(|(payment, owner)| PaymentWithOwnerResponse {
                payment: PaymentResponse::from(payment),
                user_details: owner.as_ref().map(OwnerDetails::from),
            })
            .collect(),
    ))
}

pub async fn approve_payment(
    state: State<AppState>,
    caller: AuthUser,
    id: Path<String>,
) -> Result<Json<PaymentResponse>, AppError> {
    decide(state, caller, id, Decision::Approve).await
}

pub async fn deny_payment(
    state: State<AppState>,
    caller: AuthUser,
    id: Path<String>,
) -> Result<Json<PaymentResponse>, AppError> {
    decide(state, caller, id, Decision::Deny).await
}

async fn decide(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    decision: Decision,
) -> Result<Json<PaymentResponse>, AppError> {
    let payment = state
        .payment_service
        .decide(&caller, &id, decision)
        .await?;

    Ok(Json(PaymentResponse::from(payment)))
}
