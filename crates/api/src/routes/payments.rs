//! Payment endpoint handlers.
//!
//! Amounts are integer cents. A paid payment is settled: it can be read or
//! deleted but no longer edited or paid again.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::payment::{
    CreatePaymentRequest, ListPaymentsQuery, ListPaymentsResponse, MarkPaidRequest,
    PaymentResponse, PaymentRuleError, UpdatePaymentRequest,
};
use persistence::repositories::{PatientRepository, PaymentRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_payment_received;

fn not_found() -> ApiError {
    ApiError::NotFound("Payment not found".to_string())
}

/// POST /api/v1/payments
pub async fn create_payment(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    request.validate()?;
    request.check_amounts()?;

    if !PatientRepository::new(state.pool.clone())
        .exists(auth.user_id, request.patient_id)
        .await?
    {
        return Err(ApiError::NotFound("Patient not found".to_string()));
    }

    let payment = PaymentRepository::new(state.pool.clone())
        .create(auth.user_id, &request)
        .await?;
    info!(user_id = %auth.user_id, payment_id = %payment.id, "Payment created");

    Ok((StatusCode::CREATED, Json(payment.into())))
}

/// GET /api/v1/payments
pub async fn list_payments(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<ListPaymentsResponse>, ApiError> {
    let payments = PaymentRepository::new(state.pool.clone())
        .list(auth.user_id, &query)
        .await?;
    Ok(Json(ListPaymentsResponse::new(payments)))
}

/// GET /api/v1/payments/:id
pub async fn get_payment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, ApiError> {
    PaymentRepository::new(state.pool.clone())
        .find_by_id(auth.user_id, id)
        .await?
        .map(|payment| Json(payment.into()))
        .ok_or_else(not_found)
}

/// PUT /api/v1/payments/:id
pub async fn update_payment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    request.validate()?;

    let repo = PaymentRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(auth.user_id, id)
        .await?
        .ok_or_else(not_found)?;
    current.check_update(&request)?;

    // The guarded UPDATE skips rows paid since the read above.
    let updated = repo
        .update(auth.user_id, id, &request)
        .await?
        .ok_or(PaymentRuleError::AlreadyPaid)?;
    Ok(Json(updated.into()))
}

/// POST /api/v1/payments/:id/pay
pub async fn mark_paid(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    request: Option<Json<MarkPaidRequest>>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let repo = PaymentRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(auth.user_id, id)
        .await?
        .ok_or_else(not_found)?;
    current.ensure_open()?;

    let paid = repo
        .mark_paid(
            auth.user_id,
            id,
            request.payment_method,
            request.paid_at.unwrap_or_else(Utc::now),
        )
        .await?
        .ok_or(PaymentRuleError::AlreadyPaid)?;

    record_payment_received(paid.net_cents());
    info!(
        user_id = %auth.user_id,
        payment_id = %id,
        net_cents = paid.net_cents(),
        "Payment marked as paid"
    );

    Ok(Json(paid.into()))
}

/// DELETE /api/v1/payments/:id
pub async fn delete_payment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !PaymentRepository::new(state.pool.clone())
        .delete(auth.user_id, id)
        .await?
    {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
