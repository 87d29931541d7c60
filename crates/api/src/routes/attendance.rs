//! Attendance endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::attendance::{
    ListAttendanceQuery, ListAttendanceResponse, UpsertAttendanceRequest,
};
use domain::models::Attendance;
use persistence::repositories::{AttendanceRepository, PatientRepository, PaymentRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

fn not_found() -> ApiError {
    ApiError::NotFound("Attendance record not found".to_string())
}

/// PUT /api/v1/attendance
///
/// One record per patient and session date: 201 when inserted, 200 when an
/// existing record for that day was replaced.
pub async fn upsert_attendance(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<UpsertAttendanceRequest>,
) -> Result<(StatusCode, Json<Attendance>), ApiError> {
    request.validate()?;

    if !PatientRepository::new(state.pool.clone())
        .exists(auth.user_id, request.patient_id)
        .await?
    {
        return Err(ApiError::NotFound("Patient not found".to_string()));
    }
    if let Some(payment_id) = request.payment_id {
        if !PaymentRepository::new(state.pool.clone())
            .exists(auth.user_id, payment_id)
            .await?
        {
            return Err(ApiError::NotFound("Payment not found".to_string()));
        }
    }

    let result = AttendanceRepository::new(state.pool.clone())
        .upsert(auth.user_id, &request)
        .await?;

    info!(
        user_id = %auth.user_id,
        attendance_id = %result.attendance.id,
        created = result.created,
        "Attendance recorded"
    );

    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(result.attendance)))
}

/// GET /api/v1/attendance
pub async fn list_attendance(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListAttendanceQuery>,
) -> Result<Json<ListAttendanceResponse>, ApiError> {
    let records = AttendanceRepository::new(state.pool.clone())
        .list(auth.user_id, &query)
        .await?;
    Ok(Json(ListAttendanceResponse {
        total: records.len(),
        records,
    }))
}

/// GET /api/v1/attendance/:id
pub async fn get_attendance(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Attendance>, ApiError> {
    AttendanceRepository::new(state.pool.clone())
        .find_by_id(auth.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// DELETE /api/v1/attendance/:id
pub async fn delete_attendance(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !AttendanceRepository::new(state.pool.clone())
        .delete(auth.user_id, id)
        .await?
    {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
