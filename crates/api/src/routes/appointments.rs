//! Appointment endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use domain::models::appointment::{
    AppointmentWithNames, CreateAppointmentRequest, ListAppointmentsQuery,
    ListAppointmentsResponse, UpdateAppointmentRequest, UpdateAppointmentStatusRequest,
};
use domain::services::check_availability;
use persistence::repositories::{
    AppointmentInput, AppointmentRepository, AppointmentUpdateInput, PatientRepository,
    ProfessionalRepository,
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_appointment_booked;

fn not_found() -> ApiError {
    ApiError::NotFound("Appointment not found".to_string())
}

async fn ensure_patient(pool: &PgPool, user_id: Uuid, patient_id: Uuid) -> Result<(), ApiError> {
    if PatientRepository::new(pool.clone())
        .exists(user_id, patient_id)
        .await?
    {
        Ok(())
    } else {
        Err(ApiError::NotFound("Patient not found".to_string()))
    }
}

/// Loads the professional and checks they can be booked on `date`.
async fn ensure_bookable(
    pool: &PgPool,
    user_id: Uuid,
    professional_id: Uuid,
    date: NaiveDate,
) -> Result<(), ApiError> {
    let professional = ProfessionalRepository::new(pool.clone())
        .find_by_id(user_id, professional_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Professional not found".to_string()))?;
    check_availability(&professional, date)?;
    Ok(())
}

/// POST /api/v1/appointments
pub async fn create_appointment(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentWithNames>), ApiError> {
    request.validate()?;

    ensure_patient(&state.pool, auth.user_id, request.patient_id).await?;
    ensure_bookable(
        &state.pool,
        auth.user_id,
        request.professional_id,
        request.date,
    )
    .await?;

    let input = AppointmentInput {
        patient_id: request.patient_id,
        professional_id: request.professional_id,
        date: request.date,
        time: request.time,
        duration_minutes: request.duration_minutes,
        notes: request.notes,
    };
    let appointment = AppointmentRepository::new(state.pool.clone())
        .create(auth.user_id, &input)
        .await?;

    record_appointment_booked();
    info!(
        user_id = %auth.user_id,
        appointment_id = %appointment.appointment.id,
        date = %appointment.appointment.date,
        "Appointment booked"
    );

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// GET /api/v1/appointments
pub async fn list_appointments(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<ListAppointmentsResponse>, ApiError> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(ApiError::Validation(
                "'from' must not be after 'to'".to_string(),
            ));
        }
    }

    let appointments = AppointmentRepository::new(state.pool.clone())
        .list(auth.user_id, &query)
        .await?;
    Ok(Json(ListAppointmentsResponse {
        total: appointments.len(),
        appointments,
    }))
}

/// GET /api/v1/appointments/:id
pub async fn get_appointment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentWithNames>, ApiError> {
    AppointmentRepository::new(state.pool.clone())
        .find_by_id(auth.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// PUT /api/v1/appointments/:id
///
/// Re-checks the patient, the professional's availability and the status
/// transition for whatever fields the request changes. An empty `notes`
/// clears them. The write is guarded on the status read here, so it
/// cannot race a concurrent transition.
pub async fn update_appointment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentWithNames>, ApiError> {
    request.validate()?;

    let repo = AppointmentRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(auth.user_id, id)
        .await?
        .ok_or_else(not_found)?
        .appointment;

    let input = AppointmentUpdateInput {
        patient_id: request.patient_id.unwrap_or(current.patient_id),
        professional_id: request.professional_id.unwrap_or(current.professional_id),
        date: request.date.unwrap_or(current.date),
        time: request.time.unwrap_or(current.time),
        duration_minutes: request.duration_minutes.unwrap_or(current.duration_minutes),
        notes: match request.notes {
            Some(notes) if notes.trim().is_empty() => None,
            Some(notes) => Some(notes),
            None => current.notes,
        },
        status: request.status.unwrap_or(current.status),
    };

    current.status.transition(input.status)?;

    if input.patient_id != current.patient_id {
        ensure_patient(&state.pool, auth.user_id, input.patient_id).await?;
    }
    if input.professional_id != current.professional_id || input.date != current.date {
        ensure_bookable(&state.pool, auth.user_id, input.professional_id, input.date).await?;
    }

    let updated = repo
        .update(auth.user_id, id, current.status, &input)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("Appointment was modified concurrently, retry".to_string())
        })?;
    Ok(Json(updated))
}

/// PATCH /api/v1/appointments/:id/status
///
/// Setting the current status again is a no-op that returns the record.
pub async fn update_appointment_status(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentStatusRequest>,
) -> Result<Json<AppointmentWithNames>, ApiError> {
    let repo = AppointmentRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(auth.user_id, id)
        .await?
        .ok_or_else(not_found)?;

    let from = current.appointment.status;
    if !from.transition(request.status)? {
        return Ok(Json(current));
    }

    match repo
        .update_status(auth.user_id, id, from, request.status)
        .await?
    {
        Some(updated) => {
            info!(
                user_id = %auth.user_id,
                appointment_id = %id,
                from = %from,
                to = %request.status,
                "Appointment status changed"
            );
            Ok(Json(updated))
        }
        // Status moved underneath us.
        None => Err(ApiError::Conflict(
            "Appointment was modified concurrently, retry".to_string(),
        )),
    }
}

/// DELETE /api/v1/appointments/:id
pub async fn delete_appointment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !AppointmentRepository::new(state.pool.clone())
        .delete(auth.user_id, id)
        .await?
    {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
