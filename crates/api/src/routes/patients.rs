//! Patient endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::patient::{
    CreatePatientRequest, ListPatientsQuery, ListPatientsResponse, Patient, UpdatePatientRequest,
};
use domain::models::usage_warning::ResponseWithWarnings;
use domain::services::LimitedResource;
use persistence::repositories::PatientRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::plans;

fn not_found() -> ApiError {
    ApiError::NotFound("Patient not found".to_string())
}

/// POST /api/v1/patients
///
/// Blocked with 403 at the plan limit; from 80% usage the response carries
/// a `warnings` banner.
pub async fn create_patient(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<ResponseWithWarnings<Patient>>), ApiError> {
    request.validate()?;

    let plan = plans::check_capacity(&state.pool, auth.user_id, LimitedResource::Patients).await?;

    let patient = PatientRepository::new(state.pool.clone())
        .create(auth.user_id, &request)
        .await?;
    info!(user_id = %auth.user_id, patient_id = %patient.id, "Patient created");

    let warning =
        plans::usage_after_create(&state.pool, auth.user_id, plan, LimitedResource::Patients)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(ResponseWithWarnings::maybe_with_warning(patient, warning)),
    ))
}

/// GET /api/v1/patients
pub async fn list_patients(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListPatientsQuery>,
) -> Result<Json<ListPatientsResponse>, ApiError> {
    let patients = PatientRepository::new(state.pool.clone())
        .list(auth.user_id, &query)
        .await?;
    Ok(Json(ListPatientsResponse {
        total: patients.len(),
        patients,
    }))
}

/// GET /api/v1/patients/:id
pub async fn get_patient(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    PatientRepository::new(state.pool.clone())
        .find_by_id(auth.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// PUT /api/v1/patients/:id
pub async fn update_patient(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Patient>, ApiError> {
    request.validate()?;

    PatientRepository::new(state.pool.clone())
        .update(auth.user_id, id, &request)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// DELETE /api/v1/patients/:id
///
/// Cascades to the patient's appointments, attendance, payments and notes.
pub async fn delete_patient(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !PatientRepository::new(state.pool.clone())
        .delete(auth.user_id, id)
        .await?
    {
        return Err(not_found());
    }
    info!(user_id = %auth.user_id, patient_id = %id, "Patient deleted");
    Ok(StatusCode::NO_CONTENT)
}
