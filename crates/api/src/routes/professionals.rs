//! Professional endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::professional::{
    CreateProfessionalRequest, ListProfessionalsQuery, ListProfessionalsResponse,
    UpdateProfessionalRequest,
};
use domain::models::usage_warning::ResponseWithWarnings;
use domain::models::Professional;
use domain::services::LimitedResource;
use persistence::repositories::ProfessionalRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::plans;

fn not_found() -> ApiError {
    ApiError::NotFound("Professional not found".to_string())
}

/// POST /api/v1/professionals
pub async fn create_professional(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateProfessionalRequest>,
) -> Result<(StatusCode, Json<ResponseWithWarnings<Professional>>), ApiError> {
    request.validate()?;

    let plan =
        plans::check_capacity(&state.pool, auth.user_id, LimitedResource::Professionals).await?;

    let professional = ProfessionalRepository::new(state.pool.clone())
        .create(auth.user_id, &request)
        .await?;
    info!(
        user_id = %auth.user_id,
        professional_id = %professional.id,
        "Professional created"
    );

    let warning = plans::usage_after_create(
        &state.pool,
        auth.user_id,
        plan,
        LimitedResource::Professionals,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ResponseWithWarnings::maybe_with_warning(professional, warning)),
    ))
}

/// GET /api/v1/professionals
pub async fn list_professionals(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListProfessionalsQuery>,
) -> Result<Json<ListProfessionalsResponse>, ApiError> {
    let professionals = ProfessionalRepository::new(state.pool.clone())
        .list(auth.user_id, &query)
        .await?;
    Ok(Json(ListProfessionalsResponse {
        total: professionals.len(),
        professionals,
    }))
}

/// GET /api/v1/professionals/:id
pub async fn get_professional(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Professional>, ApiError> {
    ProfessionalRepository::new(state.pool.clone())
        .find_by_id(auth.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// PUT /api/v1/professionals/:id
pub async fn update_professional(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProfessionalRequest>,
) -> Result<Json<Professional>, ApiError> {
    request.validate()?;

    ProfessionalRepository::new(state.pool.clone())
        .update(auth.user_id, id, &request)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// DELETE /api/v1/professionals/:id
pub async fn delete_professional(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !ProfessionalRepository::new(state.pool.clone())
        .delete(auth.user_id, id)
        .await?
    {
        return Err(not_found());
    }
    info!(user_id = %auth.user_id, professional_id = %id, "Professional deleted");
    Ok(StatusCode::NO_CONTENT)
}
