//! Note endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::note::{CreateNoteRequest, ListNotesQuery, ListNotesResponse, UpdateNoteRequest};
use domain::models::Note;
use persistence::repositories::{NoteRepository, PatientRepository};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

fn not_found() -> ApiError {
    ApiError::NotFound("Note not found".to_string())
}

/// A note may only be linked to one of the tenant's own patients.
async fn ensure_linked_patient(
    pool: &PgPool,
    user_id: Uuid,
    patient_id: Option<Uuid>,
) -> Result<(), ApiError> {
    match patient_id {
        Some(patient_id)
            if !PatientRepository::new(pool.clone())
                .exists(user_id, patient_id)
                .await? =>
        {
            Err(ApiError::NotFound("Patient not found".to_string()))
        }
        _ => Ok(()),
    }
}

/// POST /api/v1/notes
pub async fn create_note(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    request.validate()?;
    ensure_linked_patient(&state.pool, auth.user_id, request.patient_id).await?;

    let note = NoteRepository::new(state.pool.clone())
        .create(auth.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /api/v1/notes
pub async fn list_notes(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListNotesQuery>,
) -> Result<Json<ListNotesResponse>, ApiError> {
    let notes = NoteRepository::new(state.pool.clone())
        .list(auth.user_id, &query)
        .await?;
    Ok(Json(ListNotesResponse {
        total: notes.len(),
        notes,
    }))
}

/// GET /api/v1/notes/:id
pub async fn get_note(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    NoteRepository::new(state.pool.clone())
        .find_by_id(auth.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// PUT /api/v1/notes/:id
pub async fn update_note(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    request.validate()?;
    ensure_linked_patient(&state.pool, auth.user_id, request.patient_id).await?;

    NoteRepository::new(state.pool.clone())
        .update(auth.user_id, id, &request)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// DELETE /api/v1/notes/:id
pub async fn delete_note(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !NoteRepository::new(state.pool.clone())
        .delete(auth.user_id, id)
        .await?
    {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
