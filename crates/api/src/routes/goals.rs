//! Goal endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::goal::{
    CreateGoalRequest, GoalResponse, ListGoalsQuery, ListGoalsResponse, UpdateGoalRequest,
};
use persistence::repositories::GoalRepository;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

fn not_found() -> ApiError {
    ApiError::NotFound("Goal not found".to_string())
}

/// POST /api/v1/goals
pub async fn create_goal(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<GoalResponse>), ApiError> {
    request.validate()?;
    let goal = GoalRepository::new(state.pool.clone())
        .create(auth.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(goal.into())))
}

/// GET /api/v1/goals
pub async fn list_goals(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListGoalsQuery>,
) -> Result<Json<ListGoalsResponse>, ApiError> {
    let goals: Vec<GoalResponse> = GoalRepository::new(state.pool.clone())
        .list(auth.user_id, &query)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(ListGoalsResponse {
        total: goals.len(),
        goals,
    }))
}

/// GET /api/v1/goals/:id
pub async fn get_goal(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalResponse>, ApiError> {
    GoalRepository::new(state.pool.clone())
        .find_by_id(auth.user_id, id)
        .await?
        .map(|goal| Json(goal.into()))
        .ok_or_else(not_found)
}

/// PUT /api/v1/goals/:id
pub async fn update_goal(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateGoalRequest>,
) -> Result<Json<GoalResponse>, ApiError> {
    request.validate()?;
    GoalRepository::new(state.pool.clone())
        .update(auth.user_id, id, &request)
        .await?
        .map(|goal| Json(goal.into()))
        .ok_or_else(not_found)
}

/// DELETE /api/v1/goals/:id
pub async fn delete_goal(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !GoalRepository::new(state.pool.clone())
        .delete(auth.user_id, id)
        .await?
    {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
