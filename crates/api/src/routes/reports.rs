//! Practice report endpoint.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use domain::models::report::{DateWindow, ReportQuery, ReportSummary};
use persistence::repositories::ReportRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// GET /api/v1/reports/summary?from=YYYY-MM-DD&to=YYYY-MM-DD
///
/// Defaults to the current calendar month (UTC).
pub async fn get_summary(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportSummary>, ApiError> {
    let window = DateWindow::resolve(query.from, query.to, Utc::now().date_naive())?;
    let summary = ReportRepository::new(state.pool.clone())
        .summary(auth.user_id, window)
        .await?;
    Ok(Json(summary))
}
