use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::review::store::{ReviewEntry, ReviewStatus};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub min_cgpa: Option<f32>,
}

/// GET /api/v1/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ReviewEntry>>, AppError> {
    if params.min_cgpa.is_some_and(|v| !v.is_finite() || v < 0.0) {
        return Err(AppError::Validation(
            "min_cgpa must be a non-negative number".to_string(),
        ));
    }
    Ok(Json(state.reviews.list(params.min_cgpa).await))
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub email: String,
    pub status: ReviewStatus,
}

/// PATCH /api/v1/resumes/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<ReviewEntry>, AppError> {
    let entry = state.reviews.update_status(&req.email, req.status).await?;
    Ok(Json(entry))
}
