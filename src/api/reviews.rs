use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::auth::Claims;
use crate::services::review_service::{self, CreateReviewInput, ServiceError};

pub async fn create_review(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<CreateReviewInput>,
) -> impl IntoResponse {
    match review_service::create_review(&db, claims.user_id, payload).await {
        Ok(review) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Review submitted",
                "review": review
            })),
        )
            .into_response(),
        Err(ServiceError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Rental not found" })),
        )
            .into_response(),
        Err(ServiceError::InvalidState(msg)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
        }
        Err(ServiceError::Validation(msg)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
        }
        Err(ServiceError::Database(msg)) => {
            tracing::error!("Review persistence error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to submit review" })),
            )
                .into_response()
        }
    }
}
