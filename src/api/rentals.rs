use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::domain::{RentalError, RentalEvent};
use crate::services::rental_service::{self, CreateRental, RentalRole};

/// One place maps the rental error taxonomy onto HTTP.
fn rental_error_response(err: RentalError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        RentalError::ItemUnavailable => StatusCode::CONFLICT,
        RentalError::SelfRentalForbidden => StatusCode::BAD_REQUEST,
        RentalError::InvalidDateRange => StatusCode::BAD_REQUEST,
        RentalError::RentalNotFound => StatusCode::NOT_FOUND,
        RentalError::NotAuthorized => StatusCode::FORBIDDEN,
        RentalError::InvalidTransition => StatusCode::BAD_REQUEST,
        RentalError::Database(msg) => {
            tracing::error!("Rental persistence error: {}", msg);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": err.to_string() })))
}

fn parse_date(raw: &str) -> Result<NaiveDate, (StatusCode, Json<Value>)> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid date format (expected YYYY-MM-DD)" })),
        )
    })
}

#[derive(Deserialize)]
pub struct CreateRentalRequest {
    pub item_id: i32,
    pub start_date: String,
    pub end_date: String,
    pub payment_reference: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/rentals",
    responses(
        (status = 201, description = "Rental request created"),
        (status = 400, description = "Invalid dates or self-rental"),
        (status = 409, description = "Item not available")
    )
)]
pub async fn create_rental(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<CreateRentalRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let start_date = parse_date(&payload.start_date)?;
    let end_date = parse_date(&payload.end_date)?;

    let rental = rental_service::create_rental(
        &db,
        CreateRental {
            item_id: payload.item_id,
            renter_id: claims.user_id,
            start_date,
            end_date,
            payment_reference: payload.payment_reference,
        },
    )
    .await
    .map_err(rental_error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Rental request submitted successfully",
            "rental": rental
        })),
    ))
}

pub async fn list_my_rentals(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let rentals = rental_service::list_rentals(&db, claims.user_id, RentalRole::Renter)
        .await
        .map_err(rental_error_response)?;

    Ok(Json(json!({ "success": true, "rentals": rentals })))
}

pub async fn list_requests(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let rentals = rental_service::list_rentals(&db, claims.user_id, RentalRole::Owner)
        .await
        .map_err(rental_error_response)?;

    Ok(Json(json!({ "success": true, "rentals": rentals })))
}

async fn apply_transition(
    db: DatabaseConnection,
    rental_id: i32,
    actor_id: i32,
    event: RentalEvent,
    message: &str,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let rental = rental_service::transition(&db, rental_id, actor_id, event)
        .await
        .map_err(rental_error_response)?;

    Ok(Json(json!({
        "success": true,
        "message": message,
        "rental": rental
    })))
}

pub async fn accept_rental(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    apply_transition(db, id, claims.user_id, RentalEvent::Accept, "Rental accepted").await
}

pub async fn reject_rental(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    apply_transition(db, id, claims.user_id, RentalEvent::Reject, "Rental rejected").await
}

pub async fn complete_rental(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    apply_transition(
        db,
        id,
        claims.user_id,
        RentalEvent::Complete,
        "Rental completed",
    )
    .await
}
