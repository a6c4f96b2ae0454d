use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::models::item;
use crate::services::item_service::{
    self, CreateItemInput, ItemFilter, ServiceError, UpdateItemInput,
};

/// Item as the API returns it: images decoded from the stored JSON.
#[derive(Debug, Serialize)]
pub struct ItemDto {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub item_condition: Option<String>,
    pub daily_price: f64,
    pub security_deposit: f64,
    pub weekly_discount: i32,
    pub images: Vec<String>,
    pub status: String,
    pub view_count: i32,
    pub save_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<item::Model> for ItemDto {
    fn from(model: item::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            category: model.category,
            subcategory: model.subcategory,
            size: model.size,
            color: model.color,
            brand: model.brand,
            item_condition: model.item_condition,
            daily_price: model.daily_price,
            security_deposit: model.security_deposit,
            weekly_discount: model.weekly_discount,
            images: item_service::parse_images(&model.images),
            status: model.status,
            view_count: model.view_count,
            save_count: model.save_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn item_error_response(err: ServiceError) -> (StatusCode, Json<Value>) {
    match err {
        ServiceError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Item not found or not authorized" })),
        ),
        ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))),
        ServiceError::HasActiveRental => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Item has an active rental" })),
        ),
        ServiceError::Database(msg) => {
            tracing::error!("Item persistence error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to process item request" })),
            )
        }
    }
}

#[derive(Deserialize)]
pub struct ListItemsQuery {
    pub category: Option<String>,
    pub size: Option<String>,
    #[serde(alias = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(alias = "maxPrice")]
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/items",
    responses(
        (status = 200, description = "Available items matching the filters")
    )
)]
pub async fn list_items(
    State(db): State<DatabaseConnection>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let items = item_service::list_items(
        &db,
        ItemFilter {
            category: query.category,
            size: query.size,
            min_price: query.min_price,
            max_price: query.max_price,
            search: query.search,
            limit: query.limit,
        },
    )
    .await
    .map_err(item_error_response)?;

    Ok(Json(json!({ "success": true, "items": items })))
}

pub async fn get_item(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let details = item_service::get_item(&db, id)
        .await
        .map_err(item_error_response)?;

    Ok(Json(json!({ "success": true, "item": details })))
}

pub async fn list_my_items(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let items = item_service::list_user_items(&db, claims.user_id)
        .await
        .map_err(item_error_response)?;

    let item_dtos: Vec<ItemDto> = items.into_iter().map(ItemDto::from).collect();

    Ok(Json(json!({ "success": true, "items": item_dtos })))
}

pub async fn create_item(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<CreateItemInput>,
) -> impl IntoResponse {
    match item_service::create_item(&db, claims.user_id, payload).await {
        Ok(model) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Item listed successfully",
                "item": ItemDto::from(model)
            })),
        )
            .into_response(),
        Err(e) => item_error_response(e).into_response(),
    }
}

pub async fn update_item(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateItemInput>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let updated = item_service::update_item(&db, id, claims.user_id, payload)
        .await
        .map_err(item_error_response)?;

    Ok(Json(json!({
        "success": true,
        "item": ItemDto::from(updated)
    })))
}

pub async fn delete_item(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    item_service::delete_item(&db, id, claims.user_id)
        .await
        .map_err(item_error_response)?;

    Ok(Json(
        json!({ "success": true, "message": "Item deleted" }),
    ))
}
