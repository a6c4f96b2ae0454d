use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use serde_json::json;

use crate::api::items::ItemDto;
use crate::auth::Claims;
use crate::models::item::{self, Entity as Item};
use crate::models::saved_item::{self, Entity as SavedItem};

fn bump_save_count(item_id: i32, delta: i32) -> UpdateMany<Item> {
    Item::update_many()
        .col_expr(
            item::Column::SaveCount,
            Expr::col(item::Column::SaveCount).add(delta),
        )
        .filter(item::Column::Id.eq(item_id))
}

pub async fn save_item(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let exists = match Item::find_by_id(id).one(&db).await {
        Ok(Some(_)) => true,
        Ok(None) => false,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };
    if !exists {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Item not found" })),
        )
            .into_response();
    }

    let saved = saved_item::ActiveModel {
        user_id: Set(claims.user_id),
        item_id: Set(id),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    let inserted = SavedItem::insert(saved)
        .on_conflict(
            OnConflict::columns([saved_item::Column::UserId, saved_item::Column::ItemId])
                .do_nothing()
                .to_owned(),
        )
        .exec(&db)
        .await;

    match inserted {
        Ok(_) => {
            if let Err(e) = bump_save_count(id, 1).exec(&db).await {
                tracing::error!("Failed to bump save_count for item {}: {}", id, e);
            }
            Json(json!({ "success": true, "message": "Item saved" })).into_response()
        }
        // Already saved: the unique (user_id, item_id) pair swallowed the insert
        Err(DbErr::RecordNotInserted) => {
            Json(json!({ "success": true, "message": "Item saved" })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn unsave_item(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let deleted = SavedItem::delete_many()
        .filter(saved_item::Column::UserId.eq(claims.user_id))
        .filter(saved_item::Column::ItemId.eq(id))
        .exec(&db)
        .await;

    match deleted {
        Ok(res) => {
            if res.rows_affected > 0 {
                if let Err(e) = bump_save_count(id, -1).exec(&db).await {
                    tracing::error!("Failed to drop save_count for item {}: {}", id, e);
                }
            }
            Json(json!({ "success": true, "message": "Item removed from saved" })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn list_saved_items(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> impl IntoResponse {
    let saved_with_items = SavedItem::find()
        .filter(saved_item::Column::UserId.eq(claims.user_id))
        .order_by_desc(saved_item::Column::CreatedAt)
        .find_also_related(Item)
        .all(&db)
        .await;

    match saved_with_items {
        Ok(rows) => {
            let items: Vec<ItemDto> = rows
                .into_iter()
                .filter_map(|(_, item)| item.map(ItemDto::from))
                .collect();
            Json(json!({ "success": true, "items": items })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
