//! Item Service - listing catalogue logic without HTTP layer

use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::models::item::{self, Entity as Item};
use crate::models::user::{self as user_model, Entity as User};
use crate::services::rental_service;
use crate::services::review_service::{self, ReviewWithReviewer};

/// Error type for service operations
#[derive(Debug)]
pub enum ServiceError {
    Database(String),
    NotFound,
    Validation(String),
    /// Deletion refused: a pending or confirmed rental still references the item
    HasActiveRental,
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Database(e.to_string())
    }
}

/// Filter parameters for browsing the catalogue
#[derive(Debug, Default, Clone)]
pub struct ItemFilter {
    pub category: Option<String>,
    pub size: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub limit: Option<u64>,
}

/// Catalogue entry with owner info joined in. Images come back as a list;
/// the stored JSON is parsed with an empty-list fallback.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ItemWithOwner {
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
    pub owner_name: String,
    pub owner_avatar: Option<String>,
    pub owner_rating: f64,
}

/// Item detail page data: owner profile fields and reviews included.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ItemDetails {
    #[serde(flatten)]
    pub summary: ItemWithOwner,
    pub owner_review_count: i32,
    pub owner_campus: Option<String>,
    pub owner_building: Option<String>,
    pub reviews: Vec<ReviewWithReviewer>,
}

pub(crate) fn parse_images(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn with_owner(item: item::Model, owner: Option<&user_model::Model>) -> ItemWithOwner {
    ItemWithOwner {
        id: item.id,
        user_id: item.user_id,
        title: item.title,
        description: item.description,
        category: item.category,
        subcategory: item.subcategory,
        size: item.size,
        color: item.color,
        brand: item.brand,
        item_condition: item.item_condition,
        daily_price: item.daily_price,
        security_deposit: item.security_deposit,
        weekly_discount: item.weekly_discount,
        images: parse_images(&item.images),
        status: item.status,
        view_count: item.view_count,
        save_count: item.save_count,
        created_at: item.created_at,
        owner_name: owner
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        owner_avatar: owner.and_then(|u| u.avatar.clone()),
        owner_rating: owner.map(|u| u.rating).unwrap_or(0.0),
    }
}

fn validate_pricing(
    daily_price: f64,
    security_deposit: f64,
    weekly_discount: i32,
) -> Result<(), ServiceError> {
    if daily_price <= 0.0 {
        return Err(ServiceError::Validation(
            "Daily price must be positive".to_string(),
        ));
    }
    if security_deposit < 0.0 {
        return Err(ServiceError::Validation(
            "Security deposit cannot be negative".to_string(),
        ));
    }
    if !(0..=100).contains(&weekly_discount) {
        return Err(ServiceError::Validation(
            "Weekly discount must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

/// Input for creating an item listing
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateItemInput {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub item_condition: Option<String>,
    pub daily_price: f64,
    pub security_deposit: Option<f64>,
    pub weekly_discount: Option<i32>,
    pub images: Option<Vec<String>>,
}

/// Input for updating an item listing. All fields optional; absent fields keep
/// their current value. There is deliberately no `status` here: availability
/// is written only by the rental state machine.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct UpdateItemInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub item_condition: Option<String>,
    pub daily_price: Option<f64>,
    pub security_deposit: Option<f64>,
    pub weekly_discount: Option<i32>,
    pub images: Option<Vec<String>>,
}

/// Browse available items with optional filters, newest first.
pub async fn list_items(
    db: &DatabaseConnection,
    filter: ItemFilter,
) -> Result<Vec<ItemWithOwner>, ServiceError> {
    let mut condition = Condition::all().add(item::Column::Status.eq("available"));

    if let Some(category) = filter.category {
        condition = condition.add(item::Column::Category.eq(category));
    }

    if let Some(size) = filter.size {
        condition = condition.add(item::Column::Size.eq(size));
    }

    if let Some(min_price) = filter.min_price {
        condition = condition.add(item::Column::DailyPrice.gte(min_price));
    }

    if let Some(max_price) = filter.max_price {
        condition = condition.add(item::Column::DailyPrice.lte(max_price));
    }

    if let Some(search) = filter.search {
        condition = condition.add(
            Condition::any()
                .add(item::Column::Title.contains(&search))
                .add(item::Column::Description.contains(&search)),
        );
    }

    let items_with_owners = Item::find()
        .filter(condition)
        .order_by_desc(item::Column::CreatedAt)
        .limit(filter.limit.unwrap_or(50))
        .find_also_related(User)
        .all(db)
        .await?;

    let result = items_with_owners
        .into_iter()
        .map(|(item, owner)| with_owner(item, owner.as_ref()))
        .collect();

    Ok(result)
}

/// Fetch one item with owner profile and reviews, bumping its view counter.
pub async fn get_item(db: &DatabaseConnection, id: i32) -> Result<ItemDetails, ServiceError> {
    let (item, owner) = Item::find_by_id(id)
        .find_also_related(User)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    Item::update_many()
        .col_expr(
            item::Column::ViewCount,
            Expr::col(item::Column::ViewCount).add(1),
        )
        .filter(item::Column::Id.eq(id))
        .exec(db)
        .await?;

    let reviews = review_service::list_item_reviews(db, id)
        .await
        .map_err(|e| ServiceError::Database(format!("{:?}", e)))?;

    Ok(ItemDetails {
        owner_review_count: owner.as_ref().map(|u| u.review_count).unwrap_or(0),
        owner_campus: owner.as_ref().and_then(|u| u.campus.clone()),
        owner_building: owner.as_ref().and_then(|u| u.building.clone()),
        summary: with_owner(item, owner.as_ref()),
        reviews,
    })
}

/// List all of a user's own items, any status, newest first.
pub async fn list_user_items(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<item::Model>, ServiceError> {
    let items = Item::find()
        .filter(item::Column::UserId.eq(user_id))
        .order_by_desc(item::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(items)
}

/// Create a new listing owned by `user_id`. New items always start `available`.
pub async fn create_item(
    db: &DatabaseConnection,
    user_id: i32,
    input: CreateItemInput,
) -> Result<item::Model, ServiceError> {
    if input.title.trim().is_empty() {
        return Err(ServiceError::Validation("Title is required".to_string()));
    }

    let security_deposit = input.security_deposit.unwrap_or(0.0);
    let weekly_discount = input.weekly_discount.unwrap_or(0);
    validate_pricing(input.daily_price, security_deposit, weekly_discount)?;

    let now = chrono::Utc::now().to_rfc3339();
    let images = serde_json::to_string(&input.images.unwrap_or_default())
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    let new_item = item::ActiveModel {
        user_id: Set(user_id),
        title: Set(input.title),
        description: Set(input.description),
        category: Set(input.category),
        subcategory: Set(input.subcategory),
        size: Set(input.size),
        color: Set(input.color),
        brand: Set(input.brand),
        item_condition: Set(input.item_condition),
        daily_price: Set(input.daily_price),
        security_deposit: Set(security_deposit),
        weekly_discount: Set(weekly_discount),
        images: Set(images),
        status: Set("available".to_owned()),
        view_count: Set(0),
        save_count: Set(0),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = new_item.insert(db).await?;
    Ok(saved)
}

/// Update a listing. Only the owner may update; anyone else sees `NotFound`.
pub async fn update_item(
    db: &DatabaseConnection,
    id: i32,
    user_id: i32,
    input: UpdateItemInput,
) -> Result<item::Model, ServiceError> {
    let item = Item::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if item.user_id != user_id {
        return Err(ServiceError::NotFound);
    }

    let daily_price = input.daily_price.unwrap_or(item.daily_price);
    let security_deposit = input.security_deposit.unwrap_or(item.security_deposit);
    let weekly_discount = input.weekly_discount.unwrap_or(item.weekly_discount);
    validate_pricing(daily_price, security_deposit, weekly_discount)?;

    let mut active: item::ActiveModel = item.into();

    if let Some(title) = input.title {
        if title.trim().is_empty() {
            return Err(ServiceError::Validation("Title is required".to_string()));
        }
        active.title = Set(title);
    }
    if let Some(description) = input.description {
        active.description = Set(Some(description));
    }
    if let Some(category) = input.category {
        active.category = Set(Some(category));
    }
    if let Some(subcategory) = input.subcategory {
        active.subcategory = Set(Some(subcategory));
    }
    if let Some(size) = input.size {
        active.size = Set(Some(size));
    }
    if let Some(color) = input.color {
        active.color = Set(Some(color));
    }
    if let Some(brand) = input.brand {
        active.brand = Set(Some(brand));
    }
    if let Some(condition) = input.item_condition {
        active.item_condition = Set(Some(condition));
    }
    active.daily_price = Set(daily_price);
    active.security_deposit = Set(security_deposit);
    active.weekly_discount = Set(weekly_discount);
    if let Some(images) = input.images {
        let encoded =
            serde_json::to_string(&images).map_err(|e| ServiceError::Database(e.to_string()))?;
        active.images = Set(encoded);
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let updated = active.update(db).await?;
    Ok(updated)
}

/// Delete a listing. Refused while a non-terminal rental references it.
pub async fn delete_item(
    db: &DatabaseConnection,
    id: i32,
    user_id: i32,
) -> Result<(), ServiceError> {
    let item = Item::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if item.user_id != user_id {
        return Err(ServiceError::NotFound);
    }

    let active = rental_service::has_active_rental(db, id)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;
    if active {
        return Err(ServiceError::HasActiveRental);
    }

    item.delete(db).await?;
    Ok(())
}
