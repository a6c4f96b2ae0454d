//! Review Service - post-rental reviews and rating aggregates

use sea_orm::*;
use std::collections::HashMap;

use crate::domain::RentalStatus;
use crate::models::rental::Entity as Rental;
use crate::models::review::{self, Entity as Review};
use crate::models::user::{self, Entity as User};

/// Error type for service operations
#[derive(Debug)]
pub enum ServiceError {
    Database(String),
    NotFound,
    InvalidState(String),
    Validation(String),
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Database(e.to_string())
    }
}

/// Input for creating a review
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateReviewInput {
    pub rental_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Enriched review with reviewer info
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReviewWithReviewer {
    pub id: i32,
    pub rental_id: i32,
    pub reviewer_id: i32,
    pub reviewee_id: i32,
    pub item_id: Option<i32>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
    pub reviewer_name: String,
    pub reviewer_avatar: Option<String>,
}

/// Leave a review on a completed rental.
///
/// Only the two parties of the rental may review, each at most once, and the
/// review always targets the other party. The review insert and the
/// reviewee's rating aggregate move in one transaction.
pub async fn create_review(
    db: &DatabaseConnection,
    reviewer_id: i32,
    input: CreateReviewInput,
) -> Result<review::Model, ServiceError> {
    if !(1..=5).contains(&input.rating) {
        return Err(ServiceError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    let rental = Rental::find_by_id(input.rental_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if reviewer_id != rental.renter_id && reviewer_id != rental.owner_id {
        return Err(ServiceError::InvalidState(
            "Only rental participants can leave a review".to_string(),
        ));
    }

    if RentalStatus::parse(&rental.status) != Some(RentalStatus::Completed) {
        return Err(ServiceError::InvalidState(
            "Rental is not completed".to_string(),
        ));
    }

    let already = Review::find()
        .filter(review::Column::RentalId.eq(rental.id))
        .filter(review::Column::ReviewerId.eq(reviewer_id))
        .count(db)
        .await?;
    if already > 0 {
        return Err(ServiceError::InvalidState(
            "You have already reviewed this rental".to_string(),
        ));
    }

    let reviewee_id = if reviewer_id == rental.renter_id {
        rental.owner_id
    } else {
        rental.renter_id
    };

    let reviewee = User::find_by_id(reviewee_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let now = chrono::Utc::now().to_rfc3339();

    let txn = db.begin().await?;

    let new_review = review::ActiveModel {
        rental_id: Set(rental.id),
        reviewer_id: Set(reviewer_id),
        reviewee_id: Set(reviewee_id),
        item_id: Set(Some(rental.item_id)),
        rating: Set(input.rating),
        comment: Set(input.comment),
        created_at: Set(now.clone()),
        ..Default::default()
    };

    let saved = new_review.insert(&txn).await?;

    // Running average over review_count
    let new_count = reviewee.review_count + 1;
    let new_rating = (reviewee.rating * reviewee.review_count as f64 + input.rating as f64)
        / new_count as f64;

    let mut reviewee_active: user::ActiveModel = reviewee.into();
    reviewee_active.rating = Set(new_rating);
    reviewee_active.review_count = Set(new_count);
    reviewee_active.updated_at = Set(now);
    reviewee_active.update(&txn).await?;

    txn.commit().await?;

    Ok(saved)
}

/// List reviews for an item with reviewer name/avatar, newest first.
pub async fn list_item_reviews(
    db: &DatabaseConnection,
    item_id: i32,
) -> Result<Vec<ReviewWithReviewer>, ServiceError> {
    let reviews = Review::find()
        .filter(review::Column::ItemId.eq(item_id))
        .order_by_desc(review::Column::CreatedAt)
        .all(db)
        .await?;

    let reviewer_ids: Vec<i32> = reviews.iter().map(|r| r.reviewer_id).collect();

    let mut reviewer_map: HashMap<i32, user::Model> = HashMap::new();
    if !reviewer_ids.is_empty() {
        let users = User::find()
            .filter(user::Column::Id.is_in(reviewer_ids))
            .all(db)
            .await?;
        for u in users {
            reviewer_map.insert(u.id, u);
        }
    }

    let result = reviews
        .into_iter()
        .map(|r| {
            let reviewer = reviewer_map.get(&r.reviewer_id);
            ReviewWithReviewer {
                id: r.id,
                rental_id: r.rental_id,
                reviewer_id: r.reviewer_id,
                reviewee_id: r.reviewee_id,
                item_id: r.item_id,
                rating: r.rating,
                comment: r.comment,
                created_at: r.created_at,
                reviewer_name: reviewer
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                reviewer_avatar: reviewer.and_then(|u| u.avatar.clone()),
            }
        })
        .collect();

    Ok(result)
}
