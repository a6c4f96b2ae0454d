//! Rental Service - lifecycle and pricing logic without HTTP layer
//!
//! Create runs the request validator and, in a single transaction, flips the
//! item to `pending` with a guarded update and inserts the rental row. The
//! guard (`WHERE status = 'available'`, rows_affected checked) is what closes
//! the window between the availability read and the status write: of two
//! racing creates against one item, the second sees zero affected rows and
//! fails with `ItemUnavailable`.
//!
//! Accept/reject/complete all go through one `transition` dispatch that
//! consults the table in `domain::status`.

use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::collections::HashMap;

use crate::domain::pricing::{self, Quote};
use crate::domain::{ItemStatus, RentalError, RentalEvent, RentalStatus};
use crate::models::item::{self, Entity as Item};
use crate::models::rental::{self, Entity as Rental};
use crate::models::user::{self, Entity as User};

/// A validated, priced rental request. Produced by `validate_request`;
/// nothing has been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RentalQuote {
    pub pricing: Quote,
    pub deposit_amount: f64,
}

/// Input for creating a rental request.
#[derive(Debug, Clone)]
pub struct CreateRental {
    pub item_id: i32,
    pub renter_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payment_reference: Option<String>,
}

/// Check the preconditions for renting `item` and price the request.
///
/// Pure with respect to persistence: failures leave no trace, success returns
/// the quote the caller may act on. Check order is availability, then
/// self-rental, then date arithmetic.
pub fn validate_request(
    item: &item::Model,
    renter_id: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<RentalQuote, RentalError> {
    if ItemStatus::parse(&item.status) != Some(ItemStatus::Available) {
        return Err(RentalError::ItemUnavailable);
    }

    if renter_id == item.user_id {
        return Err(RentalError::SelfRentalForbidden);
    }

    let pricing = pricing::quote(start_date, end_date, item.daily_price, item.weekly_discount)?;

    Ok(RentalQuote {
        pricing,
        deposit_amount: item.security_deposit,
    })
}

/// Create a new rental request in `pending` state.
///
/// The paired writes (item -> `pending`, new rental row) commit or roll back
/// together; on any failure no partial state remains.
pub async fn create_rental(
    db: &DatabaseConnection,
    input: CreateRental,
) -> Result<rental::Model, RentalError> {
    let item = Item::find_by_id(input.item_id)
        .one(db)
        .await?
        .ok_or(RentalError::ItemUnavailable)?;

    let quote = validate_request(&item, input.renter_id, input.start_date, input.end_date)?;

    let now = chrono::Utc::now().to_rfc3339();

    let txn = db.begin().await?;

    // Guarded flip: only succeeds if the item is still available. A concurrent
    // create that committed first leaves status != 'available' and we bail out.
    let flipped = Item::update_many()
        .col_expr(
            item::Column::Status,
            Expr::value(ItemStatus::Pending.as_str()),
        )
        .col_expr(item::Column::UpdatedAt, Expr::value(now.clone()))
        .filter(item::Column::Id.eq(item.id))
        .filter(item::Column::Status.eq(ItemStatus::Available.as_str()))
        .exec(&txn)
        .await?;

    if flipped.rows_affected == 0 {
        txn.rollback().await?;
        return Err(RentalError::ItemUnavailable);
    }

    let new_rental = rental::ActiveModel {
        item_id: Set(item.id),
        renter_id: Set(input.renter_id),
        owner_id: Set(item.user_id),
        start_date: Set(input.start_date.format("%Y-%m-%d").to_string()),
        end_date: Set(input.end_date.format("%Y-%m-%d").to_string()),
        total_days: Set(quote.pricing.days as i32),
        daily_rate: Set(item.daily_price),
        total_amount: Set(quote.pricing.total),
        deposit_amount: Set(quote.deposit_amount),
        status: Set(RentalStatus::Pending.as_str().to_owned()),
        payment_reference: Set(input.payment_reference),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved_rental = new_rental.insert(&txn).await?;

    txn.commit().await?;

    Ok(saved_rental)
}

/// Apply a lifecycle event (accept, reject, complete) to a rental.
///
/// The actor rule is checked before the from-state, so an outsider gets
/// `NotAuthorized` no matter what state the rental is in. The rental-status
/// and item-status writes are one transaction.
pub async fn transition(
    db: &DatabaseConnection,
    rental_id: i32,
    actor_id: i32,
    event: RentalEvent,
) -> Result<rental::Model, RentalError> {
    let rental = Rental::find_by_id(rental_id)
        .one(db)
        .await?
        .ok_or(RentalError::RentalNotFound)?;

    let from = RentalStatus::parse(&rental.status).ok_or_else(|| {
        RentalError::Database(format!("unknown rental status '{}'", rental.status))
    })?;

    let (rental_to, item_to) = event.check(from, actor_id, rental.owner_id, rental.renter_id)?;

    let now = chrono::Utc::now().to_rfc3339();

    let txn = db.begin().await?;

    let mut rental_active: rental::ActiveModel = rental.clone().into();
    rental_active.status = Set(rental_to.as_str().to_owned());
    rental_active.updated_at = Set(now.clone());
    let updated_rental = rental_active.update(&txn).await?;

    Item::update_many()
        .col_expr(item::Column::Status, Expr::value(item_to.as_str()))
        .col_expr(item::Column::UpdatedAt, Expr::value(now))
        .filter(item::Column::Id.eq(rental.item_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        "Rental {} moved {} -> {}",
        rental_id,
        from.as_str(),
        rental_to.as_str()
    );

    Ok(updated_rental)
}

/// Whether any non-terminal rental references this item.
pub async fn has_active_rental(db: &DatabaseConnection, item_id: i32) -> Result<bool, RentalError> {
    let count = Rental::find()
        .filter(rental::Column::ItemId.eq(item_id))
        .filter(
            rental::Column::Status.is_in([
                RentalStatus::Pending.as_str(),
                RentalStatus::Confirmed.as_str(),
            ]),
        )
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Which side of a rental a listing is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentalRole {
    Renter,
    Owner,
}

/// Enriched rental with related item and user data
#[derive(Debug, Clone, serde::Serialize)]
pub struct RentalWithDetails {
    pub id: i32,
    pub item_id: i32,
    pub renter_id: i32,
    pub owner_id: i32,
    pub start_date: String,
    pub end_date: String,
    pub total_days: i32,
    pub daily_rate: f64,
    pub total_amount: f64,
    pub deposit_amount: f64,
    pub status: String,
    pub payment_reference: Option<String>,
    pub created_at: String,
    pub item_title: String,
    pub item_images: Vec<String>,
    pub owner_name: String,
    pub owner_avatar: Option<String>,
    pub renter_name: String,
    pub renter_avatar: Option<String>,
}

/// List rentals where the user is the renter (`RentalRole::Renter`) or the
/// requests against the user's items (`RentalRole::Owner`), newest first,
/// with item and counterparty info joined in.
pub async fn list_rentals(
    db: &DatabaseConnection,
    user_id: i32,
    role: RentalRole,
) -> Result<Vec<RentalWithDetails>, RentalError> {
    let column = match role {
        RentalRole::Renter => rental::Column::RenterId,
        RentalRole::Owner => rental::Column::OwnerId,
    };

    let rentals_with_items = Rental::find()
        .filter(column.eq(user_id))
        .order_by_desc(rental::Column::CreatedAt)
        .find_also_related(Item)
        .all(db)
        .await?;

    // Batch-fetch both parties of every rental
    let mut user_ids: Vec<i32> = Vec::new();
    for (rental, _) in &rentals_with_items {
        user_ids.push(rental.owner_id);
        user_ids.push(rental.renter_id);
    }
    user_ids.sort_unstable();
    user_ids.dedup();

    let mut user_map: HashMap<i32, user::Model> = HashMap::new();
    if !user_ids.is_empty() {
        let users = User::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?;
        for u in users {
            user_map.insert(u.id, u);
        }
    }

    let result = rentals_with_items
        .into_iter()
        .map(|(rental, item)| {
            let item_title = item
                .as_ref()
                .map(|i| i.title.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            let item_images = item
                .as_ref()
                .map(|i| serde_json::from_str(&i.images).unwrap_or_default())
                .unwrap_or_default();
            let owner = user_map.get(&rental.owner_id);
            let renter = user_map.get(&rental.renter_id);

            RentalWithDetails {
                id: rental.id,
                item_id: rental.item_id,
                renter_id: rental.renter_id,
                owner_id: rental.owner_id,
                start_date: rental.start_date,
                end_date: rental.end_date,
                total_days: rental.total_days,
                daily_rate: rental.daily_rate,
                total_amount: rental.total_amount,
                deposit_amount: rental.deposit_amount,
                status: rental.status,
                payment_reference: rental.payment_reference,
                created_at: rental.created_at,
                item_title,
                item_images,
                owner_name: owner
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                owner_avatar: owner.and_then(|u| u.avatar.clone()),
                renter_name: renter
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                renter_avatar: renter.and_then(|u| u.avatar.clone()),
            }
        })
        .collect();

    Ok(result)
}
