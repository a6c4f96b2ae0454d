use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning user (the lender).
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
    /// Percentage reduction (0-100) applied to rentals of 7 days or more.
    pub weekly_discount: i32,
    /// JSON array of image URLs, stored as TEXT.
    pub images: String,
    /// Availability status of this item.
    /// Valid values:
    /// - `available`: listed, can be requested
    /// - `pending`: a rental request is awaiting the owner's decision
    /// - `rented`: a confirmed rental is in progress
    ///
    /// Written only by the rental state machine, never by item updates.
    pub status: String,
    pub view_count: i32,
    pub save_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::rental::Entity")]
    Rental,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::rental::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rental.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
