use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rentals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item_id: i32,
    pub renter_id: i32,
    pub owner_id: i32,
    /// Calendar date, `YYYY-MM-DD`.
    pub start_date: String,
    /// Calendar date, `YYYY-MM-DD`. Inclusive: a same-day rental is one day.
    pub end_date: String,
    pub total_days: i32,
    /// Copied from the item at creation time, not live-linked.
    pub daily_rate: f64,
    pub total_amount: f64,
    /// Copied from the item's security deposit at creation time.
    pub deposit_amount: f64,
    /// Lifecycle status.
    /// Valid values: `pending`, `confirmed`, `rejected`, `completed`.
    /// `rejected` and `completed` are terminal.
    pub status: String,
    /// Opaque reference handed to us by the payment flow; never verified here.
    pub payment_reference: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Item,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
