//! Cart entity - One per user, holding an incrementally maintained total.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "carts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the cart
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner; a user has at most one cart
    #[sea_orm(unique)]
    pub user_id: i64,
    /// Sum of `unit price × quantity` over the cart's lines
    pub total_price: f64,
    /// Total after the applied coupon, if any
    pub total_price_after_discount: Option<f64>,
    /// Applied coupon
    pub coupon_id: Option<i64>,
    /// When the cart was created
    pub created_at: DateTimeUtc,
    /// When the cart was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Cart and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each cart belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// The coupon currently applied
    #[sea_orm(
        belongs_to = "super::coupon::Entity",
        from = "Column::CouponId",
        to = "super::coupon::Column::Id",
        on_delete = "SetNull"
    )]
    Coupon,
    /// One cart owns many lines
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::coupon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coupon.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
