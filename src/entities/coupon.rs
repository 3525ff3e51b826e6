//! Coupon entity - Flat-amount discounts applied to a cart total.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Coupon database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the coupon
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Code customers type in, unique
    #[sea_orm(unique)]
    pub name: String,
    /// The coupon stops applying at this instant
    pub expire_date: DateTimeUtc,
    /// Amount subtracted from the cart total
    pub discount: f64,
    /// When the coupon was created
    pub created_at: DateTimeUtc,
    /// When the coupon was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Coupon and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Carts currently using this coupon
    #[sea_orm(has_many = "super::cart::Entity")]
    Carts,
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
