//! Cart item entity - A single product line inside a cart.
//!
//! `(cart_id, product_id)` is unique; the index is created in
//! [`crate::config::database::create_tables`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_items")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning cart
    pub cart_id: i64,
    /// Product on this line
    pub product_id: i64,
    /// User who owns the cart
    pub user_id: i64,
    /// Number of units, at least one
    pub quantity: i32,
    /// Chosen color variant
    pub color: Option<String>,
    /// When the line was added
    pub created_at: DateTimeUtc,
    /// When the line was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between CartItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one cart
    #[sea_orm(
        belongs_to = "super::cart::Entity",
        from = "Column::CartId",
        to = "super::cart::Column::Id",
        on_delete = "Cascade"
    )]
    Cart,
    /// Each line references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cart.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
