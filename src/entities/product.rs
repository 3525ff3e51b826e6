//! Product entity - Sellable items in the catalog.
//!
//! Besides the catalog fields, each product carries a running rating aggregate
//! (`ratings_average`, `ratings_quantity`) maintained by the review service. The
//! aggregate is derived state: only [`crate::core::review`] writes it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product title
    pub title: String,
    /// Long description
    pub description: String,
    /// Units in stock
    pub quantity: i32,
    /// Units sold so far
    pub sold: i32,
    /// Cover image URL
    pub image_cover: Option<String>,
    /// List price per unit
    pub price: f64,
    /// Discounted price per unit; zero or absent means no discount
    pub price_after_discount: Option<f64>,
    /// Running mean of review ratings
    pub ratings_average: f64,
    /// Number of ratings folded into the mean
    pub ratings_quantity: i32,
    /// Owning category
    pub category_id: i64,
    /// Optional sub-category
    pub sub_category_id: Option<i64>,
    /// Optional brand
    pub brand_id: Option<i64>,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Restrict"
    )]
    Category,
    /// Optional sub-category
    #[sea_orm(
        belongs_to = "super::sub_category::Entity",
        from = "Column::SubCategoryId",
        to = "super::sub_category::Column::Id",
        on_delete = "SetNull"
    )]
    SubCategory,
    /// Optional brand
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id",
        on_delete = "SetNull"
    )]
    Brand,
    /// Reviews written about this product
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
    /// Cart lines referencing this product
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::sub_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubCategory.def()
    }
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
