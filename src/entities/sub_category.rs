//! Sub-category entity - Second level of the catalog, always attached to a category.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sub-category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sub_categories")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the sub-category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Sub-category name, unique
    #[sea_orm(unique)]
    pub name: String,
    /// Optional image URL
    pub image: Option<String>,
    /// Parent category
    pub category_id: i64,
    /// When the sub-category was created
    pub created_at: DateTimeUtc,
    /// When the sub-category was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between SubCategory and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sub-category belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
    /// One sub-category groups many products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
