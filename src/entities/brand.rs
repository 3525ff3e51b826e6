//! Brand entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Brand database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "brands")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the brand
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Brand name, unique
    #[sea_orm(unique)]
    pub name: String,
    /// Optional logo URL
    pub image: Option<String>,
    /// When the brand was created
    pub created_at: DateTimeUtc,
    /// When the brand was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Brand and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One brand has many products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
