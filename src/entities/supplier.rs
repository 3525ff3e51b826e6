//! Supplier entity - Vendors the shop sources products from.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supplier database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suppliers")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the supplier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Supplier name, unique
    #[sea_orm(unique)]
    pub name: String,
    /// Supplier website URL
    pub website: String,
    /// When the supplier was created
    pub created_at: DateTimeUtc,
    /// When the supplier was last modified
    pub updated_at: DateTimeUtc,
}

/// Suppliers have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
