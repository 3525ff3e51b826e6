//! Tax entity - Named tax rates maintained by administrators.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tax database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "taxes")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the tax
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Tax name, unique
    #[sea_orm(unique)]
    pub name: String,
    /// Tax amount, if fixed
    pub price: Option<f64>,
    /// When the tax was created
    pub created_at: DateTimeUtc,
    /// When the tax was last modified
    pub updated_at: DateTimeUtc,
}

/// Tax rates have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
