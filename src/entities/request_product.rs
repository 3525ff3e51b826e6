//! Request-for-product entity - Items customers would like the shop to stock.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product request database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "request_products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Requesting user
    pub user_id: i64,
    /// What the user is looking for
    pub title_need: String,
    /// Additional details
    pub details: String,
    /// Desired number of units
    pub quantity: i32,
    /// Free-text category hint
    pub category: Option<String>,
    /// When the request was submitted
    pub created_at: DateTimeUtc,
    /// When the request was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between RequestProduct and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each request belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
