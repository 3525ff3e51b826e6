//! User entity - Represents customers and administrators.
//!
//! The role column drives access control and is re-read on every guarded request.
//! `password_hash` and `verification_code` never leave the process in serialized form.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access role stored on the user row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    /// Regular shopper
    #[sea_orm(string_value = "User")]
    User,
    /// Back-office administrator
    #[sea_orm(string_value = "Admin")]
    Admin,
}

/// Optional profile gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Gender {
    /// Male
    #[sea_orm(string_value = "Male")]
    Male,
    /// Female
    #[sea_orm(string_value = "Female")]
    Female,
}

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email, unique across all users
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2id PHC string
    #[serde(skip)]
    pub password_hash: String,
    /// Access role
    pub role: UserRole,
    /// Account flag carried in issued tokens
    pub active: bool,
    /// Pending six-digit password reset code
    #[serde(skip)]
    pub verification_code: Option<String>,
    /// Avatar URL
    pub avatar: Option<String>,
    /// Age in years
    pub age: Option<i32>,
    /// Phone number
    pub phone_number: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Gender
    pub gender: Option<Gender>,
    /// When the user registered
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user has at most one cart
    #[sea_orm(has_one = "super::cart::Entity")]
    Cart,
    /// A user writes many reviews
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
    /// A user submits many product requests
    #[sea_orm(has_many = "super::request_product::Entity")]
    RequestProducts,
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cart.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::request_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestProducts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
