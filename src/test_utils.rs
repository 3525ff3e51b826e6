//! Shared test utilities for the storefront backend.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::auth::TokenService,
    entities::{UserRole, cart, category, coupon, product, user},
    errors::Result,
    mail::{Mailer, OutboundEmail},
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, Set};
use std::sync::Mutex;

/// Placeholder stored by helpers that skip hashing; never verifies.
pub const UNUSABLE_PASSWORD_HASH: &str = "!";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Token service with a fixed secret and one-hour access tokens.
pub fn test_tokens() -> TokenService {
    TokenService::new("test-secret", 3600)
}

async fn insert_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    role: UserRole,
) -> Result<user::Model> {
    let now = Utc::now();
    user::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(UNUSABLE_PASSWORD_HASH.to_string()),
        role: Set(role),
        active: Set(true),
        verification_code: Set(None),
        avatar: Set(None),
        age: Set(None),
        phone_number: Set(None),
        address: Set(None),
        gender: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a customer named "Test User".
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    insert_user(db, "Test User", email, UserRole::User).await
}

/// Creates a customer with a specific name.
pub async fn create_named_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
) -> Result<user::Model> {
    insert_user(db, name, email, UserRole::User).await
}

/// Creates an administrator.
pub async fn create_test_admin(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    insert_user(db, "Test Admin", email, UserRole::Admin).await
}

/// Creates a category with no image.
pub async fn create_test_category(db: &DatabaseConnection, name: &str) -> Result<category::Model> {
    let now = Utc::now();
    category::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a product in `category_id`.
///
/// # Defaults
/// * quantity: 100
/// * description: "Test product"
/// * no sub-category, brand or rating
pub async fn create_test_product(
    db: &DatabaseConnection,
    category_id: i64,
    title: &str,
    price: f64,
    price_after_discount: Option<f64>,
) -> Result<product::Model> {
    let now = Utc::now();
    product::ActiveModel {
        id: NotSet,
        title: Set(title.to_string()),
        description: Set("Test product".to_string()),
        quantity: Set(100),
        sold: Set(0),
        image_cover: Set(None),
        price: Set(price),
        price_after_discount: Set(price_after_discount),
        ratings_average: Set(0.0),
        ratings_quantity: Set(0),
        category_id: Set(category_id),
        sub_category_id: Set(None),
        brand_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates an empty cart for `user_id`.
pub async fn create_test_cart(db: &DatabaseConnection, user_id: i64) -> Result<cart::Model> {
    let now = Utc::now();
    cart::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        total_price: Set(0.0),
        total_price_after_discount: Set(None),
        coupon_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a coupon expiring `expires_in` from now (negative for an expired one).
pub async fn create_test_coupon(
    db: &DatabaseConnection,
    name: &str,
    discount: f64,
    expires_in: Duration,
) -> Result<coupon::Model> {
    let now = Utc::now();
    coupon::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        expire_date: Set(now + expires_in),
        discount: Set(discount),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Convenience: a customer with an empty cart and one category.
pub async fn setup_shopper(
    db: &DatabaseConnection,
    email: &str,
) -> Result<(user::Model, cart::Model, category::Model)> {
    let user = create_test_user(db, email).await?;
    let cart = create_test_cart(db, user.id).await?;
    let category = create_test_category(db, &format!("Category for {email}")).await?;
    Ok((user, cart, category))
}

/// Mailer that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingMailer {
    /// Messages sent so far.
    #[allow(clippy::unwrap_used)]
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    #[allow(clippy::unwrap_used)]
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
