//! Database configuration module for the storefront backend.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity` so the schema always
//! matches the entity definitions; the two composite uniqueness rules that the
//! entity macros cannot express are added as explicit indexes.

use crate::entities::{
    Brand, Cart, CartItem, CartItemColumn, Category, Coupon, Product, RequestProduct, Review,
    ReviewColumn, SubCategory, Supplier, Tax, User,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement, TableCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://storefront.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

fn table<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    stmt
}

fn unique_indexes() -> [IndexCreateStatement; 2] {
    [
        // one line per product in a cart
        Index::create()
            .name("idx_cart_items_cart_product")
            .table(CartItem)
            .col(CartItemColumn::CartId)
            .col(CartItemColumn::ProductId)
            .unique()
            .if_not_exists()
            .to_owned(),
        // one review per user and product
        Index::create()
            .name("idx_reviews_user_product")
            .table(Review)
            .col(ReviewColumn::UserId)
            .col(ReviewColumn::ProductId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}

/// Creates all tables and indexes from the entity definitions.
///
/// Tables are created parents-first so foreign keys always point at an existing table.
/// Safe to call on every start-up.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        table(&schema, User),
        table(&schema, Category),
        table(&schema, SubCategory),
        table(&schema, Brand),
        table(&schema, Supplier),
        table(&schema, Tax),
        table(&schema, Coupon),
        table(&schema, Product),
        table(&schema, Cart),
        table(&schema, CartItem),
        table(&schema, Review),
        table(&schema, RequestProduct),
    ];

    for stmt in &tables {
        db.execute(builder.build(stmt)).await?;
    }
    for stmt in &unique_indexes() {
        db.execute(builder.build(stmt)).await?;
    }

    info!("Database tables ensured ({} tables).", tables.len());
    Ok(())
}
