//! Category business logic.
//!
//! Categories are the top level of the catalog. Names are unique, and a category cannot
//! be deleted while products still reference it.

use crate::{
    entities::{Category, Product, category, product},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue::NotSet, ConnectionTrait, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};
use validator::Validate;

/// Body of `POST /category/create`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryInput {
    /// Unique category name
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Image URL
    #[validate(url)]
    pub image: Option<String>,
}

/// Body of `PUT /category/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    /// New name
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// New image URL
    #[validate(url)]
    pub image: Option<String>,
}

async fn ensure_name_available<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except: Option<i64>,
) -> Result<()> {
    let existing = Category::find()
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await?;
    match existing {
        Some(other) if Some(other.id) != except => Err(Error::conflict(format!(
            "Category with name {name} already exists"
        ))),
        _ => Ok(()),
    }
}

/// Creates a category with a unique name.
///
/// # Errors
/// Returns an error if:
/// - The input fails validation
/// - Another category already has the name
/// - The database insert fails
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_category(
    db: &DatabaseConnection,
    input: CreateCategoryInput,
) -> Result<category::Model> {
    input.validate()?;
    let name = input.name.trim().to_string();
    ensure_name_available(db, &name, None).await?;

    let now = chrono::Utc::now();
    let created = category::ActiveModel {
        id: NotSet,
        name: Set(name),
        image: Set(input.image),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!("Created category {}", created.id);
    Ok(created)
}

/// Lists every category by name.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches one category.
pub async fn get_category(db: &DatabaseConnection, category_id: i64) -> Result<category::Model> {
    Category::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "Category" })
}

/// Renames a category or changes its image.
#[instrument(skip(db, input))]
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    input: UpdateCategoryInput,
) -> Result<category::Model> {
    input.validate()?;
    let existing = get_category(db, category_id).await?;

    let mut model: category::ActiveModel = existing.into();
    if let Some(name) = input.name {
        let name = name.trim().to_string();
        ensure_name_available(db, &name, Some(category_id)).await?;
        model.name = Set(name);
    }
    if let Some(image) = input.image {
        model.image = Set(Some(image));
    }
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Deletes a category and, through the foreign key, its sub-categories.
///
/// # Errors
/// Returns [`Error::Conflict`] while products still reference the category.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    get_category(db, category_id).await?;
    let products = Product::find()
        .filter(product::Column::CategoryId.eq(category_id))
        .count(db)
        .await?;
    if products > 0 {
        return Err(Error::conflict(format!(
            "Category still has {products} products"
        )));
    }
    Category::delete_by_id(category_id).exec(db).await?;
    info!("Deleted category {}", category_id);
    Ok(())
}
