//! Sub-category business logic. Every sub-category hangs off an existing category.

use crate::{
    core::category::get_category,
    entities::{Category, SubCategory, category, sub_category},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue::NotSet, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

/// Body of `POST /sub-category/create`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubCategoryInput {
    /// Unique name
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Parent category
    pub category_id: i64,
    /// Image URL
    #[validate(url)]
    pub image: Option<String>,
}

/// Body of `PUT /sub-category/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubCategoryInput {
    /// New name
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// New parent category
    pub category_id: Option<i64>,
    /// New image URL
    #[validate(url)]
    pub image: Option<String>,
}

/// A sub-category together with its parent
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryView {
    /// The sub-category row
    #[serde(flatten)]
    pub sub_category: sub_category::Model,
    /// Its parent
    pub category: Option<category::Model>,
}

async fn ensure_name_available(
    db: &DatabaseConnection,
    name: &str,
    except: Option<i64>,
) -> Result<()> {
    let existing = SubCategory::find()
        .filter(sub_category::Column::Name.eq(name))
        .one(db)
        .await?;
    match existing {
        Some(other) if Some(other.id) != except => Err(Error::conflict(format!(
            "Sub-category with name {name} already exists"
        ))),
        _ => Ok(()),
    }
}

/// Creates a sub-category under an existing category.
///
/// # Errors
/// Returns an error if:
/// - The input fails validation
/// - The parent category does not exist
/// - Another sub-category already has the name
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_sub_category(
    db: &DatabaseConnection,
    input: CreateSubCategoryInput,
) -> Result<sub_category::Model> {
    input.validate()?;
    get_category(db, input.category_id).await?;
    let name = input.name.trim().to_string();
    ensure_name_available(db, &name, None).await?;

    let now = chrono::Utc::now();
    let created = sub_category::ActiveModel {
        id: NotSet,
        name: Set(name),
        image: Set(input.image),
        category_id: Set(input.category_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!("Created sub-category {} under category {}", created.id, created.category_id);
    Ok(created)
}

/// Lists every sub-category with its parent, by name.
pub async fn list_sub_categories(db: &DatabaseConnection) -> Result<Vec<SubCategoryView>> {
    let rows = SubCategory::find()
        .find_also_related(Category)
        .order_by_asc(sub_category::Column::Name)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(sub_category, category)| SubCategoryView {
            sub_category,
            category,
        })
        .collect())
}

/// Fetches a sub-category row.
pub async fn find_sub_category(
    db: &DatabaseConnection,
    sub_category_id: i64,
) -> Result<sub_category::Model> {
    SubCategory::find_by_id(sub_category_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "SubCategory",
        })
}

/// Fetches a sub-category with its parent.
pub async fn get_sub_category(
    db: &DatabaseConnection,
    sub_category_id: i64,
) -> Result<SubCategoryView> {
    let (sub_category, category) = SubCategory::find_by_id(sub_category_id)
        .find_also_related(Category)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "SubCategory",
        })?;
    Ok(SubCategoryView {
        sub_category,
        category,
    })
}

/// Renames, re-parents or re-images a sub-category.
#[instrument(skip(db, input))]
pub async fn update_sub_category(
    db: &DatabaseConnection,
    sub_category_id: i64,
    input: UpdateSubCategoryInput,
) -> Result<sub_category::Model> {
    input.validate()?;
    let existing = find_sub_category(db, sub_category_id).await?;

    let mut model: sub_category::ActiveModel = existing.into();
    if let Some(category_id) = input.category_id {
        get_category(db, category_id).await?;
        model.category_id = Set(category_id);
    }
    if let Some(name) = input.name {
        let name = name.trim().to_string();
        ensure_name_available(db, &name, Some(sub_category_id)).await?;
        model.name = Set(name);
    }
    if let Some(image) = input.image {
        model.image = Set(Some(image));
    }
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Deletes a sub-category; products that used it keep their category.
#[instrument(skip(db))]
pub async fn delete_sub_category(db: &DatabaseConnection, sub_category_id: i64) -> Result<()> {
    find_sub_category(db, sub_category_id).await?;
    SubCategory::delete_by_id(sub_category_id).exec(db).await?;
    info!("Deleted sub-category {}", sub_category_id);
    Ok(())
}
