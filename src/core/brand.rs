//! Brand business logic.

use crate::{
    entities::{Brand, brand},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue::NotSet, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};
use validator::Validate;

/// Body of `POST /brand/create` and `PUT /brand/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BrandInput {
    /// Unique brand name
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// Logo URL
    #[validate(url)]
    pub image: Option<String>,
}

async fn ensure_name_available(
    db: &DatabaseConnection,
    name: &str,
    except: Option<i64>,
) -> Result<()> {
    let existing = Brand::find()
        .filter(brand::Column::Name.eq(name))
        .one(db)
        .await?;
    match existing {
        Some(other) if Some(other.id) != except => Err(Error::conflict(format!(
            "Brand with name {name} already exists"
        ))),
        _ => Ok(()),
    }
}

/// Creates a brand. The name is required on create.
#[instrument(skip(db, input))]
pub async fn create_brand(db: &DatabaseConnection, input: BrandInput) -> Result<brand::Model> {
    input.validate()?;
    let name = input
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::bad_request("Brand name is required"))?;
    ensure_name_available(db, &name, None).await?;

    let now = chrono::Utc::now();
    let created = brand::ActiveModel {
        id: NotSet,
        name: Set(name),
        image: Set(input.image),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!("Created brand {}", created.id);
    Ok(created)
}

/// Lists every brand by name.
pub async fn list_brands(db: &DatabaseConnection) -> Result<Vec<brand::Model>> {
    Brand::find()
        .order_by_asc(brand::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches one brand.
pub async fn get_brand(db: &DatabaseConnection, brand_id: i64) -> Result<brand::Model> {
    Brand::find_by_id(brand_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "Brand" })
}

/// Renames a brand or swaps its logo.
#[instrument(skip(db, input))]
pub async fn update_brand(
    db: &DatabaseConnection,
    brand_id: i64,
    input: BrandInput,
) -> Result<brand::Model> {
    input.validate()?;
    let mut model: brand::ActiveModel = get_brand(db, brand_id).await?.into();
    if let Some(name) = input.name {
        let name = name.trim().to_string();
        ensure_name_available(db, &name, Some(brand_id)).await?;
        model.name = Set(name);
    }
    if let Some(image) = input.image {
        model.image = Set(Some(image));
    }
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Deletes a brand; its products become unbranded.
#[instrument(skip(db))]
pub async fn delete_brand(db: &DatabaseConnection, brand_id: i64) -> Result<()> {
    get_brand(db, brand_id).await?;
    Brand::delete_by_id(brand_id).exec(db).await?;
    info!("Deleted brand {}", brand_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{entities::Product, test_utils::*};

    fn named(name: &str) -> BrandInput {
        BrandInput {
            name: Some(name.to_string()),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_name() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_brand(&db, BrandInput::default()).await;
        assert!(matches!(result, Err(Error::BadRequest { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_brand_crud_and_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        let acme = create_brand(&db, named("Acme")).await?;
        let globex = create_brand(&db, named("Globex")).await?;

        assert!(matches!(
            create_brand(&db, named("Acme")).await,
            Err(Error::Conflict { .. })
        ));
        assert!(matches!(
            update_brand(&db, globex.id, named("Acme")).await,
            Err(Error::Conflict { .. })
        ));

        let updated = update_brand(
            &db,
            acme.id,
            BrandInput {
                name: None,
                image: Some("https://cdn.example.com/acme.png".to_string()),
            },
        )
        .await?;
        assert_eq!(updated.name, "Acme");
        assert!(updated.image.is_some());

        assert_eq!(list_brands(&db).await?.len(), 2);
        delete_brand(&db, globex.id).await?;
        assert!(matches!(
            get_brand(&db, globex.id).await,
            Err(Error::NotFound { entity: "Brand" })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_brand_unlinks_products() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, "Tools").await?;
        let acme = create_brand(&db, named("Acme")).await?;
        let anvil = create_test_product(&db, category.id, "Anvil", 99.0, None).await?;

        let mut model: crate::entities::product::ActiveModel = anvil.clone().into();
        model.brand_id = Set(Some(acme.id));
        model.update(&db).await?;

        delete_brand(&db, acme.id).await?;
        let anvil = Product::find_by_id(anvil.id).one(&db).await?.unwrap();
        assert_eq!(anvil.brand_id, None);
        Ok(())
    }
}
