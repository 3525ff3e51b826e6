//! Supplier business logic.

use crate::{
    entities::{Supplier, supplier},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue::NotSet, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};
use validator::Validate;

/// Body of `POST /supplier/create`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSupplierInput {
    /// Unique supplier name
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Supplier website URL
    #[validate(url)]
    pub website: String,
}

/// Body of `PUT /supplier/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSupplierInput {
    /// New name
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// New website URL
    #[validate(url)]
    pub website: Option<String>,
}

async fn ensure_name_available(
    db: &DatabaseConnection,
    name: &str,
    except: Option<i64>,
) -> Result<()> {
    let existing = Supplier::find()
        .filter(supplier::Column::Name.eq(name))
        .one(db)
        .await?;
    match existing {
        Some(other) if Some(other.id) != except => Err(Error::conflict(format!(
            "Supplier with name {name} already exists"
        ))),
        _ => Ok(()),
    }
}

/// Registers a supplier.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_supplier(
    db: &DatabaseConnection,
    input: CreateSupplierInput,
) -> Result<supplier::Model> {
    input.validate()?;
    let name = input.name.trim().to_string();
    ensure_name_available(db, &name, None).await?;

    let now = chrono::Utc::now();
    let created = supplier::ActiveModel {
        id: NotSet,
        name: Set(name),
        website: Set(input.website),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!("Created supplier {}", created.id);
    Ok(created)
}

/// Lists every supplier by name.
pub async fn list_suppliers(db: &DatabaseConnection) -> Result<Vec<supplier::Model>> {
    Supplier::find()
        .order_by_asc(supplier::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches one supplier.
pub async fn get_supplier(db: &DatabaseConnection, supplier_id: i64) -> Result<supplier::Model> {
    Supplier::find_by_id(supplier_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "Supplier" })
}

/// Renames a supplier or changes its website.
#[instrument(skip(db, input))]
pub async fn update_supplier(
    db: &DatabaseConnection,
    supplier_id: i64,
    input: UpdateSupplierInput,
) -> Result<supplier::Model> {
    input.validate()?;
    let mut model: supplier::ActiveModel = get_supplier(db, supplier_id).await?.into();
    if let Some(name) = input.name {
        let name = name.trim().to_string();
        ensure_name_available(db, &name, Some(supplier_id)).await?;
        model.name = Set(name);
    }
    if let Some(website) = input.website {
        model.website = Set(website);
    }
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Deletes a supplier.
#[instrument(skip(db))]
pub async fn delete_supplier(db: &DatabaseConnection, supplier_id: i64) -> Result<()> {
    get_supplier(db, supplier_id).await?;
    Supplier::delete_by_id(supplier_id).exec(db).await?;
    info!("Deleted supplier {}", supplier_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn input(name: &str, website: &str) -> CreateSupplierInput {
        CreateSupplierInput {
            name: name.to_string(),
            website: website.to_string(),
        }
    }

    #[tokio::test]
    async fn test_website_must_be_url() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_supplier(&db, input("Initech", "initech")).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_supplier_crud() -> Result<()> {
        let db = setup_test_db().await?;
        let initech = create_supplier(&db, input("Initech", "https://initech.example")).await?;
        assert!(matches!(
            create_supplier(&db, input("Initech", "https://other.example")).await,
            Err(Error::Conflict { .. })
        ));

        let updated = update_supplier(
            &db,
            initech.id,
            UpdateSupplierInput {
                website: Some("https://initech.example/wholesale".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.website, "https://initech.example/wholesale");
        assert_eq!(list_suppliers(&db).await?, vec![updated]);

        delete_supplier(&db, initech.id).await?;
        assert!(matches!(
            get_supplier(&db, initech.id).await,
            Err(Error::NotFound { entity: "Supplier" })
        ));
        Ok(())
    }
}
