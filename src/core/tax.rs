//! Tax rate business logic.
//!
//! Request bodies accept `texName`/`texPrice` as aliases of `name`/`price`.

use crate::{
    entities::{Tax, tax},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue::NotSet, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};
use validator::Validate;

/// Body of `POST /tax`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaxInput {
    /// Unique tax name
    #[serde(alias = "texName")]
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Rate or fixed amount
    #[serde(alias = "texPrice")]
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
}

/// Body of `PUT /tax/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTaxInput {
    /// New name
    #[serde(alias = "texName")]
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// New rate
    #[serde(alias = "texPrice")]
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
}

async fn ensure_name_available(
    db: &DatabaseConnection,
    name: &str,
    except: Option<i64>,
) -> Result<()> {
    let existing = Tax::find()
        .filter(tax::Column::Name.eq(name))
        .one(db)
        .await?;
    match existing {
        Some(other) if Some(other.id) != except => Err(Error::conflict(format!(
            "Tax with name {name} already exists"
        ))),
        _ => Ok(()),
    }
}

/// Creates a tax rate.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_tax(db: &DatabaseConnection, input: CreateTaxInput) -> Result<tax::Model> {
    input.validate()?;
    let name = input.name.trim().to_string();
    ensure_name_available(db, &name, None).await?;

    let now = chrono::Utc::now();
    let created = tax::ActiveModel {
        id: NotSet,
        name: Set(name),
        price: Set(input.price),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!("Created tax {}", created.id);
    Ok(created)
}

/// Lists every tax rate by name.
pub async fn list_taxes(db: &DatabaseConnection) -> Result<Vec<tax::Model>> {
    Tax::find()
        .order_by_asc(tax::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches one tax rate.
pub async fn get_tax(db: &DatabaseConnection, tax_id: i64) -> Result<tax::Model> {
    Tax::find_by_id(tax_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "Tax" })
}

/// Renames a tax rate or changes its amount.
#[instrument(skip(db, input))]
pub async fn update_tax(
    db: &DatabaseConnection,
    tax_id: i64,
    input: UpdateTaxInput,
) -> Result<tax::Model> {
    input.validate()?;
    let mut model: tax::ActiveModel = get_tax(db, tax_id).await?.into();
    if let Some(name) = input.name {
        let name = name.trim().to_string();
        ensure_name_available(db, &name, Some(tax_id)).await?;
        model.name = Set(name);
    }
    if let Some(price) = input.price {
        model.price = Set(Some(price));
    }
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Deletes a tax rate.
#[instrument(skip(db))]
pub async fn delete_tax(db: &DatabaseConnection, tax_id: i64) -> Result<()> {
    get_tax(db, tax_id).await?;
    Tax::delete_by_id(tax_id).exec(db).await?;
    info!("Deleted tax {}", tax_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_legacy_field_names_accepted() {
        let input: CreateTaxInput =
            serde_json::from_str(r#"{"texName":"VAT","texPrice":20}"#).unwrap();
        assert_eq!(input.name, "VAT");
        assert_eq!(input.price, Some(20.0));
    }

    #[tokio::test]
    async fn test_negative_price_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_tax(
            &db,
            CreateTaxInput {
                name: "VAT".to_string(),
                price: Some(-1.0),
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_tax_crud() -> Result<()> {
        let db = setup_test_db().await?;
        let vat = create_tax(
            &db,
            CreateTaxInput {
                name: "VAT".to_string(),
                price: Some(20.0),
            },
        )
        .await?;
        create_tax(
            &db,
            CreateTaxInput {
                name: "Eco".to_string(),
                price: None,
            },
        )
        .await?;

        assert!(matches!(
            update_tax(
                &db,
                vat.id,
                UpdateTaxInput {
                    name: Some("Eco".to_string()),
                    ..Default::default()
                }
            )
            .await,
            Err(Error::Conflict { .. })
        ));

        let updated = update_tax(
            &db,
            vat.id,
            UpdateTaxInput {
                price: Some(19.6),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.price, Some(19.6));

        let names: Vec<_> = list_taxes(&db).await?.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Eco", "VAT"]);

        delete_tax(&db, vat.id).await?;
        assert!(matches!(
            get_tax(&db, vat.id).await,
            Err(Error::NotFound { entity: "Tax" })
        ));
        Ok(())
    }
}
