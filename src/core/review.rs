//! Review business logic.
//!
//! Each write to a review and the matching change to the product's rating aggregate
//! happen in one transaction. See [`crate::core::rating`] for the arithmetic.

use crate::{
    core::rating::RatingAggregate,
    entities::{Product, Review, User, product, review, user},
    errors::{Error, Result},
};
use sea_orm::{
    ActiveValue::NotSet, ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

/// Body of `POST /review/product/{productId}`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewInput {
    /// Review body
    #[validate(length(min = 1, max = 2000))]
    pub review_text: Option<String>,
    /// Rating from 0 to 5
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
}

/// Body of `PUT /review/product/{productId}/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewInput {
    /// New body
    #[validate(length(min = 1, max = 2000))]
    pub review_text: Option<String>,
    /// New rating
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
}

/// Reviewer shown next to a review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reviewer {
    /// User id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Avatar URL
    pub avatar: Option<String>,
}

/// A review as listed under a product
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReview {
    /// Review id
    pub id: i64,
    /// Review body
    pub review_text: Option<String>,
    /// Rating from 0 to 5
    pub rating: f64,
    /// Who wrote it
    pub user: Option<Reviewer>,
}

async fn find_product<C: ConnectionTrait>(db: &C, product_id: i64) -> Result<product::Model> {
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "Product" })
}

/// Loads the caller's review `review_id` of `product_id`.
async fn find_own_review<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    product_id: i64,
    review_id: i64,
) -> Result<review::Model> {
    Review::find_by_id(review_id)
        .filter(review::Column::UserId.eq(user_id))
        .filter(review::Column::ProductId.eq(product_id))
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "Review" })
}

async fn store_aggregate<C: ConnectionTrait>(
    db: &C,
    product: product::Model,
    aggregate: RatingAggregate,
) -> Result<product::Model> {
    let mut model: product::ActiveModel = product.into();
    model.ratings_average = Set(aggregate.average);
    model.ratings_quantity = Set(aggregate.count);
    model.update(db).await.map_err(Into::into)
}

/// Records the caller's review of a product and folds the rating into the product.
///
/// # Errors
/// Returns an error if:
/// - The rating is outside `0..=5`
/// - The user or product does not exist
/// - The user already reviewed this product
#[instrument(skip(db, input))]
pub async fn create_review(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    input: CreateReviewInput,
) -> Result<review::Model> {
    input.validate()?;
    let txn = db.begin().await?;

    User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound { entity: "User" })?;
    let product = find_product(&txn, product_id).await?;

    let existing = Review::find()
        .filter(review::Column::UserId.eq(user_id))
        .filter(review::Column::ProductId.eq(product_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::conflict("User has already reviewed this product"));
    }

    let now = chrono::Utc::now();
    let created = review::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        product_id: Set(product_id),
        review_text: Set(input.review_text),
        rating: Set(input.rating),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let aggregate = RatingAggregate::of(&product).with_added(created.rating);
    store_aggregate(&txn, product, aggregate).await?;
    txn.commit().await?;

    info!("User {} reviewed product {}", user_id, product_id);
    Ok(created)
}

/// Lists a product's reviews with each reviewer's name and avatar.
pub async fn list_product_reviews(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Vec<ProductReview>> {
    let rows = Review::find()
        .filter(review::Column::ProductId.eq(product_id))
        .find_also_related(User)
        .order_by_desc(review::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(review, user): (review::Model, Option<user::Model>)| ProductReview {
            id: review.id,
            review_text: review.review_text,
            rating: review.rating,
            user: user.map(|u| Reviewer {
                id: u.id,
                name: u.name,
                avatar: u.avatar,
            }),
        })
        .collect())
}

/// Lists every review written by one user.
pub async fn list_user_reviews(db: &DatabaseConnection, user_id: i64) -> Result<Vec<review::Model>> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "User" })?;
    Review::find()
        .filter(review::Column::UserId.eq(user_id))
        .order_by_desc(review::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Edits the caller's review; a changed rating replaces the old one in the aggregate.
#[instrument(skip(db, input))]
pub async fn update_review(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    review_id: i64,
    input: UpdateReviewInput,
) -> Result<review::Model> {
    input.validate()?;
    let txn = db.begin().await?;

    let existing = find_own_review(&txn, user_id, product_id, review_id).await?;
    let product = find_product(&txn, product_id).await?;
    let old_rating = existing.rating;

    let mut model: review::ActiveModel = existing.into();
    if let Some(text) = input.review_text {
        model.review_text = Set(Some(text));
    }
    if let Some(rating) = input.rating {
        model.rating = Set(rating);
    }
    model.updated_at = Set(chrono::Utc::now());
    let updated = model.update(&txn).await?;

    let before = RatingAggregate::of(&product);
    let after = before.with_replaced(old_rating, updated.rating);
    if after != before {
        store_aggregate(&txn, product, after).await?;
    }
    txn.commit().await?;

    Ok(updated)
}

/// Deletes the caller's review and takes its rating back out of the aggregate.
#[instrument(skip(db))]
pub async fn delete_review(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    review_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let existing = find_own_review(&txn, user_id, product_id, review_id).await?;
    let product = find_product(&txn, product_id).await?;

    Review::delete_by_id(existing.id).exec(&txn).await?;
    let aggregate = RatingAggregate::of(&product).with_removed(existing.rating);
    store_aggregate(&txn, product, aggregate).await?;
    txn.commit().await?;

    info!("User {} removed review {} of product {}", user_id, review_id, product_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn rated(rating: f64) -> CreateReviewInput {
        CreateReviewInput {
            review_text: Some("Solid".to_string()),
            rating,
        }
    }

    async fn aggregate(db: &DatabaseConnection, product_id: i64) -> Result<RatingAggregate> {
        Ok(RatingAggregate::of(&find_product(db, product_id).await?))
    }

    #[tokio::test]
    async fn test_rating_bounds() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(matches!(
            create_review(&db, 1, 1, rated(5.5)).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            create_review(&db, 1, 1, rated(-0.5)).await,
            Err(Error::Validation(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_updates_aggregate() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, "Books").await?;
        let book = create_test_product(&db, category.id, "Novel", 15.0, None).await?;
        let ann = create_test_user(&db, "r1@example.com").await?;
        let bob = create_test_user(&db, "r2@example.com").await?;
        let cy = create_test_user(&db, "r3@example.com").await?;

        create_review(&db, ann.id, book.id, rated(4.0)).await?;
        create_review(&db, bob.id, book.id, rated(4.0)).await?;
        create_review(&db, cy.id, book.id, rated(5.0)).await?;

        let agg = aggregate(&db, book.id).await?;
        assert_eq!(agg.count, 3);
        assert!((agg.average - 13.0 / 3.0).abs() < 1e-9);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_review_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, "Books").await?;
        let book = create_test_product(&db, category.id, "Novel", 15.0, None).await?;
        let user = create_test_user(&db, "dup@example.com").await?;

        create_review(&db, user.id, book.id, rated(3.0)).await?;
        assert!(matches!(
            create_review(&db, user.id, book.id, rated(1.0)).await,
            Err(Error::Conflict { .. })
        ));
        let agg = aggregate(&db, book.id).await?;
        assert_eq!(agg.count, 1);
        assert_eq!(agg.average, 3.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_for_missing_product() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "miss@example.com").await?;
        assert!(matches!(
            create_review(&db, user.id, 31337, rated(3.0)).await,
            Err(Error::NotFound { entity: "Product" })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_rating() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, "Games").await?;
        let game = create_test_product(&db, category.id, "Chess", 30.0, None).await?;
        let ann = create_test_user(&db, "u1@example.com").await?;
        let bob = create_test_user(&db, "u2@example.com").await?;

        let review = create_review(&db, ann.id, game.id, rated(2.0)).await?;
        create_review(&db, bob.id, game.id, rated(4.0)).await?;

        let updated = update_review(
            &db,
            ann.id,
            game.id,
            review.id,
            UpdateReviewInput {
                rating: Some(5.0),
                review_text: Some("Grew on me".to_string()),
            },
        )
        .await?;
        assert_eq!(updated.rating, 5.0);
        assert_eq!(updated.review_text.as_deref(), Some("Grew on me"));

        let agg = aggregate(&db, game.id).await?;
        assert_eq!(agg.count, 2);
        assert!((agg.average - 4.5).abs() < 1e-9);

        // Someone else's review is not found for this caller
        assert!(matches!(
            update_review(&db, bob.id, game.id, review.id, UpdateReviewInput::default()).await,
            Err(Error::NotFound { entity: "Review" })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_restores_aggregate() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, "Garden").await?;
        let hose = create_test_product(&db, category.id, "Hose", 25.0, None).await?;
        let ann = create_test_user(&db, "d1@example.com").await?;
        let bob = create_test_user(&db, "d2@example.com").await?;
        let cy = create_test_user(&db, "d3@example.com").await?;

        create_review(&db, ann.id, hose.id, rated(4.0)).await?;
        create_review(&db, bob.id, hose.id, rated(4.0)).await?;
        let before = aggregate(&db, hose.id).await?;

        let review = create_review(&db, cy.id, hose.id, rated(5.0)).await?;
        delete_review(&db, cy.id, hose.id, review.id).await?;

        let after = aggregate(&db, hose.id).await?;
        assert_eq!(after.count, before.count);
        assert!((after.average - before.average).abs() < 1e-9);
        Ok(())
    }

    #[tokio::test]
    async fn test_listings() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, "Music").await?;
        let drum = create_test_product(&db, category.id, "Drum", 80.0, None).await?;
        let flute = create_test_product(&db, category.id, "Flute", 60.0, None).await?;
        let ann = create_named_user(&db, "Ann", "l1@example.com").await?;

        create_review(&db, ann.id, drum.id, rated(3.5)).await?;
        create_review(&db, ann.id, flute.id, rated(4.5)).await?;

        let drum_reviews = list_product_reviews(&db, drum.id).await?;
        assert_eq!(drum_reviews.len(), 1);
        assert_eq!(drum_reviews[0].user.as_ref().unwrap().name, "Ann");
        let json = serde_json::to_value(&drum_reviews[0]).unwrap();
        assert!(json["user"].get("email").is_none());

        assert_eq!(list_user_reviews(&db, ann.id).await?.len(), 2);
        assert!(matches!(
            list_user_reviews(&db, 999).await,
            Err(Error::NotFound { entity: "User" })
        ));
        Ok(())
    }
}
