//! Cart line business logic.
//!
//! Every line write runs in one database transaction with the matching cart total
//! delta, so a failure part-way leaves neither the line nor the total changed.

use crate::{
    core::{
        cart::{find_cart_for_user, update_cart_total_atomic},
        pricing,
    },
    entities::{CartItem, Product, User, cart_item, product},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue::NotSet, ConnectionTrait, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

/// Body of `POST /cart-item/create/{productId}`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddCartItemInput {
    /// Units to add
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Chosen colour
    #[validate(length(min = 1, max = 50))]
    pub color: Option<String>,
}

/// Body of `PUT /cart-item/update/{cartItemId}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCartItemInput {
    /// New unit count
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    /// New colour
    #[validate(length(min = 1, max = 50))]
    pub color: Option<String>,
}

/// A cart line with its product
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    /// The line
    #[serde(flatten)]
    pub item: cart_item::Model,
    /// Product on the line
    pub product: product::Model,
}

async fn find_product<C: ConnectionTrait>(db: &C, product_id: i64) -> Result<product::Model> {
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "Product" })
}

/// Loads a line and checks that it sits in `user_id`'s cart.
async fn find_owned_item<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    cart_item_id: i64,
) -> Result<cart_item::Model> {
    let cart = find_cart_for_user(db, user_id).await?;
    let item = CartItem::find_by_id(cart_item_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "CartItem" })?;
    if item.user_id != user_id || item.cart_id != cart.id {
        return Err(Error::forbidden(
            "You are not allowed to modify this cart item",
        ));
    }
    Ok(item)
}

/// Puts `quantity` units of a product in the caller's cart.
///
/// # Errors
/// Returns an error if:
/// - The user, their cart or the product does not exist
/// - The product is already in the cart
#[instrument(skip(db, input))]
pub async fn add_item(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    input: AddCartItemInput,
) -> Result<CartItemView> {
    input.validate()?;
    let txn = db.begin().await?;

    User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound { entity: "User" })?;
    let cart = find_cart_for_user(&txn, user_id).await?;
    let product = find_product(&txn, product_id).await?;

    let existing = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::conflict("Product already in cart"));
    }

    let now = chrono::Utc::now();
    let item = cart_item::ActiveModel {
        id: NotSet,
        cart_id: Set(cart.id),
        product_id: Set(product_id),
        user_id: Set(user_id),
        quantity: Set(input.quantity),
        color: Set(input.color),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    update_cart_total_atomic(&txn, cart.id, pricing::line_total(&product, item.quantity)).await?;
    txn.commit().await?;

    info!("Added product {} x{} to cart {}", product_id, item.quantity, cart.id);
    Ok(CartItemView { item, product })
}

/// Changes a line's quantity or colour and moves the cart total by the difference.
///
/// # Errors
/// Returns an error if:
/// - The caller has no cart or the line does not exist
/// - The line belongs to another user
#[instrument(skip(db, input))]
pub async fn update_item(
    db: &DatabaseConnection,
    user_id: i64,
    cart_item_id: i64,
    input: UpdateCartItemInput,
) -> Result<CartItemView> {
    input.validate()?;
    let txn = db.begin().await?;

    let item = find_owned_item(&txn, user_id, cart_item_id).await?;
    let product = find_product(&txn, item.product_id).await?;
    let old_quantity = item.quantity;
    let cart_id = item.cart_id;

    let mut model: cart_item::ActiveModel = item.into();
    if let Some(quantity) = input.quantity {
        model.quantity = Set(quantity);
    }
    if let Some(color) = input.color {
        model.color = Set(Some(color));
    }
    model.updated_at = Set(chrono::Utc::now());
    let item = model.update(&txn).await?;

    let delta = pricing::quantity_delta(&product, old_quantity, item.quantity);
    if delta.abs() > f64::EPSILON {
        update_cart_total_atomic(&txn, cart_id, delta).await?;
    }
    txn.commit().await?;

    Ok(CartItemView { item, product })
}

/// Removes a line and subtracts its value from the cart total.
#[instrument(skip(db))]
pub async fn remove_item(db: &DatabaseConnection, user_id: i64, cart_item_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let item = find_owned_item(&txn, user_id, cart_item_id).await?;
    let product = find_product(&txn, item.product_id).await?;

    CartItem::delete_by_id(item.id).exec(&txn).await?;
    update_cart_total_atomic(&txn, item.cart_id, -pricing::line_total(&product, item.quantity))
        .await?;
    txn.commit().await?;

    info!("Removed cart item {} from cart {}", item.id, item.cart_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{core::cart::find_user_cart, test_utils::*};

    fn add(quantity: i32) -> AddCartItemInput {
        AddCartItemInput {
            quantity,
            color: None,
        }
    }

    async fn cart_total(db: &DatabaseConnection, user_id: i64) -> Result<f64> {
        Ok(find_cart_for_user(db, user_id).await?.total_price)
    }

    #[tokio::test]
    async fn test_add_item_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let result = add_item(&db, 1, 1, add(0)).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_uses_unit_price() -> Result<()> {
        let db = setup_test_db().await?;
        let (user, _, category) = setup_shopper(&db, "yara@example.com").await?;
        let lamp = create_test_product(&db, category.id, "Lamp", 40.0, Some(30.0)).await?;
        let bulb = create_test_product(&db, category.id, "Bulb", 5.0, Some(0.0)).await?;

        let view = add_item(&db, user.id, lamp.id, add(2)).await?;
        assert_eq!(view.item.quantity, 2);
        assert_eq!(view.product.id, lamp.id);
        assert_eq!(cart_total(&db, user.id).await?, 60.0);

        add_item(&db, user.id, bulb.id, add(3)).await?;
        assert_eq!(cart_total(&db, user.id).await?, 75.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_rejections() -> Result<()> {
        let db = setup_test_db().await?;
        let (user, _, category) = setup_shopper(&db, "zoe@example.com").await?;
        let no_cart = create_test_user(&db, "nocart@example.com").await?;
        let lamp = create_test_product(&db, category.id, "Lamp", 40.0, None).await?;

        assert!(matches!(
            add_item(&db, user.id, 999, add(1)).await,
            Err(Error::NotFound { entity: "Product" })
        ));
        assert!(matches!(
            add_item(&db, no_cart.id, lamp.id, add(1)).await,
            Err(Error::NotFound { entity: "Cart" })
        ));
        assert!(matches!(
            add_item(&db, 4242, lamp.id, add(1)).await,
            Err(Error::NotFound { entity: "User" })
        ));

        add_item(&db, user.id, lamp.id, add(1)).await?;
        assert!(matches!(
            add_item(&db, user.id, lamp.id, add(1)).await,
            Err(Error::Conflict { .. })
        ));
        assert_eq!(cart_total(&db, user.id).await?, 40.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_item_applies_delta() -> Result<()> {
        let db = setup_test_db().await?;
        let (user, _, category) = setup_shopper(&db, "abe@example.com").await?;
        let lamp = create_test_product(&db, category.id, "Lamp", 12.5, None).await?;
        let line = add_item(&db, user.id, lamp.id, add(2)).await?;

        let updated = update_item(
            &db,
            user.id,
            line.item.id,
            UpdateCartItemInput {
                quantity: Some(5),
                color: Some("red".to_string()),
            },
        )
        .await?;
        assert_eq!(updated.item.quantity, 5);
        assert_eq!(updated.item.color.as_deref(), Some("red"));
        assert_eq!(cart_total(&db, user.id).await?, 62.5);

        update_item(
            &db,
            user.id,
            line.item.id,
            UpdateCartItemInput {
                quantity: Some(1),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(cart_total(&db, user.id).await?, 12.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_other_users_line_is_forbidden() -> Result<()> {
        let db = setup_test_db().await?;
        let (owner, _, category) = setup_shopper(&db, "own@example.com").await?;
        let (intruder, _, _) = setup_shopper(&db, "intr@example.com").await?;
        let lamp = create_test_product(&db, category.id, "Lamp", 10.0, None).await?;
        let line = add_item(&db, owner.id, lamp.id, add(1)).await?;

        assert!(matches!(
            update_item(&db, intruder.id, line.item.id, UpdateCartItemInput::default()).await,
            Err(Error::Forbidden { .. })
        ));
        assert!(matches!(
            remove_item(&db, intruder.id, line.item.id).await,
            Err(Error::Forbidden { .. })
        ));
        assert!(matches!(
            remove_item(&db, owner.id, 777).await,
            Err(Error::NotFound { entity: "CartItem" })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_then_remove_restores_total() -> Result<()> {
        let db = setup_test_db().await?;
        let (user, _, category) = setup_shopper(&db, "bea@example.com").await?;
        let lamp = create_test_product(&db, category.id, "Lamp", 19.99, None).await?;
        let mug = create_test_product(&db, category.id, "Mug", 7.25, Some(6.5)).await?;

        add_item(&db, user.id, lamp.id, add(1)).await?;
        let before = cart_total(&db, user.id).await?;

        let line = add_item(&db, user.id, mug.id, add(4)).await?;
        assert!((cart_total(&db, user.id).await? - (before + 26.0)).abs() < 1e-9);

        remove_item(&db, user.id, line.item.id).await?;
        assert!((cart_total(&db, user.id).await? - before).abs() < 1e-9);
        assert_eq!(find_user_cart(&db, user.id).await?.cart_items.len(), 1);
        Ok(())
    }
}
