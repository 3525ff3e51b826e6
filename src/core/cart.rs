//! Cart business logic.
//!
//! Each customer owns at most one cart. `total_price` is never recomputed from the
//! lines; it moves by signed deltas through [`update_cart_total_atomic`], which also
//! keeps an applied coupon's after-discount total in step.

use crate::{
    core::{coupon::find_coupon_by_name, pricing},
    entities::{Cart, CartItem, Coupon, Product, cart, cart_item, coupon, product},
    errors::{Error, Result},
};
use sea_orm::{
    ActiveValue::NotSet, ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};
use validator::Validate;

/// Body of `POST /cart/apply-coupon`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponInput {
    /// Name of the coupon to redeem
    #[validate(length(min = 1))]
    pub coupon_name: String,
}

/// A cart line with its product
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    /// The line itself
    #[serde(flatten)]
    pub item: cart_item::Model,
    /// Product on the line, if it still exists
    pub product: Option<product::Model>,
}

/// A cart with its lines
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// The cart row
    #[serde(flatten)]
    pub cart: cart::Model,
    /// Its lines
    pub cart_items: Vec<CartLineView>,
}

/// Fetches the cart owned by `user_id`.
pub async fn find_cart_for_user<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<cart::Model> {
    Cart::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "Cart" })
}

/// Adds `delta` to a cart's total with a single SQL update and re-derives the
/// after-discount total.
///
/// If a coupon is attached and has expired, or its discount no longer fits the new
/// total, the coupon is detached. Callers pass a transaction so the line write and the total move
/// together.
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `cart_id` - ID of the cart to update
/// * `delta` - Amount to add to the total (negative to subtract)
pub async fn update_cart_total_atomic<C>(db: &C, cart_id: i64, delta: f64) -> Result<cart::Model>
where
    C: ConnectionTrait,
{
    Cart::update_many()
        .col_expr(
            cart::Column::TotalPrice,
            Expr::col(cart::Column::TotalPrice).add(delta),
        )
        .col_expr(cart::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(cart::Column::Id.eq(cart_id))
        .exec(db)
        .await?;

    let cart = Cart::find_by_id(cart_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "Cart" })?;

    let Some(coupon_id) = cart.coupon_id else {
        return Ok(cart);
    };
    let now = chrono::Utc::now();
    let coupon = Coupon::find_by_id(coupon_id)
        .one(db)
        .await?
        .filter(|c| c.expire_date > now);

    let mut model: cart::ActiveModel = cart.clone().into();
    match coupon.map(|c| pricing::discounted_total(cart.total_price, c.discount)) {
        Some(Ok(after_discount)) => {
            model.total_price_after_discount = Set(Some(after_discount));
        }
        _ => {
            debug!("Detaching coupon {} from cart {}", coupon_id, cart_id);
            model.coupon_id = Set(None);
            model.total_price_after_discount = Set(None);
        }
    }
    model.update(db).await.map_err(Into::into)
}

/// Creates an empty cart for a customer.
///
/// # Errors
/// Returns [`Error::Conflict`] if the user already has a cart.
#[instrument(skip(db))]
pub async fn create_cart(db: &DatabaseConnection, user_id: i64) -> Result<cart::Model> {
    if Cart::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .is_some()
    {
        return Err(Error::conflict("You already have a cart"));
    }

    let now = chrono::Utc::now();
    let created = cart::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        total_price: Set(0.0),
        total_price_after_discount: Set(None),
        coupon_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!("Created cart {} for user {}", created.id, user_id);
    Ok(created)
}

async fn lines_by_cart(
    db: &DatabaseConnection,
    cart_ids: Vec<i64>,
) -> Result<HashMap<i64, Vec<CartLineView>>> {
    let rows = CartItem::find()
        .filter(cart_item::Column::CartId.is_in(cart_ids))
        .find_also_related(Product)
        .order_by_asc(cart_item::Column::Id)
        .all(db)
        .await?;

    let mut grouped: HashMap<i64, Vec<CartLineView>> = HashMap::new();
    for (item, product) in rows {
        grouped
            .entry(item.cart_id)
            .or_default()
            .push(CartLineView { item, product });
    }
    Ok(grouped)
}

/// Lists every cart with its lines and products.
pub async fn find_all_carts(db: &DatabaseConnection) -> Result<Vec<CartView>> {
    let carts = Cart::find().order_by_asc(cart::Column::Id).all(db).await?;
    let mut lines = lines_by_cart(db, carts.iter().map(|c| c.id).collect()).await?;
    Ok(carts
        .into_iter()
        .map(|cart| CartView {
            cart_items: lines.remove(&cart.id).unwrap_or_default(),
            cart,
        })
        .collect())
}

/// Returns the caller's cart with its lines and products.
pub async fn find_user_cart(db: &DatabaseConnection, user_id: i64) -> Result<CartView> {
    let cart = find_cart_for_user(db, user_id).await?;
    let mut lines = lines_by_cart(db, vec![cart.id]).await?;
    Ok(CartView {
        cart_items: lines.remove(&cart.id).unwrap_or_default(),
        cart,
    })
}

/// Applies a coupon by name to the caller's cart.
///
/// # Errors
/// Returns an error if:
/// - The coupon or the cart does not exist
/// - The coupon has expired
/// - The cart total is zero or not a number
/// - The discount exceeds the cart total
#[instrument(skip(db, input), fields(coupon = %input.coupon_name))]
pub async fn apply_coupon(
    db: &DatabaseConnection,
    user_id: i64,
    input: ApplyCouponInput,
) -> Result<cart::Model> {
    input.validate()?;
    let txn = db.begin().await?;

    let coupon: coupon::Model = find_coupon_by_name(&txn, &input.coupon_name).await?;
    if coupon.expire_date <= chrono::Utc::now() {
        return Err(Error::bad_request("Coupon is expired"));
    }

    let cart = find_cart_for_user(&txn, user_id).await?;
    let after_discount = pricing::discounted_total(cart.total_price, coupon.discount)?;

    let mut model: cart::ActiveModel = cart.into();
    model.total_price_after_discount = Set(Some(after_discount));
    model.coupon_id = Set(Some(coupon.id));
    model.updated_at = Set(chrono::Utc::now());
    let updated = model.update(&txn).await?;

    txn.commit().await?;
    info!("Applied coupon {} to cart {}", coupon.id, updated.id);
    Ok(updated)
}
