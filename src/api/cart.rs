//! `/cart` and `/cart-item` routes.

use super::{
    AppState, ApiResponse,
    extract::{Administrator, Authenticated, Body, Customer, Guarded, Segments},
};
use crate::{
    core::{
        cart::{self, ApplyCouponInput, CartView},
        cart_item::{self, AddCartItemInput, CartItemView, UpdateCartItemInput},
    },
    entities::cart as cart_entity,
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(all_carts))
        .route("/cart/create", post(create_cart))
        .route("/cart/user-cart", get(own_cart))
        .route("/cart/apply-coupon", post(apply_coupon))
        .route("/cart-item/create/{product_id}", post(add_item))
        .route("/cart-item/update/{cart_item_id}", put(update_item))
        .route("/cart-item/delete/{cart_item_id}", delete(remove_item))
}

async fn create_cart(
    State(state): State<AppState>,
    caller: Guarded<Customer>,
) -> Result<ApiResponse<cart_entity::Model>> {
    let created = cart::create_cart(&state.db, caller.user.id).await?;
    Ok(ApiResponse::created("Cart created successfully", created))
}

async fn all_carts(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
) -> Result<ApiResponse<Vec<CartView>>> {
    let carts = cart::find_all_carts(&state.db).await?;
    Ok(ApiResponse::ok("Carts found", carts))
}

async fn own_cart(
    State(state): State<AppState>,
    caller: Guarded<Authenticated>,
) -> Result<ApiResponse<CartView>> {
    let found = cart::find_user_cart(&state.db, caller.user.id).await?;
    Ok(ApiResponse::ok("Cart found", found))
}

async fn apply_coupon(
    State(state): State<AppState>,
    caller: Guarded<Customer>,
    Body(input): Body<ApplyCouponInput>,
) -> Result<ApiResponse<cart_entity::Model>> {
    let updated = cart::apply_coupon(&state.db, caller.user.id, input).await?;
    Ok(ApiResponse::ok("Coupon applied successfully", updated))
}

async fn add_item(
    State(state): State<AppState>,
    caller: Guarded<Customer>,
    Segments(product_id): Segments<i64>,
    Body(input): Body<AddCartItemInput>,
) -> Result<ApiResponse<CartItemView>> {
    let line = cart_item::add_item(&state.db, caller.user.id, product_id, input).await?;
    Ok(ApiResponse::created("Product added to cart", line))
}

async fn update_item(
    State(state): State<AppState>,
    caller: Guarded<Customer>,
    Segments(cart_item_id): Segments<i64>,
    Body(input): Body<UpdateCartItemInput>,
) -> Result<ApiResponse<CartItemView>> {
    let line = cart_item::update_item(&state.db, caller.user.id, cart_item_id, input).await?;
    Ok(ApiResponse::ok("Cart item updated successfully", line))
}

async fn remove_item(
    State(state): State<AppState>,
    caller: Guarded<Customer>,
    Segments(cart_item_id): Segments<i64>,
) -> Result<ApiResponse<()>> {
    cart_item::remove_item(&state.db, caller.user.id, cart_item_id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Cart item deleted successfully"))
}
