//! `/coupon` routes, all admin-only.

use super::{
    AppState, ApiResponse,
    extract::{Administrator, Body, Guarded, Segments},
};
use crate::{
    core::coupon::{self, CreateCouponInput, UpdateCouponInput},
    entities::coupon as coupon_entity,
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/coupon/create", post(create))
        .route("/coupon/coupons", get(list))
        .route("/coupon/{id}", get(find).put(update).delete(remove))
}

async fn create(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Body(input): Body<CreateCouponInput>,
) -> Result<ApiResponse<coupon_entity::Model>> {
    let created = coupon::create_coupon(&state.db, input).await?;
    Ok(ApiResponse::created("Coupon created successfully", created))
}

async fn list(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
) -> Result<ApiResponse<Vec<coupon_entity::Model>>> {
    let all = coupon::list_coupons(&state.db).await?;
    Ok(ApiResponse::ok("Coupons found", all))
}

async fn find(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<coupon_entity::Model>> {
    let found = coupon::get_coupon(&state.db, id).await?;
    Ok(ApiResponse::ok("Coupon found", found))
}

async fn update(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
    Body(input): Body<UpdateCouponInput>,
) -> Result<ApiResponse<coupon_entity::Model>> {
    let updated = coupon::update_coupon(&state.db, id, input).await?;
    Ok(ApiResponse::ok("Coupon updated successfully", updated))
}

async fn remove(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<()>> {
    coupon::delete_coupon(&state.db, id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Coupon deleted successfully"))
}
