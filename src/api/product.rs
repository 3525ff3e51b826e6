//! `/product` routes.

use super::{
    AppState, ApiResponse,
    extract::{Administrator, Body, Guarded, Params, Segments},
};
use crate::{
    core::product::{
        self, AdminProductQuery, CreateProductInput, ProductDetail, PublicProduct,
        PublicProductQuery, UpdateProductInput,
    },
    entities::product as product_entity,
    errors::Result,
};
use axum::{Router, extract::State, http::StatusCode, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/product", get(list_public).post(create))
        .route("/product/admin", get(list_admin))
        .route("/product/admin/{id}", get(get_admin))
        .route(
            "/product/{id}",
            get(get_public).put(update).delete(remove),
        )
}

async fn create(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Body(input): Body<CreateProductInput>,
) -> Result<ApiResponse<product_entity::Model>> {
    let created = product::create_product(&state.db, input).await?;
    Ok(ApiResponse::created("Product created successfully", created))
}

async fn list_admin(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Params(query): Params<AdminProductQuery>,
) -> Result<ApiResponse<Vec<ProductDetail>>> {
    let products = product::list_admin_products(&state.db, &query).await?;
    Ok(ApiResponse::ok("Products found", products))
}

async fn list_public(
    State(state): State<AppState>,
    Params(query): Params<PublicProductQuery>,
) -> Result<ApiResponse<Vec<PublicProduct>>> {
    let products = product::list_public_products(&state.db, &query).await?;
    Ok(ApiResponse::ok("Products found", products))
}

async fn get_admin(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<ProductDetail>> {
    let found = product::get_admin_product(&state.db, id).await?;
    Ok(ApiResponse::ok("Product found", found))
}

async fn get_public(
    State(state): State<AppState>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<PublicProduct>> {
    let found = product::get_public_product(&state.db, id).await?;
    Ok(ApiResponse::ok("Product found", found))
}

async fn update(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
    Body(input): Body<UpdateProductInput>,
) -> Result<ApiResponse<product_entity::Model>> {
    let updated = product::update_product(&state.db, id, input).await?;
    Ok(ApiResponse::ok("Product updated successfully", updated))
}

async fn remove(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<()>> {
    product::delete_product(&state.db, id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Product deleted successfully"))
}
