//! Catalog reference data: categories, sub-categories, brands, suppliers and tax rates.
//!
//! Categories and sub-categories are readable by anyone. Supplier reads are open too.
//! Everything else here is admin-only.

use super::{
    AppState, ApiResponse,
    extract::{Administrator, Body, Guarded, Segments},
};
use crate::{
    core::{
        brand::{self, BrandInput},
        category::{self, CreateCategoryInput, UpdateCategoryInput},
        sub_category::{self, CreateSubCategoryInput, SubCategoryView, UpdateSubCategoryInput},
        supplier::{self, CreateSupplierInput, UpdateSupplierInput},
        tax::{self, CreateTaxInput, UpdateTaxInput},
    },
    entities::{
        brand as brand_entity, category as category_entity, sub_category as sub_category_entity,
        supplier as supplier_entity, tax as tax_entity,
    },
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
        .route("/category/create", post(create_category))
        .route("/category/categories", get(list_categories))
        .route(
            "/category/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/sub-category/create", post(create_sub_category))
        .route("/sub-category/sub-categories", get(list_sub_categories))
        .route(
            "/sub-category/{id}",
            get(get_sub_category)
                .put(update_sub_category)
                .delete(delete_sub_category),
        )
        .route("/brand/create", post(create_brand))
        .route("/brand/brands", get(list_brands))
        .route(
            "/brand/{id}",
            get(get_brand).put(update_brand).delete(delete_brand),
        )
        .route("/supplier/create", post(create_supplier))
        .route("/supplier/suppliers", get(list_suppliers))
        .route(
            "/supplier/{id}",
            get(get_supplier)
                .put(update_supplier)
                .delete(delete_supplier),
        )
        .route("/tax", post(create_tax).get(list_taxes))
        .route(
            "/tax/{id}",
            get(get_tax).put(update_tax).delete(delete_tax),
        )
}

// Categories

async fn create_category(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Body(input): Body<CreateCategoryInput>,
) -> Result<ApiResponse<category_entity::Model>> {
    let created = category::create_category(&state.db, input).await?;
    Ok(ApiResponse::created("Category created successfully", created))
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<category_entity::Model>>> {
    let all = category::list_categories(&state.db).await?;
    Ok(ApiResponse::ok("Categories found", all))
}

async fn get_category(
    State(state): State<AppState>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<category_entity::Model>> {
    let found = category::get_category(&state.db, id).await?;
    Ok(ApiResponse::ok("Category found", found))
}

async fn update_category(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
    Body(input): Body<UpdateCategoryInput>,
) -> Result<ApiResponse<category_entity::Model>> {
    let updated = category::update_category(&state.db, id, input).await?;
    Ok(ApiResponse::ok("Category updated successfully", updated))
}

async fn delete_category(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<()>> {
    category::delete_category(&state.db, id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Category deleted successfully"))
}

// Sub-categories

async fn create_sub_category(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Body(input): Body<CreateSubCategoryInput>,
) -> Result<ApiResponse<sub_category_entity::Model>> {
    let created = sub_category::create_sub_category(&state.db, input).await?;
    Ok(ApiResponse::created("SubCategory created successfully", created))
}

async fn list_sub_categories(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<SubCategoryView>>> {
    let all = sub_category::list_sub_categories(&state.db).await?;
    Ok(ApiResponse::ok("SubCategories found", all))
}

async fn get_sub_category(
    State(state): State<AppState>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<SubCategoryView>> {
    let found = sub_category::get_sub_category(&state.db, id).await?;
    Ok(ApiResponse::ok("SubCategory found", found))
}

async fn update_sub_category(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
    Body(input): Body<UpdateSubCategoryInput>,
) -> Result<ApiResponse<sub_category_entity::Model>> {
    let updated = sub_category::update_sub_category(&state.db, id, input).await?;
    Ok(ApiResponse::ok("SubCategory updated successfully", updated))
}

async fn delete_sub_category(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<()>> {
    sub_category::delete_sub_category(&state.db, id).await?;
    Ok(ApiResponse::message(
        StatusCode::OK,
        "SubCategory deleted successfully",
    ))
}

// Brands

async fn create_brand(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Body(input): Body<BrandInput>,
) -> Result<ApiResponse<brand_entity::Model>> {
    let created = brand::create_brand(&state.db, input).await?;
    Ok(ApiResponse::created("Brand created successfully", created))
}

async fn list_brands(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
) -> Result<ApiResponse<Vec<brand_entity::Model>>> {
    let all = brand::list_brands(&state.db).await?;
    Ok(ApiResponse::ok("Brands found", all))
}

async fn get_brand(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<brand_entity::Model>> {
    let found = brand::get_brand(&state.db, id).await?;
    Ok(ApiResponse::ok("Brand found", found))
}

async fn update_brand(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
    Body(input): Body<BrandInput>,
) -> Result<ApiResponse<brand_entity::Model>> {
    let updated = brand::update_brand(&state.db, id, input).await?;
    Ok(ApiResponse::ok("Brand updated successfully", updated))
}

async fn delete_brand(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<()>> {
    brand::delete_brand(&state.db, id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Brand deleted successfully"))
}

// Suppliers

async fn create_supplier(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Body(input): Body<CreateSupplierInput>,
) -> Result<ApiResponse<supplier_entity::Model>> {
    let created = supplier::create_supplier(&state.db, input).await?;
    Ok(ApiResponse::created("Supplier created successfully", created))
}

async fn list_suppliers(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<supplier_entity::Model>>> {
    let all = supplier::list_suppliers(&state.db).await?;
    Ok(ApiResponse::ok("Suppliers found", all))
}

async fn get_supplier(
    State(state): State<AppState>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<supplier_entity::Model>> {
    let found = supplier::get_supplier(&state.db, id).await?;
    Ok(ApiResponse::ok("Supplier found", found))
}

async fn update_supplier(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
    Body(input): Body<UpdateSupplierInput>,
) -> Result<ApiResponse<supplier_entity::Model>> {
    let updated = supplier::update_supplier(&state.db, id, input).await?;
    Ok(ApiResponse::ok("Supplier updated successfully", updated))
}

async fn delete_supplier(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<()>> {
    supplier::delete_supplier(&state.db, id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Supplier deleted successfully"))
}

// Tax rates

async fn create_tax(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Body(input): Body<CreateTaxInput>,
) -> Result<ApiResponse<tax_entity::Model>> {
    let created = tax::create_tax(&state.db, input).await?;
    Ok(ApiResponse::created("Tax created successfully", created))
}

async fn list_taxes(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
) -> Result<ApiResponse<Vec<tax_entity::Model>>> {
    let all = tax::list_taxes(&state.db).await?;
    Ok(ApiResponse::ok("Taxes found", all))
}

async fn get_tax(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<tax_entity::Model>> {
    let found = tax::get_tax(&state.db, id).await?;
    Ok(ApiResponse::ok("Tax found", found))
}

async fn update_tax(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
    Body(input): Body<UpdateTaxInput>,
) -> Result<ApiResponse<tax_entity::Model>> {
    let updated = tax::update_tax(&state.db, id, input).await?;
    Ok(ApiResponse::ok("Tax updated successfully", updated))
}

async fn delete_tax(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<()>> {
    tax::delete_tax(&state.db, id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Tax deleted successfully"))
}
