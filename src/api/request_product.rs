//! `/request-product` routes.

use super::{
    AppState, ApiResponse,
    extract::{Administrator, Authenticated, Body, Guarded, Segments},
};
use crate::{
    core::request_product::{self, CreateRequestInput, RequestView, UpdateRequestInput},
    entities::request_product as request_entity,
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
        .route("/request-product/create", post(create))
        .route("/request-product/admin-requests", get(all_requests))
        .route("/request-product/requests-products", get(own_requests))
        .route(
            "/request-product/{id}",
            get(find).put(update).delete(remove),
        )
}

async fn create(
    State(state): State<AppState>,
    caller: Guarded<Authenticated>,
    Body(input): Body<CreateRequestInput>,
) -> Result<ApiResponse<request_entity::Model>> {
    let created = request_product::create_request(&state.db, &caller.user, input).await?;
    Ok(ApiResponse::created("Request created successfully", created))
}

async fn all_requests(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
) -> Result<ApiResponse<Vec<RequestView>>> {
    let all = request_product::list_all_requests(&state.db).await?;
    Ok(ApiResponse::ok("Requests found", all))
}

async fn own_requests(
    State(state): State<AppState>,
    caller: Guarded<Authenticated>,
) -> Result<ApiResponse<Vec<request_entity::Model>>> {
    let own = request_product::list_own_requests(&state.db, &caller.user).await?;
    Ok(ApiResponse::ok("Requests found", own))
}

async fn find(
    State(state): State<AppState>,
    caller: Guarded<Authenticated>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<RequestView>> {
    let found = request_product::get_request(&state.db, &caller.user, id).await?;
    Ok(ApiResponse::ok("Request found", found))
}

async fn update(
    State(state): State<AppState>,
    caller: Guarded<Authenticated>,
    Segments(id): Segments<i64>,
    Body(input): Body<UpdateRequestInput>,
) -> Result<ApiResponse<request_entity::Model>> {
    let updated = request_product::update_request(&state.db, &caller.user, id, input).await?;
    Ok(ApiResponse::ok("Request updated successfully", updated))
}

async fn remove(
    State(state): State<AppState>,
    caller: Guarded<Authenticated>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<()>> {
    request_product::delete_request(&state.db, &caller.user, id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Request deleted successfully"))
}
