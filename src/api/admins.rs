//! `/admins` routes: user management for administrators.

use super::{
    AppState, ApiResponse,
    extract::{Administrator, Body, Guarded, Params, Segments},
};
use crate::{
    core::{
        admin::{self, AdminUpdateUserInput, CreateUserInput, UserListQuery},
        user::UserProfile,
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
        .route("/admins/current", get(current))
        .route("/admins/create", post(create_user))
        .route("/admins/users", get(list_users))
        .route(
            "/admins/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn current(caller: Guarded<Administrator>) -> ApiResponse<UserProfile> {
    ApiResponse::ok("Admin found", caller.user.into())
}

async fn create_user(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Body(input): Body<CreateUserInput>,
) -> Result<ApiResponse<UserProfile>> {
    let user = admin::create_user(&state.db, input).await?;
    Ok(ApiResponse::created("User created successfully", user))
}

async fn list_users(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Params(query): Params<UserListQuery>,
) -> Result<ApiResponse<Vec<UserProfile>>> {
    let users = admin::list_users(&state.db, query).await?;
    Ok(ApiResponse::ok("Users found", users))
}

async fn get_user(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<UserProfile>> {
    let user = admin::get_user(&state.db, id).await?;
    Ok(ApiResponse::ok("User found", user))
}

async fn update_user(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
    Body(input): Body<AdminUpdateUserInput>,
) -> Result<ApiResponse<UserProfile>> {
    let user = admin::update_user(&state.db, id, input).await?;
    Ok(ApiResponse::ok("User updated successfully", user))
}

async fn delete_user(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<()>> {
    admin::delete_user(&state.db, id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "User deleted successfully"))
}
