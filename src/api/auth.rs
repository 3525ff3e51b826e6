//! `/auth` routes.

use super::{AppState, ApiResponse, extract::Body};
use crate::{
    core::user::{self, AuthSession, LoginInput, RegisterInput},
    errors::Result,
};
use axum::{Router, extract::State, routing::post};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    Body(input): Body<RegisterInput>,
) -> Result<ApiResponse<AuthSession>> {
    let session = user::register(&state.db, &state.tokens, input).await?;
    Ok(ApiResponse::created("User registered successfully", session))
}

async fn login(
    State(state): State<AppState>,
    Body(input): Body<LoginInput>,
) -> Result<ApiResponse<AuthSession>> {
    let session = user::login(&state.db, &state.tokens, input).await?;
    Ok(ApiResponse::ok("Logged in successfully", session))
}
