//! `/users` routes: the signed-in user's own account.

use super::{
    AppState, ApiResponse,
    extract::{Authenticated, Body, Guarded, Segments},
};
use crate::{
    core::user::{self, PublicProfile, UpdateProfileInput, UserProfile},
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, put},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(profile))
        .route("/users/update", put(update_profile))
        .route("/users/delete", delete(delete_account))
        .route("/users/{id}", get(public_profile))
}

async fn profile(
    State(state): State<AppState>,
    caller: Guarded<Authenticated>,
) -> Result<ApiResponse<UserProfile>> {
    let profile = user::get_profile(&state.db, caller.user.id).await?;
    Ok(ApiResponse::ok("User found", profile))
}

async fn public_profile(
    State(state): State<AppState>,
    _caller: Guarded<Authenticated>,
    Segments(id): Segments<i64>,
) -> Result<ApiResponse<PublicProfile>> {
    let profile = user::get_public_profile(&state.db, id).await?;
    Ok(ApiResponse::ok("User found", profile))
}

async fn update_profile(
    State(state): State<AppState>,
    caller: Guarded<Authenticated>,
    Body(input): Body<UpdateProfileInput>,
) -> Result<ApiResponse<UserProfile>> {
    let profile = user::update_profile(&state.db, caller.user.id, input).await?;
    Ok(ApiResponse::ok("User updated successfully", profile))
}

async fn delete_account(
    State(state): State<AppState>,
    caller: Guarded<Authenticated>,
) -> Result<ApiResponse<()>> {
    user::delete_account(&state.db, caller.user.id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "User deleted successfully"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::{api::testing::TestApp, errors::Result, test_utils::*};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_profile_requires_token() -> Result<()> {
        let app = TestApp::new().await?;
        let (status, body) = app.call(Method::GET, "/users", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid or expired token");

        let (status, _) = app.call(Method::GET, "/users", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_own_and_public_profile() -> Result<()> {
        let app = TestApp::new().await?;
        let me = create_named_user(app.db(), "Maya", "maya@example.com").await?;
        let other = create_named_user(app.db(), "Omar", "omar@example.com").await?;
        let token = app.token_for(&me);

        let (status, body) = app.call(Method::GET, "/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "maya@example.com");
        assert_eq!(body["data"]["role"], "User");

        let uri = format!("/users/{}", other.id);
        let (status, body) = app.call(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Omar");
        assert!(body["data"].get("email").is_none());

        let (status, _) = app.call(Method::GET, "/users/abc", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_account() -> Result<()> {
        let app = TestApp::new().await?;
        let me = create_test_user(app.db(), "self@example.com").await?;
        let token = app.token_for(&me);

        let (status, body) = app
            .call(
                Method::PUT,
                "/users/update",
                Some(&token),
                Some(json!({ "address": "1 Main St", "age": 31 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["address"], "1 Main St");
        assert_eq!(body["data"]["age"], 31);

        let (status, _) = app
            .call(Method::DELETE, "/users/delete", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.call(Method::GET, "/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        Ok(())
    }
}
