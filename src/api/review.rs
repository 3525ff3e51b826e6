//! `/review` routes.

use super::{
    AppState, ApiResponse,
    extract::{Administrator, Body, Customer, Guarded, Segments},
};
use crate::{
    core::review::{self, CreateReviewInput, ProductReview, UpdateReviewInput},
    entities::review as review_entity,
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
        .route(
            "/review/product/{product_id}",
            get(product_reviews).post(create),
        )
        .route("/review/product/{product_id}/{id}", put(update))
        .route("/review/product/remove/{product_id}/{id}", delete(remove))
        .route("/review/product/singleUserReview/{user_id}", get(user_reviews))
}

async fn create(
    State(state): State<AppState>,
    caller: Guarded<Customer>,
    Segments(product_id): Segments<i64>,
    Body(input): Body<CreateReviewInput>,
) -> Result<ApiResponse<review_entity::Model>> {
    let created = review::create_review(&state.db, caller.user.id, product_id, input).await?;
    Ok(ApiResponse::created("Review created successfully", created))
}

async fn product_reviews(
    State(state): State<AppState>,
    Segments(product_id): Segments<i64>,
) -> Result<ApiResponse<Vec<ProductReview>>> {
    let reviews = review::list_product_reviews(&state.db, product_id).await?;
    Ok(ApiResponse::ok("Reviews found", reviews))
}

async fn user_reviews(
    State(state): State<AppState>,
    _caller: Guarded<Administrator>,
    Segments(user_id): Segments<i64>,
) -> Result<ApiResponse<Vec<review_entity::Model>>> {
    let reviews = review::list_user_reviews(&state.db, user_id).await?;
    Ok(ApiResponse::ok("Reviews found", reviews))
}

async fn update(
    State(state): State<AppState>,
    caller: Guarded<Customer>,
    Segments((product_id, id)): Segments<(i64, i64)>,
    Body(input): Body<UpdateReviewInput>,
) -> Result<ApiResponse<review_entity::Model>> {
    let updated = review::update_review(&state.db, caller.user.id, product_id, id, input).await?;
    Ok(ApiResponse::ok("Review updated successfully", updated))
}

async fn remove(
    State(state): State<AppState>,
    caller: Guarded<Customer>,
    Segments((product_id, id)): Segments<(i64, i64)>,
) -> Result<ApiResponse<()>> {
    review::delete_review(&state.db, caller.user.id, product_id, id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Review deleted successfully"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use crate::{
        api::testing::TestApp, core::product::find_product, errors::Result, test_utils::*,
    };
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_review_lifecycle() -> Result<()> {
        let app = TestApp::new().await?;
        let critic = create_named_user(app.db(), "Critic", "critic@example.com").await?;
        let admin = create_test_admin(app.db(), "mod@example.com").await?;
        let category = create_test_category(app.db(), "Films").await?;
        let film = create_test_product(app.db(), category.id, "Film", 9.0, None).await?;
        let token = app.token_for(&critic);
        let base = format!("/review/product/{}", film.id);

        let (status, body) = app
            .call(
                Method::POST,
                &base,
                Some(&token),
                Some(json!({ "reviewText": "Loved it", "rating": 4 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let review_id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = app
            .call(Method::POST, &base, Some(&token), Some(json!({ "rating": 2 })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "User has already reviewed this product");

        let (status, body) = app.call(Method::GET, &base, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["user"]["name"], "Critic");

        let (status, _) = app
            .call(
                Method::PUT,
                &format!("{base}/{review_id}"),
                Some(&token),
                Some(json!({ "rating": 2 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(find_product(app.db(), film.id).await?.ratings_average, 2.0);

        let admin_token = app.token_for(&admin);
        let (status, body) = app
            .call(
                Method::GET,
                &format!("/review/product/singleUserReview/{}", critic.id),
                Some(&admin_token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _) = app
            .call(
                Method::DELETE,
                &format!("/review/product/remove/{}/{review_id}", film.id),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let film = find_product(app.db(), film.id).await?;
        assert_eq!(film.ratings_quantity, 0);
        assert_eq!(film.ratings_average, 0.0);
        Ok(())
    }
}
