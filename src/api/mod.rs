//! HTTP surface: shared state, the assembled router and one route module per resource.
//!
//! Handlers stay thin. They pull the caller and input out of the request, call into
//! [`crate::core`] and wrap the result in an [`ApiResponse`].

pub mod extract;
pub mod response;

mod admins;
mod auth;
mod cart;
mod catalog;
mod coupon;
mod product;
mod request_product;
mod reset_password;
mod review;
mod users;

pub use response::ApiResponse;

use crate::{config::AppConfig, core::auth::TokenService, mail::Mailer};
use axum::{Router, http::StatusCode, routing::get};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Everything a handler may need, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Token signer and verifier
    pub tokens: TokenService,
    /// Settings loaded at start-up
    pub config: Arc<AppConfig>,
    /// Outbound mail transport
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Bundles the shared handles.
    pub fn new(
        db: DatabaseConnection,
        tokens: TokenService,
        config: AppConfig,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            db,
            tokens,
            config: Arc::new(config),
            mailer,
        }
    }
}

async fn health() -> ApiResponse<()> {
    ApiResponse::message(StatusCode::OK, "OK")
}

/// Builds the application router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(users::routes())
        .merge(admins::routes())
        .merge(reset_password::routes())
        .merge(catalog::routes())
        .merge(product::routes())
        .merge(coupon::routes())
        .merge(cart::routes())
        .merge(review::routes())
        .merge(request_product::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for driving the router in tests.
    #![allow(clippy::unwrap_used)]

    use super::{AppState, router};
    use crate::{
        config::AppConfig,
        entities::user,
        errors::Result,
        test_utils::{RecordingMailer, setup_test_db, test_tokens},
    };
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use sea_orm::DatabaseConnection;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// A router over a fresh in-memory database.
    pub struct TestApp {
        pub state: AppState,
        pub mailer: Arc<RecordingMailer>,
    }

    impl TestApp {
        pub async fn new() -> Result<Self> {
            let db = setup_test_db().await?;
            let mailer = Arc::new(RecordingMailer::default());
            let state =
                AppState::new(db, test_tokens(), AppConfig::default(), Arc::clone(&mailer) as _);
            Ok(Self { state, mailer })
        }

        pub fn db(&self) -> &DatabaseConnection {
            &self.state.db
        }

        pub fn router(&self) -> Router {
            router(self.state.clone())
        }

        pub fn token_for(&self, user: &user::Model) -> String {
            self.state.tokens.issue_access(user).unwrap()
        }

        /// Sends one request and returns the status and decoded JSON body.
        pub async fn call(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(json) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::testing::TestApp;
    use crate::errors::Result;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let app = TestApp::new().await?;
        let (status, body) = app.call(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "OK");
        assert!(body.get("data").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() -> Result<()> {
        let app = TestApp::new().await?;
        let (status, _) = app.call(Method::GET, "/nowhere", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }
}
