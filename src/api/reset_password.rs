//! `/reset-password` routes. The emailed link carries `email` and `pes` (the signed reset
//! token) as query parameters; the code comes in the body.

use super::{
    AppState, ApiResponse,
    extract::{Body, Params},
};
use crate::{
    core::reset_password::{
        self, NewPasswordInput, ResetEmailInput, ResetLinkQuery, VerifyCodeInput,
    },
    errors::Result,
};
use axum::{Router, extract::State, http::StatusCode, routing::post};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reset-password/send-email", post(send_email))
        .route("/reset-password/verify-code", post(verify_code))
        .route("/reset-password/reset", post(reset))
}

async fn send_email(
    State(state): State<AppState>,
    Body(input): Body<ResetEmailInput>,
) -> Result<ApiResponse<()>> {
    reset_password::request_reset(
        &state.db,
        &state.tokens,
        state.mailer.as_ref(),
        &state.config,
        input,
    )
    .await?;
    Ok(ApiResponse::message(
        StatusCode::OK,
        "Verification code sent to your email",
    ))
}

async fn verify_code(
    State(state): State<AppState>,
    Params(link): Params<ResetLinkQuery>,
    Body(input): Body<VerifyCodeInput>,
) -> Result<ApiResponse<()>> {
    reset_password::verify_code(&state.db, &state.tokens, &link, input).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Code verified"))
}

async fn reset(
    State(state): State<AppState>,
    Params(link): Params<ResetLinkQuery>,
    Body(input): Body<NewPasswordInput>,
) -> Result<ApiResponse<()>> {
    reset_password::reset_password(&state.db, &state.tokens, &link, input).await?;
    Ok(ApiResponse::message(
        StatusCode::OK,
        "Password reset successfully",
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::{
        api::testing::TestApp,
        core::auth,
        entities::User,
        errors::Result,
        test_utils::*,
    };
    use axum::http::{Method, StatusCode};
    use sea_orm::EntityTrait;
    use serde_json::json;

    #[tokio::test]
    async fn test_reset_flow_over_http() -> Result<()> {
        let app = TestApp::new().await?;
        let user = create_test_user(app.db(), "forgot@example.com").await?;

        let (status, _) = app
            .call(
                Method::POST,
                "/reset-password/send-email",
                None,
                Some(json!({ "email": "forgot@example.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let sent = app.mailer.sent();
        assert_eq!(sent.len(), 1);
        let html = &sent[0].html;
        let start = html.find("pes=").unwrap() + 4;
        let pes = &html[start..start + html[start..].find('"').unwrap()];
        let code = User::find_by_id(user.id)
            .one(app.db())
            .await?
            .unwrap()
            .verification_code
            .unwrap();
        let query = format!("?email=forgot@example.com&pes={pes}");

        let (status, body) = app
            .call(
                Method::POST,
                &format!("/reset-password/verify-code{query}"),
                None,
                Some(json!({ "code": "000000" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid verification code");

        let (status, _) = app
            .call(
                Method::POST,
                &format!("/reset-password/verify-code{query}"),
                None,
                Some(json!({ "code": code })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .call(
                Method::POST,
                &format!("/reset-password/reset{query}"),
                None,
                Some(json!({ "code": code, "password": "N3w$ecret" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let stored = User::find_by_id(user.id).one(app.db()).await?.unwrap();
        assert!(stored.verification_code.is_none());
        assert!(auth::verify_password(&stored.password_hash, "N3w$ecret")?);
        Ok(())
    }

    #[tokio::test]
    async fn test_emailed_link_works_for_plus_address() -> Result<()> {
        let app = TestApp::new().await?;
        let user = create_test_user(app.db(), "a+b@example.com").await?;

        let (status, _) = app
            .call(
                Method::POST,
                "/reset-password/send-email",
                None,
                Some(json!({ "email": "a+b@example.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let sent = app.mailer.sent();
        let html = &sent[0].html;
        let start = html.find("/reset-password/verify-code?").unwrap();
        let end = start + html[start..].find('"').unwrap();
        let path = &html[start..end];
        assert!(path.contains("email=a%2Bb%40example.com"));

        let code = User::find_by_id(user.id)
            .one(app.db())
            .await?
            .unwrap()
            .verification_code
            .unwrap();
        let (status, _) = app
            .call(Method::POST, path, None, Some(json!({ "code": code })))
            .await;
        assert_eq!(status, StatusCode::OK);

        let pes = &path[path.find("pes=").unwrap() + 4..];
        let (status, _) = app.call(Method::GET, "/users", Some(pes), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_link_parameters() -> Result<()> {
        let app = TestApp::new().await?;
        let (status, _) = app
            .call(
                Method::POST,
                "/reset-password/reset",
                None,
                Some(json!({ "code": "123456", "password": "N3w$ecret" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }
}
