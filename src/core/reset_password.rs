//! Password reset by emailed code.
//!
//! 1. [`request_reset`] stores a six-digit code on the user row and emails it with a
//!    link carrying a short-lived token (`pes`).
//! 2. [`verify_code`] lets the front-end check the code before asking for a new password.
//! 3. [`reset_password`] repeats the checks, stores the new hash and clears the code.
//!
//! Both later steps require the token to verify and belong to the same user as the email.

use crate::{
    config::AppConfig,
    core::auth::{self, TokenPurpose, TokenService},
    entities::{User, user},
    errors::{Error, Result},
    mail::{self, Mailer},
};
use chrono::Duration;
use rand::Rng;
use sea_orm::{Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use validator::Validate;

/// Body of `POST /reset-password/send-email`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetEmailInput {
    /// Address of the account to reset
    #[validate(email)]
    pub email: String,
}

/// Body of `POST /reset-password/verify-code`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyCodeInput {
    /// Emailed six-digit code
    #[validate(length(equal = 6, message = "Verification code must be 6 digits"))]
    pub code: String,
}

/// Body of `POST /reset-password/reset`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPasswordInput {
    /// Emailed six-digit code
    #[validate(length(equal = 6, message = "Verification code must be 6 digits"))]
    pub code: String,
    /// Replacement password
    #[validate(custom(function = "auth::validate_password"))]
    pub password: String,
}

/// Query carried by the emailed link
#[derive(Debug, Clone, Deserialize)]
pub struct ResetLinkQuery {
    /// Account email
    pub email: String,
    /// Signed reset token
    pub pes: String,
}

/// Draws a code in `100000..=999999`.
#[must_use]
pub fn generate_verification_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "User" })
}

/// Starts a reset: stores a fresh code and emails it with the verification link.
///
/// # Errors
/// Returns an error if:
/// - The email is malformed or unknown
/// - The token cannot be signed
/// - The mailer fails
#[instrument(skip(db, tokens, mailer, config, input), fields(email = %input.email))]
pub async fn request_reset(
    db: &DatabaseConnection,
    tokens: &TokenService,
    mailer: &dyn Mailer,
    config: &AppConfig,
    input: ResetEmailInput,
) -> Result<()> {
    input.validate()?;
    let user = find_by_email(db, &input.email).await?;

    let code = generate_verification_code();
    let token = tokens.issue(
        &user,
        TokenPurpose::Reset,
        Duration::seconds(config.auth.reset_token_ttl_secs),
    )?;

    let mut model: user::ActiveModel = user.clone().into();
    model.verification_code = Set(Some(code.clone()));
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await?;

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("email", &user.email)
        .append_pair("pes", &token)
        .finish();
    let link = format!(
        "{}/reset-password/verify-code?{}",
        config.reset_password.link_base.trim_end_matches('/'),
        query
    );
    let email = mail::reset_password_email(&config.mail.from_address, &user.email, &link, &code);
    mailer.send(&email).await?;

    info!("Sent password reset code to user {}", user.id);
    Ok(())
}

/// Resolves the user behind a reset link and checks the submitted code.
async fn check_code(
    db: &DatabaseConnection,
    tokens: &TokenService,
    link: &ResetLinkQuery,
    code: &str,
) -> Result<user::Model> {
    let user = find_by_email(db, &link.email).await?;
    let invalid = || Error::bad_request("Invalid verification code");

    let claims = tokens.verify(&link.pes, TokenPurpose::Reset).map_err(|e| {
        warn!("Reset token rejected for user {}: {}", user.id, e);
        invalid()
    })?;
    if claims.id != user.id {
        return Err(invalid());
    }
    match user.verification_code.as_deref() {
        Some(stored) if stored == code => Ok(user),
        _ => Err(invalid()),
    }
}

/// Confirms that `input.code` matches the code emailed to `link.email`.
pub async fn verify_code(
    db: &DatabaseConnection,
    tokens: &TokenService,
    link: &ResetLinkQuery,
    input: VerifyCodeInput,
) -> Result<()> {
    input.validate()?;
    check_code(db, tokens, link, &input.code).await.map(|_| ())
}

/// Completes a reset: stores the new password hash and clears the code.
#[instrument(skip(db, tokens, link, input), fields(email = %link.email))]
pub async fn reset_password(
    db: &DatabaseConnection,
    tokens: &TokenService,
    link: &ResetLinkQuery,
    input: NewPasswordInput,
) -> Result<()> {
    input.validate()?;
    let user = check_code(db, tokens, link, &input.code).await?;

    let user_id = user.id;
    let mut model: user::ActiveModel = user.into();
    model.password_hash = Set(auth::hash_password(&input.password)?);
    model.verification_code = Set(None);
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await?;

    info!("Password reset for user {}", user_id);
    Ok(())
}
