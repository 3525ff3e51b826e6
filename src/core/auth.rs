//! Identity primitives: signed access tokens, password hashing and role checks.
//!
//! Tokens are HS256 JWTs carrying `{id, email, role, active, typ, iat, exp}`. `typ`
//! separates sign-in tokens from password reset tokens, and each is only accepted where
//! its own kind is expected. The role in a token is informational only: [`authorize`]
//! re-reads the user row and checks the stored role, so a demoted or deleted account loses
//! access immediately.

use crate::{
    entities::{User, UserRole, user},
    errors::{Error, Result},
};
use argon2::{
    Algorithm as ArgonAlgorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use rand::rngs::OsRng;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use validator::ValidationError;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    /// Bearer token for API calls
    Access,
    /// `pes` token carried by a password reset link
    Reset,
}

/// Claims embedded in every issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub id: i64,
    /// User email at issue time
    pub email: String,
    /// User role at issue time
    pub role: UserRole,
    /// Account flag at issue time
    pub active: bool,
    /// Token kind
    pub typ: TokenPurpose,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

impl Claims {
    /// Builds `purpose` claims for `user` expiring `ttl` from now.
    #[must_use]
    pub fn for_user(user: &user::Model, purpose: TokenPurpose, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            active: user.active,
            typ: purpose,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Signs and verifies tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    access_ttl: Duration,
}

impl TokenService {
    /// Creates a service from the signing secret and the access token lifetime.
    #[must_use]
    pub fn new(secret: &str, access_ttl_secs: i64) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            access_ttl: Duration::seconds(access_ttl_secs),
        }
    }

    /// Issues a login/register token for `user`.
    pub fn issue_access(&self, user: &user::Model) -> Result<String> {
        self.issue(user, TokenPurpose::Access, self.access_ttl)
    }

    /// Issues a `purpose` token with an explicit lifetime. A negative `ttl` yields an
    /// already expired token.
    pub fn issue(
        &self,
        user: &user::Model,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<String> {
        let claims = Claims::for_user(user, purpose, ttl);
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Checks signature, expiry and kind, and returns the claims.
    pub fn verify(&self, token: &str, purpose: TokenPurpose) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)?.claims;
        if claims.typ != purpose {
            return Err(Error::Token(ErrorKind::InvalidToken.into()));
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .finish_non_exhaustive()
    }
}

fn argon() -> Result<Argon2<'static>> {
    let params = Params::new(19456, 2, 1, None)?;
    Ok(Argon2::new(ArgonAlgorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password into an Argon2id PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon()?
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Checks `password` against a stored PHC string.
pub fn verify_password(phc: &str, password: &str) -> Result<bool> {
    let parsed = PasswordHash::new(phc)?;
    Ok(argon()?
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Password policy: 8 to 20 characters with at least one lowercase letter, one uppercase
/// letter, one digit and one symbol.
pub fn validate_password(value: &str) -> std::result::Result<(), ValidationError> {
    let len = value.chars().count();
    let strong = (8..=20).contains(&len)
        && value.chars().any(char::is_lowercase)
        && value.chars().any(char::is_uppercase)
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace());
    if strong {
        Ok(())
    } else {
        let mut err = ValidationError::new("weak_password");
        err.message = Some(
            "Password must be 8-20 characters with upper and lower case letters, a number and a symbol"
                .into(),
        );
        Err(err)
    }
}

/// Resolves the caller behind `token` and admits them only if their stored role is in
/// `allowed`.
///
/// Every failure (bad signature, expiry, unknown user, role mismatch) is reported as
/// [`Error::Unauthorized`].
pub async fn authorize(
    db: &DatabaseConnection,
    tokens: &TokenService,
    token: &str,
    allowed: &[UserRole],
) -> Result<user::Model> {
    let claims = tokens.verify(token, TokenPurpose::Access).map_err(|e| {
        debug!("Rejected token: {}", e);
        Error::unauthorized("Invalid or expired token")
    })?;

    let user = User::find_by_id(claims.id)
        .one(db)
        .await?
        .ok_or_else(|| Error::unauthorized("Invalid or expired token"))?;

    if !allowed.contains(&user.role) {
        return Err(Error::unauthorized("Access denied"));
    }

    Ok(user)
}
