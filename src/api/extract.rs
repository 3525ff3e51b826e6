//! Request extractors.
//!
//! [`Guarded`] resolves the bearer token to a stored user and enforces a role policy.
//! [`Body`], [`Params`] and [`Segments`] wrap axum's JSON, query and path extractors so
//! malformed input is answered with the usual envelope and a 400.

use super::AppState;
use crate::{
    core::auth,
    entities::{UserRole, user},
    errors::Error,
};
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::debug;

/// Set of roles admitted to a route.
pub trait Policy: Send + Sync + 'static {
    /// Roles that pass
    const ROLES: &'static [UserRole];
}

/// Shoppers only
#[derive(Debug)]
pub struct Customer;

impl Policy for Customer {
    const ROLES: &'static [UserRole] = &[UserRole::User];
}

/// Administrators only
#[derive(Debug)]
pub struct Administrator;

impl Policy for Administrator {
    const ROLES: &'static [UserRole] = &[UserRole::Admin];
}

/// Any signed-in user
#[derive(Debug)]
pub struct Authenticated;

impl Policy for Authenticated {
    const ROLES: &'static [UserRole] = &[UserRole::User, UserRole::Admin];
}

/// The caller, admitted under policy `P`.
///
/// The role is read from the database on every request, so a demotion takes effect
/// before the token expires.
#[derive(Debug)]
pub struct Guarded<P> {
    /// The admitted caller, freshly read from the database
    pub user: user::Model,
    policy: PhantomData<P>,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("Bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

impl<P: Policy> FromRequestParts<AppState> for Guarded<P> {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            debug!(uri = %parts.uri, "Missing bearer token");
            Error::unauthorized("Invalid or expired token")
        })?;
        let user = auth::authorize(&state.db, &state.tokens, token, P::ROLES).await?;
        Ok(Self {
            user,
            policy: PhantomData,
        })
    }
}

/// JSON request body.
#[derive(Debug)]
pub struct Body<T>(pub T);

impl<T, S> FromRequest<S> for Body<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Error> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string parameters.
#[derive(Debug)]
pub struct Params<T>(pub T);

impl<T, S> FromRequestParts<S> for Params<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Error> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Path parameters.
#[derive(Debug)]
pub struct Segments<T>(pub T);

impl<T, S> FromRequestParts<S> for Segments<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Error> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}
