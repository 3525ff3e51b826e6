//! Requests from customers for products the shop does not stock yet.
//!
//! A request is visible to and editable by the customer who filed it and by any admin.

use crate::{
    core::user::PublicProfile,
    entities::{RequestProduct, User, UserRole, request_product, user},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue::NotSet, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

/// Body of `POST /request-product/create`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestInput {
    /// What the customer is looking for
    #[validate(length(min = 1, max = 200))]
    pub title_need: String,
    /// Free-form details
    #[validate(length(min = 1, max = 2000))]
    pub details: String,
    /// Units wanted
    #[serde(alias = "qantity")]
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Category hint
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
}

/// Body of `PUT /request-product/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestInput {
    /// New title
    #[validate(length(min = 1, max = 200))]
    pub title_need: Option<String>,
    /// New details
    #[validate(length(min = 1, max = 2000))]
    pub details: Option<String>,
    /// New unit count
    #[serde(alias = "qantity")]
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    /// New category hint
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
}

/// A request together with the customer who filed it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    /// The request row
    #[serde(flatten)]
    pub request: request_product::Model,
    /// Who filed it
    pub user: Option<PublicProfile>,
}

impl From<(request_product::Model, Option<user::Model>)> for RequestView {
    fn from((request, user): (request_product::Model, Option<user::Model>)) -> Self {
        Self {
            request,
            user: user.map(Into::into),
        }
    }
}

fn ensure_can_access(actor: &user::Model, request: &request_product::Model) -> Result<()> {
    if actor.role == UserRole::Admin || actor.id == request.user_id {
        Ok(())
    } else {
        Err(Error::forbidden("You are not allowed to access this request"))
    }
}

async fn find_request(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<(request_product::Model, Option<user::Model>)> {
    RequestProduct::find_by_id(request_id)
        .find_also_related(User)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "RequestProduct",
        })
}

/// Files a request on behalf of `actor`.
#[instrument(skip(db, actor, input), fields(user_id = actor.id))]
pub async fn create_request(
    db: &DatabaseConnection,
    actor: &user::Model,
    input: CreateRequestInput,
) -> Result<request_product::Model> {
    input.validate()?;
    let now = chrono::Utc::now();
    let created = request_product::ActiveModel {
        id: NotSet,
        user_id: Set(actor.id),
        title_need: Set(input.title_need),
        details: Set(input.details),
        quantity: Set(input.quantity),
        category: Set(input.category),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!("User {} filed product request {}", actor.id, created.id);
    Ok(created)
}

/// Lists every request with its requester, newest first.
pub async fn list_all_requests(db: &DatabaseConnection) -> Result<Vec<RequestView>> {
    let rows = RequestProduct::find()
        .find_also_related(User)
        .order_by_desc(request_product::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Lists the caller's own requests, newest first.
pub async fn list_own_requests(
    db: &DatabaseConnection,
    actor: &user::Model,
) -> Result<Vec<request_product::Model>> {
    RequestProduct::find()
        .filter(request_product::Column::UserId.eq(actor.id))
        .order_by_desc(request_product::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches one request for its owner or an admin.
pub async fn get_request(
    db: &DatabaseConnection,
    actor: &user::Model,
    request_id: i64,
) -> Result<RequestView> {
    let found = find_request(db, request_id).await?;
    ensure_can_access(actor, &found.0)?;
    Ok(found.into())
}

/// Edits a request. Owner or admin only.
#[instrument(skip(db, actor, input), fields(user_id = actor.id))]
pub async fn update_request(
    db: &DatabaseConnection,
    actor: &user::Model,
    request_id: i64,
    input: UpdateRequestInput,
) -> Result<request_product::Model> {
    input.validate()?;
    let (request, _) = find_request(db, request_id).await?;
    ensure_can_access(actor, &request)?;

    let mut model: request_product::ActiveModel = request.into();
    if let Some(title) = input.title_need {
        model.title_need = Set(title);
    }
    if let Some(details) = input.details {
        model.details = Set(details);
    }
    if let Some(quantity) = input.quantity {
        model.quantity = Set(quantity);
    }
    if let Some(category) = input.category {
        model.category = Set(Some(category));
    }
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Deletes a request. Owner or admin only.
#[instrument(skip(db, actor), fields(user_id = actor.id))]
pub async fn delete_request(
    db: &DatabaseConnection,
    actor: &user::Model,
    request_id: i64,
) -> Result<()> {
    let (request, _) = find_request(db, request_id).await?;
    ensure_can_access(actor, &request)?;
    RequestProduct::delete_by_id(request.id).exec(db).await?;
    info!("Deleted product request {}", request.id);
    Ok(())
}
