//! Back-office user management.

use crate::{
    core::{
        auth,
        paging::{Page, SortOrder, sort_by},
        user::{UpdateProfileInput, UserProfile, apply_profile_changes, ensure_email_available, find_user},
    },
    entities::{User, UserRole, user, user::Gender},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue::NotSet, Condition, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};
use validator::Validate;

/// Body of `POST /admins/create`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    /// Display name
    #[validate(length(min = 3, max = 30))]
    pub name: String,
    /// Login email, unique
    #[validate(email)]
    pub email: String,
    /// Initial password
    #[validate(custom(function = "auth::validate_password"))]
    pub password: String,
    /// Role to grant
    pub role: UserRole,
    /// Avatar URL
    #[validate(url)]
    pub avatar: Option<String>,
    /// Age in years
    #[validate(range(min = 0, max = 100))]
    pub age: Option<i32>,
    /// Contact number
    #[validate(length(min = 9, max = 10))]
    pub phone_number: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Account flag, active when omitted
    pub active: Option<bool>,
    /// Gender
    pub gender: Option<Gender>,
}

/// Body of `PUT /admins/{id}`: profile fields plus role and account flag
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserInput {
    /// Fields a user may also change on their own profile
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: UpdateProfileInput,
    /// New role
    pub role: Option<UserRole>,
    /// New account flag
    pub active: Option<bool>,
}

/// Query of `GET /admins/users`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    /// One-based page number
    pub page_number: Option<u64>,
    /// Rows per page
    pub user_per_page: Option<u64>,
    /// Case-insensitive substring of the name
    pub users_name: Option<String>,
    /// Sort direction on name
    pub users_order: Option<SortOrder>,
    /// Only users with this role
    pub role: Option<UserRole>,
}

/// Creates an account with an explicit role.
#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn create_user(db: &DatabaseConnection, input: CreateUserInput) -> Result<UserProfile> {
    input.validate()?;
    ensure_email_available(db, &input.email, None).await?;

    let now = chrono::Utc::now();
    let user = user::ActiveModel {
        id: NotSet,
        name: Set(input.name.trim().to_string()),
        email: Set(input.email),
        password_hash: Set(auth::hash_password(&input.password)?),
        role: Set(input.role),
        active: Set(input.active.unwrap_or(true)),
        verification_code: Set(None),
        avatar: Set(input.avatar),
        age: Set(input.age),
        phone_number: Set(input.phone_number),
        address: Set(input.address),
        gender: Set(input.gender),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!("Admin created user {} with role {:?}", user.id, user.role);
    Ok(user.into())
}

/// Lists users one page at a time, filtered by name substring and role, sorted by name.
pub async fn list_users(db: &DatabaseConnection, query: UserListQuery) -> Result<Vec<UserProfile>> {
    let page = Page::new(query.page_number, query.user_per_page);

    let mut condition = Condition::all();
    if let Some(name) = query.users_name.filter(|n| !n.trim().is_empty()) {
        condition = condition.add(user::Column::Name.contains(name.trim()));
    }
    if let Some(role) = query.role {
        condition = condition.add(user::Column::Role.eq(role));
    }

    let select = sort_by(User::find().filter(condition), user::Column::Name, query.users_order);
    let users = page.apply(select).all(db).await?;
    Ok(users.into_iter().map(Into::into).collect())
}

/// Returns any user's full profile.
pub async fn get_user(db: &DatabaseConnection, user_id: i64) -> Result<UserProfile> {
    find_user(db, user_id).await.map(Into::into)
}

/// Updates any user, including role and account flag.
#[instrument(skip(db, input))]
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    input: AdminUpdateUserInput,
) -> Result<UserProfile> {
    input.validate()?;
    let existing = find_user(db, user_id).await?;
    if let Some(email) = &input.profile.email {
        ensure_email_available(db, email, Some(existing.id)).await?;
    }

    let mut model: user::ActiveModel = existing.into();
    apply_profile_changes(&mut model, input.profile)?;
    if let Some(role) = input.role {
        model.role = Set(role);
    }
    if let Some(active) = input.active {
        model.active = Set(active);
    }
    model.updated_at = Set(chrono::Utc::now());
    Ok(model.update(db).await?.into())
}

/// Deletes any user.
#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    let result = User::delete_by_id(user_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound { entity: "User" });
    }
    info!("Admin deleted user {}", user_id);
    Ok(())
}
