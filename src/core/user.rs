//! Registration, login and self-service profile management.

use crate::{
    core::auth::{self, TokenService},
    entities::{User, UserRole, user, user::Gender},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue::NotSet, ConnectionTrait, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

/// Body of `POST /auth/register`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    /// Display name
    #[validate(length(min = 3, max = 30))]
    pub name: String,
    /// Login email
    #[validate(email)]
    pub email: String,
    /// Plain-text password, hashed before storage
    #[validate(custom(function = "auth::validate_password"))]
    pub password: String,
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    /// Login email
    #[validate(email)]
    pub email: String,
    /// Plain-text password
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Profile fields a user may change on their own account
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    /// New display name
    #[validate(length(min = 3, max = 30))]
    pub name: Option<String>,
    /// New email, must stay unique
    #[validate(email)]
    pub email: Option<String>,
    /// New password, re-hashed
    #[validate(custom(function = "auth::validate_password"))]
    pub password: Option<String>,
    /// New avatar URL
    #[validate(url)]
    pub avatar: Option<String>,
    /// New age
    #[validate(range(min = 0, max = 100))]
    pub age: Option<i32>,
    /// New contact number
    #[validate(length(min = 9, max = 10))]
    pub phone_number: Option<String>,
    /// New postal address
    pub address: Option<String>,
    /// New gender
    pub gender: Option<Gender>,
}

/// A user's own view of their account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Role
    pub role: UserRole,
    /// Avatar URL
    pub avatar: Option<String>,
    /// Age in years
    pub age: Option<i32>,
    /// Contact number
    pub phone_number: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Gender
    pub gender: Option<Gender>,
}

impl From<user::Model> for UserProfile {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            avatar: user.avatar,
            age: user.age,
            phone_number: user.phone_number,
            address: user.address,
            gender: user.gender,
        }
    }
}

/// What other users may see: no email, role or account state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    /// User id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Avatar URL
    pub avatar: Option<String>,
    /// Age in years
    pub age: Option<i32>,
    /// Contact number
    pub phone_number: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Gender
    pub gender: Option<Gender>,
}

impl From<user::Model> for PublicProfile {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar: user.avatar,
            age: user.age,
            phone_number: user.phone_number,
            address: user.address,
            gender: user.gender,
        }
    }
}

/// Profile plus a freshly issued access token
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// The signed-in user
    pub user: UserProfile,
    /// Bearer token for later requests
    pub access_token: String,
}

/// Fails with [`Error::Conflict`] if `email` belongs to a user other than `except`.
pub(crate) async fn ensure_email_available<C: ConnectionTrait>(
    db: &C,
    email: &str,
    except: Option<i64>,
) -> Result<()> {
    let existing = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    match existing {
        Some(other) if Some(other.id) != except => Err(Error::conflict("Email already exists")),
        _ => Ok(()),
    }
}

/// Copies the set fields of `input` onto `model`, hashing a new password.
pub(crate) fn apply_profile_changes(
    model: &mut user::ActiveModel,
    input: UpdateProfileInput,
) -> Result<()> {
    if let Some(name) = input.name {
        model.name = Set(name.trim().to_string());
    }
    if let Some(email) = input.email {
        model.email = Set(email);
    }
    if let Some(password) = input.password {
        model.password_hash = Set(auth::hash_password(&password)?);
    }
    if let Some(avatar) = input.avatar {
        model.avatar = Set(Some(avatar));
    }
    if let Some(age) = input.age {
        model.age = Set(Some(age));
    }
    if let Some(phone) = input.phone_number {
        model.phone_number = Set(Some(phone));
    }
    if let Some(address) = input.address {
        model.address = Set(Some(address));
    }
    if let Some(gender) = input.gender {
        model.gender = Set(Some(gender));
    }
    Ok(())
}

/// Fetches a user or fails with [`Error::NotFound`].
pub async fn find_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "User" })
}

/// Creates a customer account and signs them in.
///
/// # Errors
/// Returns an error if:
/// - The input fails validation
/// - The email is already registered
/// - Hashing, token signing or the insert fails
#[instrument(skip(db, tokens, input), fields(email = %input.email))]
pub async fn register(
    db: &DatabaseConnection,
    tokens: &TokenService,
    input: RegisterInput,
) -> Result<AuthSession> {
    input.validate()?;
    ensure_email_available(db, &input.email, None).await?;

    let now = chrono::Utc::now();
    let user = user::ActiveModel {
        id: NotSet,
        name: Set(input.name.trim().to_string()),
        email: Set(input.email),
        password_hash: Set(auth::hash_password(&input.password)?),
        role: Set(UserRole::User),
        active: Set(true),
        verification_code: Set(None),
        avatar: Set(None),
        age: Set(None),
        phone_number: Set(None),
        address: Set(None),
        gender: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!("Registered user {}", user.id);
    let access_token = tokens.issue_access(&user)?;
    Ok(AuthSession {
        user: user.into(),
        access_token,
    })
}

/// Checks credentials and issues an access token.
///
/// Unknown emails and wrong passwords produce the same [`Error::Unauthorized`].
pub async fn login(
    db: &DatabaseConnection,
    tokens: &TokenService,
    input: LoginInput,
) -> Result<AuthSession> {
    input.validate()?;
    let invalid = || Error::unauthorized("Invalid email or password");

    let user = User::find()
        .filter(user::Column::Email.eq(&input.email))
        .one(db)
        .await?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&user.password_hash, &input.password)? {
        return Err(invalid());
    }

    let access_token = tokens.issue_access(&user)?;
    Ok(AuthSession {
        user: user.into(),
        access_token,
    })
}

/// Returns the caller's own profile.
pub async fn get_profile(db: &DatabaseConnection, user_id: i64) -> Result<UserProfile> {
    find_user(db, user_id).await.map(Into::into)
}

/// Returns another user's public profile.
pub async fn get_public_profile(db: &DatabaseConnection, user_id: i64) -> Result<PublicProfile> {
    find_user(db, user_id).await.map(Into::into)
}

/// Updates the caller's own profile.
///
/// # Errors
/// Returns an error if:
/// - The input fails validation
/// - The user does not exist
/// - The new email belongs to another account
#[instrument(skip(db, input))]
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i64,
    input: UpdateProfileInput,
) -> Result<UserProfile> {
    input.validate()?;
    let existing = find_user(db, user_id).await?;
    if let Some(email) = &input.email {
        ensure_email_available(db, email, Some(existing.id)).await?;
    }

    let mut model: user::ActiveModel = existing.into();
    apply_profile_changes(&mut model, input)?;
    model.updated_at = Set(chrono::Utc::now());
    Ok(model.update(db).await?.into())
}

/// Deletes the caller's account together with their cart, reviews and requests.
#[instrument(skip(db))]
pub async fn delete_account(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    let result = User::delete_by_id(user_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound { entity: "User" });
    }
    info!("Deleted user {}", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::auth::TokenPurpose, test_utils::*};

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput {
            name: "Alice".to_string(),
            email: email.to_string(),
            password: "Passw0rd!".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let tokens = test_tokens();

        let mut input = register_input("not-an-email");
        let result = register(&db, &tokens, input.clone()).await;
        assert!(matches!(result, Err(Error::Validation(_))));

        input.email = "alice@example.com".to_string();
        input.password = "weak".to_string();
        let result = register(&db, &tokens, input).await;
        assert!(matches!(result, Err(Error::Validation(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_then_login() -> Result<()> {
        let db = setup_test_db().await?;
        let tokens = test_tokens();

        let session = register(&db, &tokens, register_input("alice@example.com")).await?;
        assert_eq!(session.user.email, "alice@example.com");
        assert_eq!(session.user.role, UserRole::User);
        assert_eq!(tokens.verify(&session.access_token, TokenPurpose::Access)?.id, session.user.id);

        let login_session = login(
            &db,
            &tokens,
            LoginInput {
                email: "alice@example.com".to_string(),
                password: "Passw0rd!".to_string(),
            },
        )
        .await?;
        assert_eq!(login_session.user.id, session.user.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        let tokens = test_tokens();

        register(&db, &tokens, register_input("dup@example.com")).await?;
        let result = register(&db, &tokens, register_input("dup@example.com")).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() -> Result<()> {
        let db = setup_test_db().await?;
        let tokens = test_tokens();
        register(&db, &tokens, register_input("erin@example.com")).await?;

        let wrong_password = login(
            &db,
            &tokens,
            LoginInput {
                email: "erin@example.com".to_string(),
                password: "Wr0ngPass!".to_string(),
            },
        )
        .await
        .unwrap_err();
        let unknown = login(
            &db,
            &tokens,
            LoginInput {
                email: "nobody@example.com".to_string(),
                password: "Passw0rd!".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(wrong_password, Error::Unauthorized { .. }));
        assert_eq!(wrong_password.to_string(), unknown.to_string());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "frank@example.com").await?;
        create_test_user(&db, "taken@example.com").await?;

        let updated = update_profile(
            &db,
            user.id,
            UpdateProfileInput {
                name: Some("Franklin".to_string()),
                age: Some(41),
                gender: Some(Gender::Male),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.name, "Franklin");
        assert_eq!(updated.age, Some(41));
        assert_eq!(updated.gender, Some(Gender::Male));

        // Keeping one's own email is fine
        update_profile(
            &db,
            user.id,
            UpdateProfileInput {
                email: Some("frank@example.com".to_string()),
                ..Default::default()
            },
        )
        .await?;

        let result = update_profile(
            &db,
            user.id,
            UpdateProfileInput {
                email: Some("taken@example.com".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_public_profile_and_delete() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "gina@example.com").await?;

        let public = get_public_profile(&db, user.id).await?;
        assert_eq!(public.id, user.id);
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("email").is_none());
        assert!(json.get("role").is_none());

        delete_account(&db, user.id).await?;
        assert!(matches!(
            get_profile(&db, user.id).await,
            Err(Error::NotFound { entity: "User" })
        ));
        assert!(matches!(
            delete_account(&db, user.id).await,
            Err(Error::NotFound { .. })
        ));

        Ok(())
    }
}
