//! Coupon business logic.
//!
//! A coupon is a flat discount with an expiry. The expiry must lie in the future when a
//! coupon is created or edited, and is checked again when a customer applies it.

use crate::{
    entities::{Cart, Coupon, cart, coupon},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveValue::NotSet, ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use serde::Deserialize;
use tracing::{info, instrument};
use validator::Validate;

/// Body of `POST /coupon/create`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponInput {
    /// Unique coupon code
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    pub expire_date: String,
    /// Flat amount taken off the cart total
    #[validate(range(min = 0.0))]
    pub discount: f64,
}

/// Body of `PUT /coupon/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCouponInput {
    /// New code
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    /// New expiry, `YYYY-MM-DD` or RFC 3339
    pub expire_date: Option<String>,
    /// New discount
    #[validate(range(min = 0.0))]
    pub discount: Option<f64>,
}

/// Parses an expiry and requires it to be in the future.
///
/// A bare date means midnight UTC at the start of that day.
pub fn parse_expire_date(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
        })
        .map_err(|_| {
            Error::bad_request("expireDate must be a valid date string in the format YYYY-MM-DD")
        })?;

    if parsed <= Utc::now() {
        return Err(Error::bad_request("Coupon is expired"));
    }
    Ok(parsed)
}

/// Looks a coupon up by the code customers type in.
pub async fn find_coupon_by_name<C: ConnectionTrait>(db: &C, name: &str) -> Result<coupon::Model> {
    Coupon::find()
        .filter(coupon::Column::Name.eq(name))
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "Coupon" })
}

async fn ensure_name_available(
    db: &DatabaseConnection,
    name: &str,
    except: Option<i64>,
) -> Result<()> {
    match find_coupon_by_name(db, name).await {
        Ok(other) if Some(other.id) != except => Err(Error::conflict(format!(
            "Coupon with name {name} already exists"
        ))),
        Ok(_) | Err(Error::NotFound { .. }) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Creates a coupon.
///
/// # Errors
/// Returns an error if:
/// - The input fails validation or the expiry is unparsable or not in the future
/// - Another coupon already has the name
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_coupon(db: &DatabaseConnection, input: CreateCouponInput) -> Result<coupon::Model> {
    input.validate()?;
    let expire_date = parse_expire_date(&input.expire_date)?;
    let name = input.name.trim().to_string();
    ensure_name_available(db, &name, None).await?;

    let now = Utc::now();
    let created = coupon::ActiveModel {
        id: NotSet,
        name: Set(name),
        expire_date: Set(expire_date),
        discount: Set(input.discount),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!("Created coupon {}", created.id);
    Ok(created)
}

/// Lists every coupon by expiry.
pub async fn list_coupons(db: &DatabaseConnection) -> Result<Vec<coupon::Model>> {
    Coupon::find()
        .order_by_asc(coupon::Column::ExpireDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches one coupon.
pub async fn get_coupon(db: &DatabaseConnection, coupon_id: i64) -> Result<coupon::Model> {
    Coupon::find_by_id(coupon_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "Coupon" })
}

/// Edits a coupon. Carts that already applied it keep their after-discount total until
/// their contents change.
#[instrument(skip(db, input))]
pub async fn update_coupon(
    db: &DatabaseConnection,
    coupon_id: i64,
    input: UpdateCouponInput,
) -> Result<coupon::Model> {
    input.validate()?;
    let mut model: coupon::ActiveModel = get_coupon(db, coupon_id).await?.into();

    if let Some(raw) = &input.expire_date {
        model.expire_date = Set(parse_expire_date(raw)?);
    }
    if let Some(name) = input.name {
        let name = name.trim().to_string();
        ensure_name_available(db, &name, Some(coupon_id)).await?;
        model.name = Set(name);
    }
    if let Some(discount) = input.discount {
        model.discount = Set(discount);
    }
    model.updated_at = Set(Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Deletes a coupon and strips it from every cart that applied it.
#[instrument(skip(db))]
pub async fn delete_coupon(db: &DatabaseConnection, coupon_id: i64) -> Result<()> {
    get_coupon(db, coupon_id).await?;
    let txn = db.begin().await?;

    Cart::update_many()
        .col_expr(cart::Column::CouponId, Expr::value(Option::<i64>::None))
        .col_expr(
            cart::Column::TotalPriceAfterDiscount,
            Expr::value(Option::<f64>::None),
        )
        .filter(cart::Column::CouponId.eq(coupon_id))
        .exec(&txn)
        .await?;
    Coupon::delete_by_id(coupon_id).exec(&txn).await?;

    txn.commit().await?;
    info!("Deleted coupon {}", coupon_id);
    Ok(())
}
