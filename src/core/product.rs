//! Product business logic.
//!
//! Products are listed two ways. Admins see every column and can filter and sort on stock
//! figures. The public catalog hides stock (`quantity`, `sold`) and timestamps. Both
//! listings and both detail views carry the product's category, sub-category, brand and
//! reviews, loaded in one batch query per relation.

use crate::{
    core::{
        cart::update_cart_total_atomic,
        paging::{Page, SortOrder, sort_by, within},
        pricing,
    },
    entities::{
        Brand, CartItem, Category, Product, Review, SubCategory, brand, cart_item, category,
        product, review, sub_category,
    },
    errors::{Error, Result},
};
use sea_orm::{
    ActiveValue::NotSet, Condition, ConnectionTrait, QueryOrder, Select, Set, TransactionTrait,
    prelude::*,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};
use validator::Validate;

/// Body of `POST /product`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    /// Display title
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Long description
    #[validate(length(min = 1))]
    pub description: String,
    /// Units in stock
    #[validate(range(min = 1, max = 500))]
    pub quantity: i32,
    /// Cover image URL
    #[validate(length(min = 1))]
    pub image_cover: String,
    /// List price
    #[validate(range(min = 1.0, max = 100_000.0))]
    pub price: f64,
    /// Sale price, `0` or absent for none
    #[validate(range(min = 0.0, max = 100_000.0))]
    pub price_after_discount: Option<f64>,
    /// Owning category
    pub category_id: i64,
    /// Optional sub-category
    pub sub_category_id: Option<i64>,
    /// Optional brand
    pub brand_id: Option<i64>,
}

/// Body of `PUT /product/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    /// New title
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// New description
    #[validate(length(min = 1))]
    pub description: Option<String>,
    /// New stock level
    #[validate(range(min = 1, max = 500))]
    pub quantity: Option<i32>,
    /// New cover image URL
    #[validate(length(min = 1))]
    pub image_cover: Option<String>,
    /// New list price
    #[validate(range(min = 1.0, max = 100_000.0))]
    pub price: Option<f64>,
    /// New sale price
    #[validate(range(min = 0.0, max = 100_000.0))]
    pub price_after_discount: Option<f64>,
    /// New category
    pub category_id: Option<i64>,
    /// New sub-category
    pub sub_category_id: Option<i64>,
    /// New brand
    pub brand_id: Option<i64>,
}

/// Query string of `GET /product/admin`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProductQuery {
    /// One-based page number
    pub page_number: Option<u64>,
    /// Rows per page
    pub product_per_page: Option<u64>,
    /// Case-insensitive substring of the title
    pub product: Option<String>,
    /// Sort on title
    pub products_order: Option<SortOrder>,
    /// Sort on stock
    pub quantity_order: Option<SortOrder>,
    /// Minimum stock
    pub quantity_gte: Option<i32>,
    /// Maximum stock
    pub quantity_lte: Option<i32>,
    /// Sort on units sold
    pub sold_order: Option<SortOrder>,
    /// Minimum units sold
    pub sold_gte: Option<i32>,
    /// Maximum units sold
    pub sold_lte: Option<i32>,
    /// Sort on list price
    pub price_order: Option<SortOrder>,
    /// Minimum list price
    pub price_gte: Option<f64>,
    /// Maximum list price
    pub price_lte: Option<f64>,
    /// Sort on sale price
    pub price_after_discount_order: Option<SortOrder>,
    /// Minimum sale price
    pub price_after_discount_gte: Option<f64>,
    /// Maximum sale price
    pub price_after_discount_lte: Option<f64>,
    /// Sort on average rating
    pub rating_average_order: Option<SortOrder>,
    /// Minimum average rating
    pub rating_average_gte: Option<f64>,
    /// Maximum average rating
    pub rating_average_lte: Option<f64>,
    /// Sort on number of ratings
    pub rating_quantity_order: Option<SortOrder>,
    /// Minimum number of ratings
    pub rating_quantity_gte: Option<i32>,
    /// Maximum number of ratings
    pub rating_quantity_lte: Option<i32>,
}

/// Query string of `GET /product`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProductQuery {
    /// One-based page number
    pub page_number: Option<u64>,
    /// Rows per page
    pub product_per_page: Option<u64>,
    /// Case-insensitive substring of the title
    pub product: Option<String>,
    /// Sort on title
    pub products_order: Option<SortOrder>,
    /// Sort on list price
    pub price_order: Option<SortOrder>,
    /// Minimum list price
    pub price_gte: Option<f64>,
    /// Maximum list price
    pub price_lte: Option<f64>,
    /// Sort on average rating
    pub rating_average_order: Option<SortOrder>,
    /// Minimum average rating
    pub rating_average_gte: Option<f64>,
    /// Maximum average rating
    pub rating_average_lte: Option<f64>,
    /// Sort on number of ratings
    pub rating_quantity_order: Option<SortOrder>,
    /// Minimum number of ratings
    pub rating_quantity_gte: Option<i32>,
    /// Maximum number of ratings
    pub rating_quantity_lte: Option<i32>,
}

/// A product with everything it references
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    /// The product row
    #[serde(flatten)]
    pub product: product::Model,
    /// Its category
    pub category: Option<category::Model>,
    /// Its sub-category
    pub sub_category: Option<sub_category::Model>,
    /// Its brand
    pub brand: Option<brand::Model>,
    /// Reviews, oldest first
    pub reviews: Vec<review::Model>,
}

/// A product as the public catalog shows it: no stock figures, no timestamps
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProduct {
    /// Product id
    pub id: i64,
    /// Display title
    pub title: String,
    /// Long description
    pub description: String,
    /// Cover image URL
    pub image_cover: Option<String>,
    /// List price
    pub price: f64,
    /// Sale price
    pub price_after_discount: Option<f64>,
    /// Mean rating
    pub ratings_average: f64,
    /// Number of ratings
    pub ratings_quantity: i32,
    /// Category id
    pub category_id: i64,
    /// Sub-category id
    pub sub_category_id: Option<i64>,
    /// Brand id
    pub brand_id: Option<i64>,
    /// Its category
    pub category: Option<category::Model>,
    /// Its sub-category
    pub sub_category: Option<sub_category::Model>,
    /// Its brand
    pub brand: Option<brand::Model>,
    /// Reviews, oldest first
    pub reviews: Vec<review::Model>,
}

impl From<ProductDetail> for PublicProduct {
    fn from(detail: ProductDetail) -> Self {
        let p = detail.product;
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            image_cover: p.image_cover,
            price: p.price,
            price_after_discount: p.price_after_discount,
            ratings_average: p.ratings_average,
            ratings_quantity: p.ratings_quantity,
            category_id: p.category_id,
            sub_category_id: p.sub_category_id,
            brand_id: p.brand_id,
            category: detail.category,
            sub_category: detail.sub_category,
            brand: detail.brand,
            reviews: detail.reviews,
        }
    }
}

/// Fetches a bare product row.
pub async fn find_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "Product" })
}

/// Checks that every referenced category, sub-category and brand exists.
async fn ensure_references(
    db: &DatabaseConnection,
    category_id: Option<i64>,
    sub_category_id: Option<i64>,
    brand_id: Option<i64>,
) -> Result<()> {
    if let Some(id) = category_id {
        Category::find_by_id(id)
            .one(db)
            .await?
            .ok_or(Error::NotFound { entity: "Category" })?;
    }
    if let Some(id) = sub_category_id {
        SubCategory::find_by_id(id)
            .one(db)
            .await?
            .ok_or(Error::NotFound {
                entity: "SubCategory",
            })?;
    }
    if let Some(id) = brand_id {
        Brand::find_by_id(id)
            .one(db)
            .await?
            .ok_or(Error::NotFound { entity: "Brand" })?;
    }
    Ok(())
}

/// Attaches category, sub-category, brand and reviews to each product, preserving order.
async fn with_relations(
    db: &DatabaseConnection,
    products: Vec<product::Model>,
) -> Result<Vec<ProductDetail>> {
    let category_ids: HashSet<i64> = products.iter().map(|p| p.category_id).collect();
    let sub_category_ids: HashSet<i64> =
        products.iter().filter_map(|p| p.sub_category_id).collect();
    let brand_ids: HashSet<i64> = products.iter().filter_map(|p| p.brand_id).collect();
    let product_ids: Vec<i64> = products.iter().map(|p| p.id).collect();

    let categories: HashMap<i64, category::Model> = Category::find()
        .filter(category::Column::Id.is_in(category_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let sub_categories: HashMap<i64, sub_category::Model> = SubCategory::find()
        .filter(sub_category::Column::Id.is_in(sub_category_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let brands: HashMap<i64, brand::Model> = Brand::find()
        .filter(brand::Column::Id.is_in(brand_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();

    let mut reviews: HashMap<i64, Vec<review::Model>> = HashMap::new();
    for review in Review::find()
        .filter(review::Column::ProductId.is_in(product_ids))
        .order_by_asc(review::Column::Id)
        .all(db)
        .await?
    {
        reviews.entry(review.product_id).or_default().push(review);
    }

    Ok(products
        .into_iter()
        .map(|product| ProductDetail {
            category: categories.get(&product.category_id).cloned(),
            sub_category: product
                .sub_category_id
                .and_then(|id| sub_categories.get(&id).cloned()),
            brand: product.brand_id.and_then(|id| brands.get(&id).cloned()),
            reviews: reviews.remove(&product.id).unwrap_or_default(),
            product,
        })
        .collect())
}

fn title_condition(product: Option<&str>) -> Condition {
    match product.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => Condition::all().add(product::Column::Title.contains(term)),
        None => Condition::all(),
    }
}

fn sorted(
    query: Select<Product>,
    keys: impl IntoIterator<Item = (product::Column, Option<SortOrder>)>,
) -> Select<Product> {
    keys.into_iter()
        .fold(query, |query, (column, order)| sort_by(query, column, order))
}

/// Creates a product after checking its category, sub-category and brand exist.
///
/// # Errors
/// Returns an error if:
/// - The input fails validation
/// - A referenced category, sub-category or brand does not exist
#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create_product(
    db: &DatabaseConnection,
    input: CreateProductInput,
) -> Result<product::Model> {
    input.validate()?;
    ensure_references(
        db,
        Some(input.category_id),
        input.sub_category_id,
        input.brand_id,
    )
    .await?;

    let now = chrono::Utc::now();
    let created = product::ActiveModel {
        id: NotSet,
        title: Set(input.title.trim().to_string()),
        description: Set(input.description),
        quantity: Set(input.quantity),
        sold: Set(0),
        image_cover: Set(Some(input.image_cover)),
        price: Set(input.price),
        price_after_discount: Set(input.price_after_discount),
        ratings_average: Set(0.0),
        ratings_quantity: Set(0),
        category_id: Set(input.category_id),
        sub_category_id: Set(input.sub_category_id),
        brand_id: Set(input.brand_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!("Created product {}", created.id);
    Ok(created)
}

/// Admin listing: every column, filterable and sortable on stock and rating figures.
pub async fn list_admin_products(
    db: &DatabaseConnection,
    query: &AdminProductQuery,
) -> Result<Vec<ProductDetail>> {
    let mut condition = title_condition(query.product.as_deref());
    condition = within(
        condition,
        product::Column::Quantity,
        query.quantity_gte,
        query.quantity_lte,
    );
    condition = within(condition, product::Column::Sold, query.sold_gte, query.sold_lte);
    condition = within(condition, product::Column::Price, query.price_gte, query.price_lte);
    condition = within(
        condition,
        product::Column::PriceAfterDiscount,
        query.price_after_discount_gte,
        query.price_after_discount_lte,
    );
    condition = within(
        condition,
        product::Column::RatingsAverage,
        query.rating_average_gte,
        query.rating_average_lte,
    );
    condition = within(
        condition,
        product::Column::RatingsQuantity,
        query.rating_quantity_gte,
        query.rating_quantity_lte,
    );

    let select = sorted(
        Product::find().filter(condition),
        [
            (product::Column::Title, query.products_order),
            (product::Column::Quantity, query.quantity_order),
            (product::Column::Sold, query.sold_order),
            (product::Column::Price, query.price_order),
            (
                product::Column::PriceAfterDiscount,
                query.price_after_discount_order,
            ),
            (product::Column::RatingsAverage, query.rating_average_order),
            (product::Column::RatingsQuantity, query.rating_quantity_order),
        ],
    );
    let page = Page::new(query.page_number, query.product_per_page);
    let products = page.apply(select).all(db).await?;
    debug!("Admin product page {} returned {} rows", page.number, products.len());
    with_relations(db, products).await
}

/// Public catalog listing.
pub async fn list_public_products(
    db: &DatabaseConnection,
    query: &PublicProductQuery,
) -> Result<Vec<PublicProduct>> {
    let mut condition = title_condition(query.product.as_deref());
    condition = within(condition, product::Column::Price, query.price_gte, query.price_lte);
    condition = within(
        condition,
        product::Column::RatingsAverage,
        query.rating_average_gte,
        query.rating_average_lte,
    );
    condition = within(
        condition,
        product::Column::RatingsQuantity,
        query.rating_quantity_gte,
        query.rating_quantity_lte,
    );

    let select = sorted(
        Product::find().filter(condition),
        [
            (product::Column::Title, query.products_order),
            (product::Column::Price, query.price_order),
            (product::Column::RatingsAverage, query.rating_average_order),
            (product::Column::RatingsQuantity, query.rating_quantity_order),
        ],
    );
    let page = Page::new(query.page_number, query.product_per_page);
    let products = page.apply(select).all(db).await?;
    Ok(with_relations(db, products)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Admin detail view of one product.
pub async fn get_admin_product(db: &DatabaseConnection, product_id: i64) -> Result<ProductDetail> {
    let product = find_product(db, product_id).await?;
    with_relations(db, vec![product])
        .await?
        .pop()
        .ok_or(Error::NotFound { entity: "Product" })
}

/// Public detail view of one product.
pub async fn get_public_product(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<PublicProduct> {
    get_admin_product(db, product_id).await.map(Into::into)
}

/// Edits a product. Cart totals already holding the product are not re-priced.
///
/// # Errors
/// Returns an error if:
/// - The product does not exist
/// - The input fails validation
/// - A newly referenced category, sub-category or brand does not exist
#[instrument(skip(db, input))]
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    input: UpdateProductInput,
) -> Result<product::Model> {
    input.validate()?;
    let existing = find_product(db, product_id).await?;
    ensure_references(db, input.category_id, input.sub_category_id, input.brand_id).await?;

    let mut model: product::ActiveModel = existing.into();
    if let Some(title) = input.title {
        model.title = Set(title.trim().to_string());
    }
    if let Some(description) = input.description {
        model.description = Set(description);
    }
    if let Some(quantity) = input.quantity {
        model.quantity = Set(quantity);
    }
    if let Some(image_cover) = input.image_cover {
        model.image_cover = Set(Some(image_cover));
    }
    if let Some(price) = input.price {
        model.price = Set(price);
    }
    if let Some(price_after_discount) = input.price_after_discount {
        model.price_after_discount = Set(Some(price_after_discount));
    }
    if let Some(category_id) = input.category_id {
        model.category_id = Set(category_id);
    }
    if let Some(sub_category_id) = input.sub_category_id {
        model.sub_category_id = Set(Some(sub_category_id));
    }
    if let Some(brand_id) = input.brand_id {
        model.brand_id = Set(Some(brand_id));
    }
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

async fn release_cart_lines<C: ConnectionTrait>(db: &C, product: &product::Model) -> Result<()> {
    let lines = CartItem::find()
        .filter(cart_item::Column::ProductId.eq(product.id))
        .all(db)
        .await?;
    for line in &lines {
        update_cart_total_atomic(db, line.cart_id, -pricing::line_total(product, line.quantity))
            .await?;
    }
    CartItem::delete_many()
        .filter(cart_item::Column::ProductId.eq(product.id))
        .exec(db)
        .await?;
    debug!("Released {} cart lines of product {}", lines.len(), product.id);
    Ok(())
}

/// Deletes a product together with its cart lines and reviews.
///
/// Every cart that held the product has the line's value subtracted from its total
/// in the same transaction.
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let product = Product::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound { entity: "Product" })?;

    release_cart_lines(&txn, &product).await?;
    Review::delete_many()
        .filter(review::Column::ProductId.eq(product.id))
        .exec(&txn)
        .await?;
    Product::delete_by_id(product.id).exec(&txn).await?;

    txn.commit().await?;
    info!("Deleted product {}", product_id);
    Ok(())
}
