/// Token issuing, password hashing and role checks
pub mod auth;
/// Administrative user management
pub mod admin;
/// Brand catalog
pub mod brand;
/// Per-user carts and coupon application
pub mod cart;
/// Cart lines and incremental totals
pub mod cart_item;
/// Top-level catalog categories
pub mod category;
/// Flat-discount coupons
pub mod coupon;
/// Shared list paging and sort parameters
pub mod paging;
/// Unit price and discount arithmetic
pub mod pricing;
/// Products, listings and detail views
pub mod product;
/// Running rating aggregate arithmetic
pub mod rating;
/// Customer requests for products not yet stocked
pub mod request_product;
/// Emailed-code password reset flow
pub mod reset_password;
/// Product reviews
pub mod review;
/// Second-level catalog categories
pub mod sub_category;
/// Suppliers
pub mod supplier;
/// Tax rates
pub mod tax;
/// Registration, login and self-service profile
pub mod user;
