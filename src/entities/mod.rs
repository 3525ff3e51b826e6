//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod brand;
pub mod cart;
pub mod cart_item;
pub mod category;
pub mod coupon;
pub mod product;
pub mod request_product;
pub mod review;
pub mod sub_category;
pub mod supplier;
pub mod tax;
pub mod user;

// Re-export specific types to avoid conflicts
pub use brand::{Column as BrandColumn, Entity as Brand, Model as BrandModel};
pub use cart::{Column as CartColumn, Entity as Cart, Model as CartModel};
pub use cart_item::{Column as CartItemColumn, Entity as CartItem, Model as CartItemModel};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use coupon::{Column as CouponColumn, Entity as Coupon, Model as CouponModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use request_product::{
    Column as RequestProductColumn, Entity as RequestProduct, Model as RequestProductModel,
};
pub use review::{Column as ReviewColumn, Entity as Review, Model as ReviewModel};
pub use sub_category::{
    Column as SubCategoryColumn, Entity as SubCategory, Model as SubCategoryModel,
};
pub use supplier::{Column as SupplierColumn, Entity as Supplier, Model as SupplierModel};
pub use tax::{Column as TaxColumn, Entity as Tax, Model as TaxModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, UserRole};
