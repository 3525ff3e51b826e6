//! Cart pricing rules.
//!
//! Cart totals are never recomputed from scratch: every line-item change applies a
//! signed delta computed here. Keeping the arithmetic in one place guarantees that
//! add, update and remove use the same unit price.

use crate::{
    entities::product,
    errors::{Error, Result},
};

/// Price charged for one unit of `product`.
///
/// The discounted price wins when present and non-zero; otherwise the list price applies.
#[must_use]
pub fn unit_price(product: &product::Model) -> f64 {
    match product.price_after_discount {
        Some(discounted) if discounted != 0.0 => discounted,
        _ => product.price,
    }
}

/// Amount a line of `quantity` units adds to the cart total.
#[must_use]
pub fn line_total(product: &product::Model, quantity: i32) -> f64 {
    unit_price(product) * f64::from(quantity)
}

/// Change in cart total when a line goes from `old_quantity` to `new_quantity` units.
#[must_use]
pub fn quantity_delta(product: &product::Model, old_quantity: i32, new_quantity: i32) -> f64 {
    f64::from(new_quantity - old_quantity) * unit_price(product)
}

/// Cart total after subtracting a flat coupon discount.
///
/// # Errors
/// Returns [`Error::BadRequest`] if the cart total is zero or not finite, or if the
/// discount is larger than the total.
pub fn discounted_total(total_price: f64, discount: f64) -> Result<f64> {
    if !total_price.is_finite() || total_price <= 0.0 {
        return Err(Error::bad_request("Invalid cart total price"));
    }
    if discount > total_price {
        return Err(Error::bad_request(
            "Coupon discount exceeds cart total price",
        ));
    }
    Ok(total_price - discount)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use chrono::Utc;

    fn product(price: f64, price_after_discount: Option<f64>) -> product::Model {
        let now = Utc::now();
        product::Model {
            id: 1,
            title: "Desk Lamp".to_string(),
            description: "Warm light".to_string(),
            quantity: 10,
            sold: 0,
            image_cover: None,
            price,
            price_after_discount,
            ratings_average: 0.0,
            ratings_quantity: 0,
            category_id: 1,
            sub_category_id: None,
            brand_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_unit_price_falls_back_to_list_price() {
        assert_eq!(unit_price(&product(40.0, None)), 40.0);
        assert_eq!(unit_price(&product(40.0, Some(0.0))), 40.0);
    }

    #[test]
    fn test_unit_price_prefers_discount() {
        assert_eq!(unit_price(&product(40.0, Some(32.5))), 32.5);
    }

    #[test]
    fn test_line_total_and_delta() {
        let lamp = product(40.0, Some(30.0));
        assert_eq!(line_total(&lamp, 3), 90.0);
        assert_eq!(quantity_delta(&lamp, 3, 5), 60.0);
        assert_eq!(quantity_delta(&lamp, 5, 2), -90.0);
        assert_eq!(quantity_delta(&lamp, 4, 4), 0.0);
    }

    #[test]
    fn test_add_then_remove_restores_total() {
        let lamp = product(19.99, None);
        let before = 120.0;
        let after_add = before + line_total(&lamp, 2);
        let after_remove = after_add - line_total(&lamp, 2);
        assert!((after_remove - before).abs() < 1e-9);
    }

    #[test]
    fn test_discounted_total_rules() {
        assert_eq!(discounted_total(100.0, 25.0).unwrap(), 75.0);
        assert_eq!(discounted_total(100.0, 100.0).unwrap(), 0.0);
        assert!(matches!(
            discounted_total(100.0, 100.01),
            Err(Error::BadRequest { .. })
        ));
        assert!(matches!(
            discounted_total(0.0, 5.0),
            Err(Error::BadRequest { .. })
        ));
        assert!(matches!(
            discounted_total(f64::NAN, 5.0),
            Err(Error::BadRequest { .. })
        ));
    }
}
