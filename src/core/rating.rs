//! Running rating aggregate stored on each product.
//!
//! The review service folds each rating change into the product's
//! `(ratings_average, ratings_quantity)` pair inside the same database transaction
//! as the review write. Create, update and delete are symmetric, so deleting a
//! review undoes exactly what creating it did.

use crate::entities::product;

/// Mean and count of the ratings currently folded into a product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingAggregate {
    /// Running mean
    pub average: f64,
    /// Number of ratings
    pub count: i32,
}

impl RatingAggregate {
    /// Reads the aggregate off a product row.
    #[must_use]
    pub const fn of(product: &product::Model) -> Self {
        Self {
            average: product.ratings_average,
            count: product.ratings_quantity,
        }
    }

    /// Folds in a new rating.
    #[must_use]
    pub fn with_added(self, rating: f64) -> Self {
        let count = self.count + 1;
        Self {
            average: self.average.mul_add(f64::from(self.count), rating) / f64::from(count),
            count,
        }
    }

    /// Replaces an existing rating with a new value.
    ///
    /// Leaves the aggregate untouched when the rating did not change or when nothing has
    /// been folded in yet.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn with_replaced(self, old_rating: f64, new_rating: f64) -> Self {
        if old_rating == new_rating || self.count <= 0 {
            return self;
        }
        let n = f64::from(self.count);
        Self {
            average: (self.average.mul_add(n, -old_rating) + new_rating) / n,
            count: self.count,
        }
    }

    /// Removes a previously folded rating.
    #[must_use]
    pub fn with_removed(self, rating: f64) -> Self {
        if self.count <= 1 {
            return Self {
                average: 0.0,
                count: 0,
            };
        }
        let count = self.count - 1;
        Self {
            average: self.average.mul_add(f64::from(self.count), -rating) / f64::from(count),
            count,
        }
    }
}
