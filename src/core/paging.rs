//! Paging, sorting and range-filter helpers shared by list endpoints.

use sea_orm::{ColumnTrait, Condition, EntityTrait, Order, QueryOrder, QuerySelect, Select, Value};
use serde::Deserialize;

/// Page size used when the caller does not pass one
pub const DEFAULT_PAGE_SIZE: u64 = 20;
/// Upper bound on page size
pub const MAX_PAGE_SIZE: u64 = 100;
/// Largest offset the database accepts as a signed 64-bit integer
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Sort direction from a `…Order` query parameter. Anything other than `desc` sorts
/// ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Descending
    Desc,
    /// Ascending
    #[default]
    #[serde(other)]
    Asc,
}

impl From<SortOrder> for Order {
    fn from(value: SortOrder) -> Self {
        match value {
            SortOrder::Asc => Self::Asc,
            SortOrder::Desc => Self::Desc,
        }
    }
}

/// A one-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// One-based page number
    pub number: u64,
    /// Rows per page
    pub size: u64,
}

impl Page {
    /// Normalises raw query values: page numbers start at 1, sizes are clamped to
    /// `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn new(number: Option<u64>, size: Option<u64>) -> Self {
        Self {
            number: number.unwrap_or(1).max(1),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows skipped before this page, capped at `i64::MAX`.
    #[must_use]
    pub fn offset(self) -> u64 {
        self.number
            .saturating_sub(1)
            .saturating_mul(self.size)
            .min(MAX_OFFSET)
    }

    /// Applies offset and limit to `query`.
    #[must_use]
    pub fn apply<E: EntityTrait>(self, query: Select<E>) -> Select<E> {
        query.offset(self.offset()).limit(self.size)
    }
}

/// Adds `column` to the sort keys, ascending unless `order` says otherwise.
#[must_use]
pub fn sort_by<E, C>(query: Select<E>, column: C, order: Option<SortOrder>) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    query.order_by(column, order.unwrap_or_default().into())
}

/// Narrows `condition` to rows where `gte <= column <= lte`, skipping absent bounds.
#[must_use]
pub fn within<C, V>(condition: Condition, column: C, gte: Option<V>, lte: Option<V>) -> Condition
where
    C: ColumnTrait,
    V: Into<Value>,
{
    let condition = match gte {
        Some(min) => condition.add(column.gte(min)),
        None => condition,
    };
    match lte {
        Some(max) => condition.add(column.lte(max)),
        None => condition,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[derive(Deserialize)]
    struct Params {
        order: Option<SortOrder>,
    }

    #[test]
    fn test_page_normalisation() {
        assert_eq!(Page::new(None, None), Page { number: 1, size: DEFAULT_PAGE_SIZE });
        assert_eq!(Page::new(Some(0), Some(0)), Page { number: 1, size: 1 });
        assert_eq!(Page::new(Some(3), Some(500)).size, MAX_PAGE_SIZE);
        assert_eq!(Page::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn test_offset_saturates_on_huge_page_number() {
        let page = Page::new(Some(u64::MAX), Some(MAX_PAGE_SIZE));
        assert_eq!(page.offset(), MAX_OFFSET);
    }

    #[test]
    fn test_sort_order_parsing() {
        let parsed: Params = serde_json::from_str(r#"{"order":"desc"}"#).unwrap();
        assert_eq!(parsed.order, Some(SortOrder::Desc));
        let parsed: Params = serde_json::from_str(r#"{"order":"asc"}"#).unwrap();
        assert_eq!(parsed.order, Some(SortOrder::Asc));
        let parsed: Params = serde_json::from_str(r#"{"order":"sideways"}"#).unwrap();
        assert_eq!(parsed.order, Some(SortOrder::Asc));
        let parsed: Params = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.order, None);
    }
}
