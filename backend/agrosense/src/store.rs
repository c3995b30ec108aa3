//! The record-store seam shared by the hosted store and the local fallback.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;
use crate::records::{Collection, Fields, ID_FIELD};

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    EqualTo,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
}

impl FilterOp {
    /// Operator name understood by the hosted store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EqualTo => "EqualTo",
            Self::GreaterThanOrEqualTo => "GreaterThanOrEqualTo",
            Self::LessThanOrEqualTo => "LessThanOrEqualTo",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

/// Which records a list call returns, and in what order.
///
/// All filters must match.  The default lists newest records (highest `Id`)
/// first with no limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: OrderBy,
    pub limit: Option<usize>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            order_by: OrderBy {
                field: ID_FIELD.to_string(),
                descending: true,
            },
            limit: None,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: &str, descending: bool) -> Self {
        self.order_by = OrderBy {
            field: field.to_string(),
            descending,
        };
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// CRUD over named collections of JSON records.
///
/// Implementations report failures; deciding whether a failure degrades to
/// an empty result is the job of [`crate::accessor::CollectionAccessor`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short name for logs (`"remote"`, `"memory"`).
    fn backend(&self) -> &'static str;

    async fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Fields>>;

    /// `Ok(None)` when the record does not exist.
    async fn get(&self, collection: Collection, id: i64) -> Result<Option<Fields>>;

    /// Insert a record; the returned fields include the assigned `Id`.
    async fn create(&self, collection: Collection, fields: Fields) -> Result<Fields>;

    /// Change only the supplied fields of an existing record.
    async fn update(&self, collection: Collection, id: i64, fields: Fields) -> Result<Fields>;

    async fn delete(&self, collection: Collection, id: i64) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_query_lists_newest_first() {
        let q = Query::new();
        assert!(q.filters.is_empty());
        assert_eq!(q.order_by.field, "Id");
        assert!(q.order_by.descending);
        assert_eq!(q.limit, None);
    }

    #[test]
    fn builder_accumulates_filters() {
        let q = Query::new()
            .filter("category_c", FilterOp::EqualTo, "Guides")
            .filter("Id", FilterOp::GreaterThanOrEqualTo, 3)
            .order_by("timestamp_c", false)
            .limit(1);
        assert_eq!(q.filters.len(), 2);
        assert_eq!(q.filters[0].value, json!("Guides"));
        assert_eq!(q.filters[1].op.as_str(), "GreaterThanOrEqualTo");
        assert!(!q.order_by.descending);
        assert_eq!(q.limit, Some(1));
    }
}
