//! Catalog lookups beyond plain CRUD.

use crate::accessor::CollectionAccessor;
use crate::records::Resource;
use crate::store::{FilterOp, Query};

impl CollectionAccessor<Resource> {
    /// Resources in one category, newest first. Degrades to empty like `list`.
    pub async fn by_category(&self, category: &str) -> Vec<Resource> {
        self.list_where(Query::new().filter("category_c", FilterOp::EqualTo, category))
            .await
    }
}
