//! In-memory record store used when the hosted store is not configured.
//!
//! One instance is created at startup and shared; its contents live for the
//! lifetime of the process.  Ids are assigned per collection from an
//! incrementing counter.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::{AppError, Result};
use crate::records::{Collection, Fields, ID_FIELD};
use crate::store::{Filter, FilterOp, Query, RecordStore};

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Fields>,
}

impl Table {
    fn assign_id(&mut self) -> i64 {
        self.next_id = self.next_id.max(1);
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Collection, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records into a collection, keeping any `Id` they carry.
    #[cfg(test)]
    pub async fn seed(&self, collection: Collection, records: impl IntoIterator<Item = Fields>) {
        let mut tables = self.tables.write().await;
        let table = tables.entry(collection).or_default();
        for mut fields in records {
            let id = match fields.get(ID_FIELD).and_then(Value::as_i64) {
                Some(id) => {
                    table.next_id = table.next_id.max(id + 1);
                    id
                }
                None => table.assign_id(),
            };
            fields.insert(ID_FIELD.to_string(), Value::from(id));
            table.rows.insert(id, fields);
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Fields>> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<Fields> = table
            .rows
            .values()
            .filter(|row| query.filters.iter().all(|f| matches_filter(row, f)))
            .cloned()
            .collect();

        let order = &query.order_by;
        rows.sort_by(|a, b| {
            let ord = match (a.get(&order.field), b.get(&order.field)) {
                (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if order.descending {
                ord.reverse()
            } else {
                ord
            }
        });

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn get(&self, collection: Collection, id: i64) -> Result<Option<Fields>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&collection)
            .and_then(|t| t.rows.get(&id))
            .cloned())
    }

    async fn create(&self, collection: Collection, mut fields: Fields) -> Result<Fields> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(collection).or_default();
        let id = table.assign_id();
        fields.insert(ID_FIELD.to_string(), Value::from(id));
        table.rows.insert(id, fields.clone());
        debug!("memory: created {collection} record {id}");
        Ok(fields)
    }

    async fn update(&self, collection: Collection, id: i64, fields: Fields) -> Result<Fields> {
        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(&collection)
            .and_then(|t| t.rows.get_mut(&id))
            .ok_or(AppError::NotFound {
                collection: collection.name(),
                id,
            })?;
        for (key, value) in fields {
            if key != ID_FIELD {
                row.insert(key, value);
            }
        }
        debug!("memory: updated {collection} record {id}");
        Ok(row.clone())
    }

    async fn delete(&self, collection: Collection, id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables
            .get_mut(&collection)
            .and_then(|t| t.rows.remove(&id))
            .is_some();
        debug!("memory: delete {collection} record {id} -> {removed}");
        Ok(removed)
    }
}

fn matches_filter(row: &Fields, filter: &Filter) -> bool {
    let Some(value) = row.get(&filter.field) else {
        return false;
    };
    let Some(ord) = compare_values(value, &filter.value) else {
        return filter.op == FilterOp::EqualTo && value == &filter.value;
    };
    match filter.op {
        FilterOp::EqualTo => ord == Ordering::Equal,
        FilterOp::GreaterThanOrEqualTo => ord != Ordering::Less,
        FilterOp::LessThanOrEqualTo => ord != Ordering::Greater,
    }
}

/// Numbers compare numerically, RFC 3339 timestamps chronologically, other
/// strings lexically.  Mixed kinds are incomparable.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => Some(x.cmp(&y)),
                _ => Some(x.cmp(y)),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
