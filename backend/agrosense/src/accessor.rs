//! Typed CRUD façade over one collection.
//!
//! Failure contract:
//!
//! * `list` / `list_where` never fail. A store or transport error is logged
//!   and reads as "no records"; a row that does not decode is logged and
//!   skipped.
//! * `get_by_id` fails with [`AppError::NotFound`] when the record is absent
//!   or the store refuses the lookup.
//! * `create`, `update` and `delete` log and propagate every failure, so the
//!   caller can keep the user's input for a retry.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::errors::{AppError, Result};
use crate::records::{CollectionRecord, Fields};
use crate::store::{Query, RecordStore};

pub struct CollectionAccessor<T> {
    store: Arc<dyn RecordStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for CollectionAccessor<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<T: CollectionRecord> CollectionAccessor<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// All records, newest first.
    pub async fn list(&self) -> Vec<T> {
        self.list_where(Query::new()).await
    }

    pub async fn list_where(&self, query: Query) -> Vec<T> {
        let collection = T::COLLECTION;
        match self.store.query(collection, &query).await {
            Ok(rows) => rows
                .into_iter()
                .filter_map(|row| match decode::<T>(row) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!("Skipping malformed {collection} record: {e}");
                        None
                    }
                })
                .collect(),
            Err(e) => {
                error!(
                    "Error fetching {collection} records from {} store: {e}",
                    self.store.backend()
                );
                Vec::new()
            }
        }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<T> {
        let collection = T::COLLECTION;
        let not_found = AppError::NotFound {
            collection: collection.name(),
            id,
        };
        match self.store.get(collection, id).await {
            Ok(Some(row)) => decode(row).map_err(|e| {
                error!("Error decoding {collection} record {id}: {e}");
                AppError::from(e)
            }),
            Ok(None) => Err(not_found),
            Err(AppError::Store(message)) => {
                error!("Error fetching {collection} record {id}: {message}");
                Err(not_found)
            }
            Err(e) => {
                error!("Error fetching {collection} record {id}: {e}");
                Err(e)
            }
        }
    }

    pub async fn create(&self, draft: &T::Draft) -> Result<T> {
        let collection = T::COLLECTION;
        let result = self.try_create(draft).await;
        if let Err(e) = &result {
            error!("Error creating {collection} record: {e}");
        }
        result
    }

    /// Change only the fields set in `patch`.
    pub async fn update(&self, id: i64, patch: &T::Patch) -> Result<T> {
        let collection = T::COLLECTION;
        let result = self.try_update(id, patch).await;
        if let Err(e) = &result {
            error!("Error updating {collection} record {id}: {e}");
        }
        result
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let collection = T::COLLECTION;
        let result = self.store.delete(collection, id).await;
        if let Err(e) = &result {
            error!("Error deleting {collection} record {id}: {e}");
        }
        result
    }

    async fn try_create(&self, draft: &T::Draft) -> Result<T> {
        let row = self.store.create(T::COLLECTION, encode(draft)?).await?;
        Ok(decode(row)?)
    }

    async fn try_update(&self, id: i64, patch: &T::Patch) -> Result<T> {
        let row = self.store.update(T::COLLECTION, id, encode(patch)?).await?;
        Ok(decode(row)?)
    }
}

fn encode<S: Serialize>(value: &S) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(AppError::Store(format!(
            "record must encode to an object, got {other}"
        ))),
    }
}

fn decode<T: CollectionRecord>(row: Fields) -> serde_json::Result<T> {
    serde_json::from_value(Value::Object(row))
}
