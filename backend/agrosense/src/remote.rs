//! Hosted record-store client.
//!
//! Speaks the store's JSON table API:
//!
//! | Operation | Request                                             |
//! |-----------|-----------------------------------------------------|
//! | query     | `POST   /v1/tables/{table}/records/query`           |
//! | get       | `GET    /v1/tables/{table}/records/{id}`            |
//! | create    | `POST   /v1/tables/{table}/records` `{records:[..]}`|
//! | update    | `PATCH  /v1/tables/{table}/records` `{records:[..]}`|
//! | delete    | `DELETE /v1/tables/{table}/records` `{RecordIds:[..]}` |
//!
//! ## Resilience
//!
//! * Reads that are rate-limited (HTTP 429) are retried with exponential
//!   back-off, at most [`MAX_READ_ATTEMPTS`] times.
//! * Mutations are never retried; a rejected write must reach the caller.
//! * The per-request timeout is configured on the shared [`Client`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::config::StoreCredentials;
use crate::errors::{AppError, FieldError, Result};
use crate::records::{Collection, Fields, ID_FIELD};
use crate::store::{Query, RecordStore};

const MAX_READ_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 250;

const PROJECT_HEADER: &str = "X-Project-Id";
const KEY_HEADER: &str = "X-Public-Key";

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FetchResponse<T> {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct MutationResponse {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    #[serde(default)]
    results: Vec<RecordResult>,
}

#[derive(Debug, Deserialize)]
struct RecordResult {
    #[serde(default)]
    success: bool,
    data: Option<Fields>,
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldFailure>,
}

#[derive(Debug, Deserialize)]
struct FieldFailure {
    #[serde(rename = "fieldLabel")]
    field_label: String,
    message: String,
}

// ─────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────

pub struct RemoteStore {
    client: Client,
    base_url: String,
    credentials: StoreCredentials,
}

impl RemoteStore {
    pub fn new(client: Client, base_url: &str, credentials: StoreCredentials) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn records_url(&self, collection: Collection) -> String {
        format!("{}/v1/tables/{}/records", self.base_url, collection.table())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(PROJECT_HEADER, &self.credentials.project_id)
            .header(KEY_HEADER, &self.credentials.public_key)
    }

    /// Send an idempotent read, backing off while the store rate-limits us.
    async fn read<T: DeserializeOwned>(
        &self,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<T> {
        let mut backoff = INITIAL_BACKOFF_MS;
        let mut attempt = 1;
        loop {
            let resp = self.authorized(build()).send().await?;
            if resp.status() == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_READ_ATTEMPTS {
                warn!("Rate-limited by record store (attempt {attempt}, retry in {backoff}ms)");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
                backoff *= 2;
                attempt += 1;
                continue;
            }
            return decode(resp).await;
        }
    }

    async fn mutate(&self, request: RequestBuilder) -> Result<MutationResponse> {
        let resp = self.authorized(request).send().await?;
        decode(resp).await
    }
}

/// Decode a JSON body; an undecodable error response becomes a store error.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    match serde_json::from_slice(&bytes) {
        Ok(body) => Ok(body),
        Err(e) if status.is_success() => Err(e.into()),
        Err(_) => Err(AppError::Store(format!("record store responded with {status}"))),
    }
}

/// Body of a query request in the store's wire format.
fn build_query(query: &Query) -> Value {
    let filters: Vec<Value> = query
        .filters
        .iter()
        .map(|f| {
            json!({
                "FieldName": f.field,
                "Operator": f.op.as_str(),
                "Values": [f.value],
            })
        })
        .collect();

    let mut body = json!({
        "where": filters,
        "orderBy": [{
            "fieldName": query.order_by.field,
            "sorttype": if query.order_by.descending { "DESC" } else { "ASC" },
        }],
    });

    if let Some(limit) = query.limit {
        body["pagingInfo"] = json!({ "limit": limit, "offset": 0 });
    }

    body
}

/// Pick the single record out of a create/update response.
fn single_record(collection: Collection, action: &str, resp: MutationResponse) -> Result<Fields> {
    if !resp.success {
        let message = resp
            .message
            .unwrap_or_else(|| format!("failed to {action} {collection} record"));
        return Err(AppError::Store(message));
    }

    let (ok, failed): (Vec<_>, Vec<_>) = resp.results.into_iter().partition(|r| r.success);

    if let Some(first) = failed.first() {
        error!(
            "Failed to {action} {collection}: {} record(s) rejected: {:?}",
            failed.len(),
            failed
        );
        if !first.errors.is_empty() {
            return Err(AppError::Validation(
                first
                    .errors
                    .iter()
                    .map(|e| FieldError::new(e.field_label.clone(), e.message.clone()))
                    .collect(),
            ));
        }
        let message = first
            .message
            .clone()
            .unwrap_or_else(|| format!("{collection} record rejected"));
        return Err(AppError::Store(message));
    }

    ok.into_iter()
        .find_map(|r| r.data)
        .ok_or_else(|| AppError::Store(format!("store returned no {collection} record")))
}

#[async_trait]
impl RecordStore for RemoteStore {
    fn backend(&self) -> &'static str {
        "remote"
    }

    async fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Fields>> {
        let url = format!("{}/query", self.records_url(collection));
        let body = build_query(query);
        let resp: FetchResponse<Vec<Fields>> =
            self.read(|| self.client.post(&url).json(&body)).await?;

        if !resp.success {
            return Err(AppError::Store(resp.message.unwrap_or_else(|| {
                format!("failed to fetch {collection} records")
            })));
        }
        let rows = resp.data.unwrap_or_default();
        debug!("Fetched {} {collection} records", rows.len());
        Ok(rows)
    }

    async fn get(&self, collection: Collection, id: i64) -> Result<Option<Fields>> {
        let url = format!("{}/{id}", self.records_url(collection));
        let resp: FetchResponse<Fields> = self.read(|| self.client.get(&url)).await?;

        if !resp.success {
            return Err(AppError::Store(
                resp.message
                    .unwrap_or_else(|| format!("{collection} record {id} not found")),
            ));
        }
        Ok(resp.data)
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<Fields> {
        let request = self
            .client
            .post(self.records_url(collection))
            .json(&json!({ "records": [fields] }));
        let resp = self.mutate(request).await?;
        single_record(collection, "create", resp)
    }

    async fn update(&self, collection: Collection, id: i64, mut fields: Fields) -> Result<Fields> {
        fields.insert(ID_FIELD.to_string(), Value::from(id));
        let request = self
            .client
            .patch(self.records_url(collection))
            .json(&json!({ "records": [fields] }));
        let resp = self.mutate(request).await?;
        single_record(collection, "update", resp)
    }

    async fn delete(&self, collection: Collection, id: i64) -> Result<bool> {
        let request = self
            .client
            .delete(self.records_url(collection))
            .json(&json!({ "RecordIds": [id] }));
        let resp = self.mutate(request).await?;

        if !resp.success {
            return Err(AppError::Store(
                resp.message
                    .unwrap_or_else(|| format!("failed to delete {collection} record {id}")),
            ));
        }
        let failed: Vec<_> = resp.results.iter().filter(|r| !r.success).collect();
        if let Some(first) = failed.first() {
            error!(
                "Failed to delete {collection}: {} record(s) rejected: {:?}",
                failed.len(),
                failed
            );
            let message = first
                .message
                .clone()
                .unwrap_or_else(|| format!("{collection} record {id} was not deleted"));
            return Err(AppError::Store(message));
        }
        Ok(true)
    }
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
