//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use farm_metrics::{compute_projection, FarmInputs, ProjectionResult, RawFarmInputs};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::accessor::CollectionAccessor;
use crate::errors::AppError;
use crate::leads::{LeadIntake, LeadSubmission};
use crate::records::{CollectionRecord, Product, Resource, Testimonial};
use crate::store::RecordStore;
use crate::weather::{WeatherProvider, WeatherReading, WeatherSnapshot};

const DEFAULT_DAYS: u32 = 7;
const MAX_DAYS: u32 = 30;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn RecordStore>,
    pub weather: Arc<WeatherProvider>,
    /// Latest snapshot published by the weather monitor.
    pub latest_weather: watch::Receiver<Option<WeatherSnapshot>>,
}

/// Build the full application router.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/roi", post(compute_roi))
        .route(
            "/products",
            get(list_records::<Product>).post(create_record::<Product>),
        )
        .route(
            "/products/:id",
            get(get_record::<Product>)
                .patch(update_record::<Product>)
                .delete(delete_record::<Product>),
        )
        .route(
            "/testimonials",
            get(list_records::<Testimonial>).post(create_record::<Testimonial>),
        )
        .route(
            "/testimonials/:id",
            get(get_record::<Testimonial>)
                .patch(update_record::<Testimonial>)
                .delete(delete_record::<Testimonial>),
        )
        .route(
            "/resources",
            get(list_resources).post(create_record::<Resource>),
        )
        .route(
            "/resources/:id",
            get(get_record::<Resource>)
                .patch(update_record::<Resource>)
                .delete(delete_record::<Resource>),
        )
        .route("/leads", get(list_leads).post(submit_lead))
        .route("/leads/:id", get(get_lead).delete(delete_lead))
        .route("/leads/:id/status", patch(update_lead_status))
        .route("/weather/current", get(current_weather))
        .route("/weather/forecast", get(weather_forecast))
        .route("/weather/history", get(weather_history))
        .route("/weather/records", post(record_weather))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub count: usize,
    pub records: Vec<T>,
}

#[derive(Serialize)]
pub struct RoiResponse {
    pub inputs: FarmInputs,
    pub projection: ProjectionResult,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryFilter {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DaysParam {
    pub days: Option<u32>,
}

impl DaysParam {
    fn days(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_DAYS).min(MAX_DAYS)
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

fn list_response<T: Serialize>(records: Vec<T>) -> Response {
    Json(ListResponse {
        count: records.len(),
        records,
    })
    .into_response()
}

/// Map an error to a response. Only field-level messages are shown verbatim;
/// store detail has already been logged where it occurred.
fn error_response(err: AppError) -> Response {
    if err.is_store_failure() {
        warn!("Request failed against the record store: {err}");
    }
    match err {
        AppError::Validation(fields) => {
            let fields: serde_json::Map<String, Value> = fields
                .into_iter()
                .map(|f| (f.field, Value::String(f.message)))
                .collect();
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": "validation failed", "fields": fields })),
            )
                .into_response()
        }
        AppError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "not available".to_string(),
            }),
        )
            .into_response(),
        AppError::Config(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "service is misconfigured".to_string(),
            }),
        )
            .into_response(),
        AppError::Store(_) | AppError::Http(_) | AppError::Json(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "the record store is unavailable, please try again".to_string(),
            }),
        )
            .into_response(),
    }
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store: state.store.backend(),
    })
}

/// `POST /roi`
///
/// Accepts numbers or free text for every numeric field; unreadable values
/// count as zero.
pub async fn compute_roi(Json(raw): Json<RawFarmInputs>) -> impl IntoResponse {
    let inputs = FarmInputs::from_raw(&raw);
    Json(RoiResponse {
        inputs,
        projection: compute_projection(&inputs),
    })
}

/// `GET /{collection}`
pub async fn list_records<T: CollectionRecord>(State(state): State<Arc<ApiState>>) -> Response {
    list_response(CollectionAccessor::<T>::new(state.store.clone()).list().await)
}

/// `GET /{collection}/:id`
pub async fn get_record<T: CollectionRecord>(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Response {
    match CollectionAccessor::<T>::new(state.store.clone())
        .get_by_id(id)
        .await
    {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /{collection}`
pub async fn create_record<T: CollectionRecord>(
    State(state): State<Arc<ApiState>>,
    Json(draft): Json<T::Draft>,
) -> Response {
    match CollectionAccessor::<T>::new(state.store.clone())
        .create(&draft)
        .await
    {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => error_response(e),
    }
}

/// `PATCH /{collection}/:id`
pub async fn update_record<T: CollectionRecord>(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
    Json(patch): Json<T::Patch>,
) -> Response {
    match CollectionAccessor::<T>::new(state.store.clone())
        .update(id, &patch)
        .await
    {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(e),
    }
}

/// `DELETE /{collection}/:id`
pub async fn delete_record<T: CollectionRecord>(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Response {
    match CollectionAccessor::<T>::new(state.store.clone())
        .delete(id)
        .await
    {
        Ok(deleted) => Json(json!({ "deleted": deleted })).into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /resources?category=`
pub async fn list_resources(
    State(state): State<Arc<ApiState>>,
    Query(filter): Query<CategoryFilter>,
) -> Response {
    let resources = CollectionAccessor::<Resource>::new(state.store.clone());
    let records = match filter.category.as_deref().map(str::trim) {
        Some(category) if !category.is_empty() => resources.by_category(category).await,
        _ => resources.list().await,
    };
    list_response(records)
}

/// `POST /leads`
pub async fn submit_lead(
    State(state): State<Arc<ApiState>>,
    Json(submission): Json<LeadSubmission>,
) -> Response {
    match LeadIntake::new(state.store.clone())
        .submit_lead(&submission)
        .await
    {
        Ok(lead) => (StatusCode::CREATED, Json(lead)).into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /leads`
pub async fn list_leads(State(state): State<Arc<ApiState>>) -> Response {
    list_response(LeadIntake::new(state.store.clone()).list().await)
}

/// `GET /leads/:id`
pub async fn get_lead(State(state): State<Arc<ApiState>>, Path(id): Path<i64>) -> Response {
    match LeadIntake::new(state.store.clone()).get(id).await {
        Ok(lead) => Json(lead).into_response(),
        Err(e) => error_response(e),
    }
}

/// `PATCH /leads/:id/status`
pub async fn update_lead_status(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> Response {
    match LeadIntake::new(state.store.clone())
        .update_status(id, &update.status)
        .await
    {
        Ok(lead) => Json(lead).into_response(),
        Err(e) => error_response(e),
    }
}

/// `DELETE /leads/:id`
pub async fn delete_lead(State(state): State<Arc<ApiState>>, Path(id): Path<i64>) -> Response {
    match LeadIntake::new(state.store.clone()).delete(id).await {
        Ok(deleted) => Json(json!({ "deleted": deleted })).into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /weather/current`
///
/// Serves the monitor's latest snapshot, fetching directly before the first
/// refresh has been published.
pub async fn current_weather(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let published = state.latest_weather.borrow().clone();
    let snapshot = match published {
        Some(snapshot) => snapshot,
        None => state.weather.get_current_snapshot().await,
    };
    Json(snapshot)
}

/// `GET /weather/forecast?days=`
pub async fn weather_forecast(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<DaysParam>,
) -> impl IntoResponse {
    Json(state.weather.get_forecast(params.days()))
}

/// `GET /weather/history?days=`
pub async fn weather_history(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<DaysParam>,
) -> impl IntoResponse {
    Json(state.weather.get_historical_data(params.days()).await)
}

/// `POST /weather/records`
pub async fn record_weather(
    State(state): State<Arc<ApiState>>,
    Json(reading): Json<WeatherReading>,
) -> Response {
    match state.weather.record_snapshot(reading).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => error_response(e),
    }
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
