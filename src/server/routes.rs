//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::analytics::{
    AnalysisOutcome, ClusteringReport, CorrelationReport, DistrictSurface, ExtremeEventsReport,
    Metadata, RankingReport, RegionSnapshot, TimeSeriesReport,
};
use crate::error::Error;
use crate::model::{normalize_name, GeoKey};
use crate::server::state::AppState;
use crate::store::EmissionRepository;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::error;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_path = static_dir();

    Router::new()
        .route("/api/metadata", get(metadata_handler))
        .route("/api/states", get(states_handler))
        .route("/api/districts/:state", get(districts_handler))
        .route("/api/india/:year/:month", get(india_handler))
        .route("/api/state/:state/:year/:month", get(state_handler))
        .route(
            "/api/district/:state/:district/:year/:month",
            get(district_handler),
        )
        .route(
            "/api/analytics/timeseries/:state/:district",
            get(timeseries_handler),
        )
        .route("/api/analytics/clustering/:state", get(clustering_handler))
        .route("/api/analytics/ranking/:year/:month", get(ranking_handler))
        .route("/api/analytics/correlation/:state", get(correlation_handler))
        .route(
            "/api/analytics/extremes/:state/:district",
            get(extremes_handler),
        )
        .fallback_service(ServeDir::new(static_path).append_index_html_on_directories(true))
        .with_state(state)
}

/// Static client assets: `static/` in the working directory, else next to the binary
fn static_dir() -> PathBuf {
    let local = PathBuf::from("static");
    if local.exists() {
        return local;
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("static")))
        .filter(|path| path.exists())
        .unwrap_or(local)
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::InvalidPeriod(_) => (StatusCode::BAD_REQUEST, "INVALID_PERIOD"),
            Error::Precondition(_) => (StatusCode::BAD_REQUEST, "PRECONDITION_FAILED"),
            Error::InvalidSample(_) => (StatusCode::BAD_REQUEST, "INVALID_SAMPLE"),
            Error::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        if status.is_server_error() {
            error!("Request failed: {}", err);
        }
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
            status,
        }
    }
}

/// Dataset coverage
///
/// GET /api/metadata
async fn metadata_handler(State(state): State<Arc<AppState>>) -> ApiResult<Metadata> {
    Ok(Json(state.service.get_metadata()?))
}

/// States list response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatesResponse {
    pub states: Vec<String>,
    pub count: usize,
}

/// List states with data
///
/// GET /api/states
async fn states_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatesResponse> {
    let states = state.service.repository().states()?;
    Ok(Json(StatesResponse {
        count: states.len(),
        states,
    }))
}

/// Districts list response
#[derive(Debug, Serialize, Deserialize)]
pub struct DistrictsResponse {
    pub state: String,
    pub districts: Vec<String>,
    pub count: usize,
}

/// List districts of a state
///
/// GET /api/districts/:state
async fn districts_handler(
    State(state): State<Arc<AppState>>,
    Path(state_name): Path<String>,
) -> ApiResult<DistrictsResponse> {
    let districts = state.service.repository().districts(&state_name)?;
    Ok(Json(DistrictsResponse {
        state: normalize_name(&state_name),
        count: districts.len(),
        districts,
    }))
}

/// Per-state snapshot of India
///
/// GET /api/india/:year/:month
async fn india_handler(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<AnalysisOutcome<RegionSnapshot>> {
    Ok(Json(
        state
            .service
            .get_region_snapshot(&GeoKey::Nation, year, month)?,
    ))
}

/// Per-district snapshot of a state
///
/// GET /api/state/:state/:year/:month
async fn state_handler(
    State(state): State<Arc<AppState>>,
    Path((state_name, year, month)): Path<(String, i32, u32)>,
) -> ApiResult<AnalysisOutcome<RegionSnapshot>> {
    Ok(Json(state.service.get_region_snapshot(
        &GeoKey::state(&state_name),
        year,
        month,
    )?))
}

/// Raw points and interpolated surface of a district
///
/// GET /api/district/:state/:district/:year/:month
async fn district_handler(
    State(state): State<Arc<AppState>>,
    Path((state_name, district, year, month)): Path<(String, String, i32, u32)>,
) -> ApiResult<AnalysisOutcome<DistrictSurface>> {
    Ok(Json(state.service.get_district_surface(
        &state_name,
        &district,
        year,
        month,
    )?))
}

/// GET /api/analytics/timeseries/:state/:district
async fn timeseries_handler(
    State(state): State<Arc<AppState>>,
    Path((state_name, district)): Path<(String, String)>,
) -> ApiResult<AnalysisOutcome<TimeSeriesReport>> {
    Ok(Json(state.service.get_timeseries(&state_name, &district)?))
}

/// GET /api/analytics/clustering/:state
async fn clustering_handler(
    State(state): State<Arc<AppState>>,
    Path(state_name): Path<String>,
) -> ApiResult<AnalysisOutcome<ClusteringReport>> {
    Ok(Json(state.service.get_clustering(&state_name)?))
}

/// GET /api/analytics/ranking/:year/:month
async fn ranking_handler(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<RankingReport> {
    Ok(Json(state.service.get_ranking(year, month)?))
}

/// GET /api/analytics/correlation/:state
async fn correlation_handler(
    State(state): State<Arc<AppState>>,
    Path(state_name): Path<String>,
) -> ApiResult<AnalysisOutcome<CorrelationReport>> {
    Ok(Json(state.service.get_correlation(&state_name)?))
}

/// Extreme events query parameters
#[derive(Debug, Deserialize)]
pub struct ExtremesQuery {
    /// Threshold percentile in (0, 100]; configured default when absent
    pub percentile: Option<f64>,
}

/// GET /api/analytics/extremes/:state/:district?percentile=N
async fn extremes_handler(
    State(state): State<Arc<AppState>>,
    Path((state_name, district)): Path<(String, String)>,
    Query(query): Query<ExtremesQuery>,
) -> ApiResult<AnalysisOutcome<ExtremeEventsReport>> {
    Ok(Json(state.service.get_extreme_events(
        &state_name,
        &district,
        query.percentile,
    )?))
}
