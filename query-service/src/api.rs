use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use shared::HealthResponse;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::filter::{Filters, MetricsFilter};
use crate::models::{MetricsResponse, TimeSeriesResponse};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Banner {
    pub service: String,
    pub status: String,
    pub message: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
        .route("/api/metrics", get(metrics))
        .route("/api/metrics/time-series", get(time_series))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

pub async fn banner() -> Json<Banner> {
    Json(Banner {
        service: "query-service".to_string(),
        status: "running".to_string(),
        message: "Aggregated order metrics API".to_string(),
    })
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

pub async fn metrics(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filters): Query<Filters>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let filters = filters.normalized();
    let filter = MetricsFilter::parse(&filters)?;
    tracing::debug!(user = ?user.claims.username, ?filter, "metrics request");

    let totals = state.store.totals_by_status(&filter).await?;
    Ok(Json(MetricsResponse::from_totals(filters, &totals)))
}

pub async fn time_series(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filters): Query<Filters>,
) -> Result<Json<TimeSeriesResponse>, ApiError> {
    let filters = filters.normalized();
    let filter = MetricsFilter::parse(&filters)?;
    tracing::debug!(user = ?user.claims.username, ?filter, "time series request");

    let rows = state.store.daily_series(&filter).await?;
    Ok(Json(TimeSeriesResponse::from_rows(filters, &rows)))
}
