use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use shared::HealthResponse;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub success: bool,
    pub message: String,
    pub inserted: usize,
    pub total: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub timestamp: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/trigger", post(trigger))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http())
}

pub async fn trigger(State(state): State<AppState>) -> (StatusCode, Json<PipelineResponse>) {
    tracing::info!("Pipeline triggered via HTTP");
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    match state.pipeline.run().await {
        Ok(run) => (
            StatusCode::OK,
            Json(PipelineResponse {
                success: true,
                message: "Pipeline executed successfully".to_string(),
                inserted: run.report.inserted,
                total: run.total,
                duplicates: run.report.duplicates,
                failed: run.report.failures.len(),
                timestamp,
            }),
        ),
        Err(e) => {
            tracing::error!("Pipeline failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(PipelineResponse {
                    success: false,
                    message: format!("Pipeline failed: {}", e),
                    inserted: 0,
                    total: 0,
                    duplicates: 0,
                    failed: 0,
                    timestamp,
                }),
            )
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
