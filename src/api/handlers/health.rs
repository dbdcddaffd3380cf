use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub staged_files: usize,
    pub selected: Option<String>,
    pub processor: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        staged_files: state.store.len(),
        selected: state.stager.selection().current(),
        processor: state.dispatcher.processor_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
