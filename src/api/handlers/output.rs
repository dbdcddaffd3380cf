use crate::AppState;
use crate::models::OutputResponse;
use axum::{Json, extract::State, http::StatusCode};

#[utoipa::path(
    get,
    path = "/output",
    responses(
        (status = 200, description = "Lines reported by the processor", body = OutputResponse)
    ),
    tag = "dispatch"
)]
pub async fn get_output(State(state): State<AppState>) -> Json<OutputResponse> {
    Json(OutputResponse {
        lines: state.host.output().snapshot(),
    })
}

#[utoipa::path(
    delete,
    path = "/output",
    responses(
        (status = 204, description = "Output list cleared")
    ),
    tag = "dispatch"
)]
pub async fn clear_output(State(state): State<AppState>) -> StatusCode {
    state.host.output().clear();
    StatusCode::NO_CONTENT
}
