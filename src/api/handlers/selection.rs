use crate::AppState;
use crate::api::error::AppError;
use crate::models::{SelectRequest, SelectionResponse};
use axum::{Json, extract::State};
use validator::Validate;

fn selection_response(state: &AppState) -> SelectionResponse {
    let selection = state.stager.selection();
    let snapshot = selection.snapshot();
    SelectionResponse {
        selected: snapshot.name,
        revision: snapshot.revision,
        uploaded: selection.uploaded(),
    }
}

#[utoipa::path(
    get,
    path = "/selection",
    responses(
        (status = 200, description = "Selected entry and uploaded names", body = SelectionResponse)
    ),
    tag = "selection"
)]
pub async fn get_selection(State(state): State<AppState>) -> Json<SelectionResponse> {
    Json(selection_response(&state))
}

#[utoipa::path(
    put,
    path = "/selection",
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Entry selected", body = SelectionResponse),
        (status = 404, description = "Nothing staged under this name")
    ),
    tag = "selection"
)]
pub async fn select_entry(
    State(state): State<AppState>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state.stager.select(&req.name)?;
    Ok(Json(selection_response(&state)))
}
