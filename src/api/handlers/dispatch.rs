use crate::AppState;
use crate::api::error::AppError;
use crate::models::EmitRequest;
use crate::services::dispatch::DispatchReceipt;
use axum::{Json, body::Bytes, extract::State};

#[utoipa::path(
    post,
    path = "/emit",
    request_body = EmitRequest,
    responses(
        (status = 200, description = "Entry handed to the processor", body = DispatchReceipt),
        (status = 400, description = "Malformed request body"),
        (status = 409, description = "No entry selected"),
        (status = 502, description = "Processor failed")
    ),
    tag = "dispatch"
)]
pub async fn emit(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DispatchReceipt>, AppError> {
    // An empty body dispatches the selected entry with the configured mode.
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        EmitRequest::default()
    } else {
        serde_json::from_slice::<EmitRequest>(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid emit request: {}", e)))?
    };
    let mode = req.mode.unwrap_or(state.config.dispatch_mode);

    let receipt = match req.entry {
        Some(entry) => state.dispatcher.dispatch_entry(&entry, mode).await?,
        None => state.dispatcher.dispatch(mode).await?,
    };
    Ok(Json(receipt))
}
