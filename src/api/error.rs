use crate::services::dispatch::DispatchError;
use crate::services::upload_service::StageError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Staging error: {0}")]
    Stage(#[from] StageError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Stage(e) => match e {
                StageError::NotStaged(_) => (StatusCode::NOT_FOUND, e.to_string()),
                StageError::Read { .. } | StageError::Decode { .. } => {
                    (StatusCode::BAD_REQUEST, e.to_string())
                }
            },
            AppError::Dispatch(e) => match e {
                DispatchError::NothingSelected => (StatusCode::CONFLICT, e.to_string()),
                DispatchError::Processor { .. } => {
                    tracing::error!("Dispatch error: {:?}", e);
                    (StatusCode::BAD_GATEWAY, e.to_string())
                }
            },
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
