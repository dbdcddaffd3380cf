use crate::AppState;
use crate::api::error::AppError;
use crate::models::{DataUrlUploadRequest, StagedFileResponse, UploadResponse};
use crate::services::upload_service::{FileSource, MemoryFile};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use validator::Validate;

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = Multipart, description = "Files to stage", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Batch staged", body = UploadResponse),
        (status = 400, description = "No file parts or unreadable multipart body")
    ),
    tag = "files"
)]
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut sources: Vec<Box<dyn FileSource>> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        // Parts without a filename are plain form fields; an empty one is an
        // unused file input.
        let Some(file_name) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Read error: {}", e)))?;
        sources.push(Box::new(MemoryFile::raw(file_name, data)));
    }

    if sources.is_empty() {
        return Err(AppError::BadRequest("No files in upload".to_string()));
    }

    let report = state.stager.stage_batch(sources).await;
    Ok(Json(report.into()))
}

#[utoipa::path(
    post,
    path = "/upload/data-url",
    request_body = DataUrlUploadRequest,
    responses(
        (status = 200, description = "Batch staged", body = UploadResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "files"
)]
pub async fn upload_data_urls(
    State(state): State<AppState>,
    Json(req): Json<DataUrlUploadRequest>,
) -> Result<Json<UploadResponse>, AppError> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let sources: Vec<Box<dyn FileSource>> = req
        .files
        .into_iter()
        .map(|f| Box::new(MemoryFile::data_url(f.name, f.data_url)) as Box<dyn FileSource>)
        .collect();

    let report = state.stager.stage_batch(sources).await;
    Ok(Json(report.into()))
}

#[utoipa::path(
    get,
    path = "/files",
    responses(
        (status = 200, description = "Staged files, sorted by name", body = Vec<StagedFileResponse>)
    ),
    tag = "files"
)]
pub async fn list_files(State(state): State<AppState>) -> Json<Vec<StagedFileResponse>> {
    let files = state.store.list();
    Json(files.iter().map(StagedFileResponse::from).collect())
}

#[utoipa::path(
    get,
    path = "/files/{name}",
    params(
        ("name" = String, Path, description = "Exact file name")
    ),
    responses(
        (status = 200, description = "Raw staged bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Nothing staged under this name")
    ),
    tag = "files"
)]
pub async fn get_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state
        .store
        .get(&name)
        .ok_or_else(|| AppError::NotFound(format!("{} is not staged", name)))?;

    Ok((
        [(header::CONTENT_TYPE, mime::APPLICATION_OCTET_STREAM.as_ref())],
        Body::from(bytes),
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/files",
    responses(
        (status = 204, description = "Staging area cleared")
    ),
    tag = "files"
)]
pub async fn clear_files(State(state): State<AppState>) -> StatusCode {
    state.stager.clear();
    StatusCode::NO_CONTENT
}
