pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::StagerConfig;
use crate::services::dispatch::{Dispatcher, Processor};
use crate::services::file_store::{FileStore, InMemoryFileStore};
use crate::services::host_bridge::{HostBridge, LogSink, OutputLog};
use crate::services::selection::EntrySelection;
use crate::services::upload_service::UploadStager;
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::files::upload_files,
        api::handlers::files::upload_data_urls,
        api::handlers::files::list_files,
        api::handlers::files::get_file,
        api::handlers::files::clear_files,
        api::handlers::selection::get_selection,
        api::handlers::selection::select_entry,
        api::handlers::dispatch::emit,
        api::handlers::output::get_output,
        api::handlers::output::clear_output,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::StagedFileResponse,
            models::StagedEntryResponse,
            models::FailedReadResponse,
            models::UploadResponse,
            models::DataUrlFile,
            models::DataUrlUploadRequest,
            models::SelectionResponse,
            models::SelectRequest,
            models::EmitRequest,
            models::OutputResponse,
            services::dispatch::DispatchMode,
            services::dispatch::DispatchReceipt,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "files", description = "Staging uploaded files"),
        (name = "selection", description = "Selected entry"),
        (name = "dispatch", description = "Handing entries to the processor"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FileStore>,
    pub stager: Arc<UploadStager>,
    pub host: Arc<HostBridge>,
    pub dispatcher: Arc<Dispatcher>,
    pub config: StagerConfig,
}

impl AppState {
    /// Wires one session: a fresh in-memory store shared by the stager, the
    /// host bridge and the dispatcher.
    pub fn new(
        config: StagerConfig,
        processor: Arc<dyn Processor>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        let store: Arc<dyn FileStore> = Arc::new(InMemoryFileStore::new());
        let selection = Arc::new(EntrySelection::new());
        let host = Arc::new(HostBridge::new(
            store.clone(),
            sink,
            Arc::new(OutputLog::new()),
        ));
        let stager = Arc::new(UploadStager::new(store.clone(), selection.clone()));
        let dispatcher = Arc::new(Dispatcher::new(
            store.clone(),
            selection,
            host.clone(),
            processor,
        ));

        Self {
            store,
            stager,
            host,
            dispatcher,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::page::index))
        .route("/health", get(api::handlers::health::health_check))
        .route("/upload", post(api::handlers::files::upload_files))
        .route(
            "/upload/data-url",
            post(api::handlers::files::upload_data_urls),
        )
        .route(
            "/files",
            get(api::handlers::files::list_files).delete(api::handlers::files::clear_files),
        )
        .route("/files/*name", get(api::handlers::files::get_file))
        .route(
            "/selection",
            get(api::handlers::selection::get_selection)
                .put(api::handlers::selection::select_entry),
        )
        .route("/emit", post(api::handlers::dispatch::emit))
        .route(
            "/output",
            get(api::handlers::output::get_output).delete(api::handlers::output::clear_output),
        )
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_upload_size,
        ))
        .with_state(state)
}
