use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use rust_file_stager::config::StagerConfig;
use rust_file_stager::infrastructure::processor::setup_processor;
use rust_file_stager::services::dispatch::DispatchMode;
use rust_file_stager::services::host_bridge::TracingSink;
use rust_file_stager::services::upload_service::{FileSource, LocalFile};
use rust_file_stager::{AppState, create_app};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Stages files and hands them to a processor", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the upload page and the HTTP API
    Serve {
        /// Port for the HTTP server (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Stage local files, dispatch once and print the processor output
    Run {
        /// Files to stage, in selection order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Entry to dispatch instead of the selected one
        #[arg(short, long)]
        entry: Option<String>,

        /// Pass the bytes along with the name
        #[arg(long)]
        inline: bool,

        /// Processor to use (overrides PROCESSOR)
        #[arg(long)]
        processor: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_file_stager=info,guest=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StagerConfig::from_env();

    match args.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(config, port).await,
        Command::Run {
            files,
            entry,
            inline,
            processor,
        } => {
            let mut config = config;
            if let Some(processor) = processor {
                config.processor = processor;
            }
            if inline {
                config.dispatch_mode = DispatchMode::Inline;
            }
            run_once(config, files, entry).await
        }
    }
}

async fn run_once(
    config: StagerConfig,
    files: Vec<PathBuf>,
    entry: Option<String>,
) -> anyhow::Result<()> {
    let processor = setup_processor(&config);
    let mode = config.dispatch_mode;
    let state = AppState::new(config, processor, Arc::new(TracingSink));

    let sources: Vec<Box<dyn FileSource>> = files
        .into_iter()
        .map(|path| Box::new(LocalFile::new(path)) as Box<dyn FileSource>)
        .collect();
    let report = state.stager.stage_batch(sources).await;
    for failed in &report.failed {
        error!("❌ {}", failed.error);
    }

    let receipt = match entry {
        Some(entry) => state.dispatcher.dispatch_entry(&entry, mode).await?,
        None => state.dispatcher.dispatch(mode).await?,
    };
    info!(
        "✅ {} processed '{}' in {}ms",
        receipt.processor, receipt.entry, receipt.elapsed_ms
    );

    for line in state.host.output().snapshot() {
        println!("{}", line);
    }
    Ok(())
}

async fn serve(config: StagerConfig, port: Option<u16>) -> anyhow::Result<()> {
    info!("🚀 Starting Rust File Stager...");

    let port = port.unwrap_or(config.port);
    info!(
        "🛡️  Config: Max Upload={}MB, Processor={}, Mode={}",
        config.max_upload_size / 1024 / 1024,
        config.processor,
        config.dispatch_mode
    );

    let processor = setup_processor(&config);
    let state = AppState::new(config.clone(), processor, Arc::new(TracingSink));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    if config.auto_dispatch {
        let dispatcher = state.dispatcher.clone();
        tokio::spawn(dispatcher.watch_selection(config.dispatch_mode, shutdown_rx));
    }

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    let app = create_app(state).layer(trace_layer);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ Server ready at http://{}", addr);
    info!("📖 Swagger UI: http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
