mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, StorageConfig, StorageDriver};
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::detections::{
    routes as detections_routes, DetectionService, PgFireReportRepository,
};
use crate::features::volunteers::{
    routes as volunteers_routes, PgVolunteerRepository, SmsOptInScheduler, VolunteerService,
};
use crate::modules::storage::{BlobStore, LocalBlobStore, S3BlobStore};
use crate::modules::vision::GeminiClassifier;
use crate::shared::constants::UPLOADS_URL_PREFIX;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Fail fast on a missing classifier credential instead of at the first upload
    let classifier = Arc::new(
        GeminiClassifier::new(config.classifier.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize classifier: {}", e))?,
    );

    let blob_store = create_blob_store(&config.storage).await?;
    tracing::info!("Blob store ready (backend: {})", blob_store.backend_name());

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    let fire_report_repository = Arc::new(PgFireReportRepository::new(pool.clone()));
    let volunteer_repository = Arc::new(PgVolunteerRepository::new(pool.clone()));

    let scheduler = Arc::new(SmsOptInScheduler::new(
        volunteer_repository.clone(),
        config.sms_opt_in.window,
    ));
    if config.sms_opt_in.rearm_on_startup {
        let restored = scheduler
            .restore()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to restore SMS opt-in expiries: {}", e))?;
        tracing::info!("SMS opt-in scheduler re-armed {} volunteers", restored);
    } else {
        tracing::info!(
            "SMS opt-in scheduler started empty; windows armed before a restart will not expire"
        );
    }

    let detection_service = Arc::new(DetectionService::new(
        classifier.clone(),
        blob_store.clone(),
        fire_report_repository,
    ));
    let volunteer_service = Arc::new(VolunteerService::new(
        classifier,
        blob_store,
        volunteer_repository,
        scheduler,
    ));
    tracing::info!("Detection and volunteer services initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi))
    };

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let mut app = Router::new()
        .merge(swagger)
        .merge(detections_routes(detection_service))
        .merge(volunteers_routes(volunteer_service))
        .merge(health_route);

    if config.storage.driver == StorageDriver::Local {
        app = app.nest_service(
            UPLOADS_URL_PREFIX,
            ServeDir::new(&config.storage.upload_dir),
        );
    }

    let app = app
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let listener = bind_listener(&addr)?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/docs/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn create_blob_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    match config.driver {
        StorageDriver::Local => {
            tracing::info!(
                "Local blob store rooted at {}",
                config.upload_dir.display()
            );
            Ok(Arc::new(LocalBlobStore::new(config.upload_dir.clone())))
        }
        StorageDriver::S3 => {
            let s3_config = config
                .s3
                .clone()
                .ok_or_else(|| anyhow::anyhow!("S3 storage selected but not configured"))?;
            let store = S3BlobStore::new(s3_config)
                .map_err(|e| anyhow::anyhow!("Failed to initialize S3 blob store: {}", e))?;
            store.ensure_bucket_exists().await;
            tracing::info!("S3 blob store initialized for bucket: {}", store.bucket_name());
            Ok(Arc::new(store))
        }
    }
}

/// TCP listener tuned with socket2
fn bind_listener(addr: &str) -> anyhow::Result<tokio::net::TcpListener> {
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}
