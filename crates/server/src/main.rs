//! Cidadão Ativo server entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use cidadao_api::{AppState, auth_middleware, router as api_router};
use cidadao_common::{Config, LocalStorage};
use cidadao_core::{
    AuthService, CatalogService, OfficialService, RequestService, SeedService, StatsService,
    UploadService,
};
use cidadao_db::repositories::{
    CategoryRepository, NeighborhoodRepository, OfficialRepository, RequestRepository,
    UserRepository,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Requests taking longer than this are answered with `408`.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
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
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cidadao=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting cidadao-ativo server...");

    let config = Config::load()?;

    let db = cidadao_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    cidadao_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let official_repo = OfficialRepository::new(Arc::clone(&db));
    let category_repo = CategoryRepository::new(Arc::clone(&db));
    let neighborhood_repo = NeighborhoodRepository::new(Arc::clone(&db));
    let request_repo = RequestRepository::new(Arc::clone(&db));

    if config.database.seed {
        let seeder = SeedService::new(
            category_repo.clone(),
            neighborhood_repo.clone(),
            user_repo.clone(),
            official_repo.clone(),
            request_repo.clone(),
        );
        match seeder.seed().await? {
            Some(summary) => info!(?summary, "Seeded demonstration data"),
            None => info!("Database already populated, skipping seed"),
        }
    }

    let storage = Arc::new(LocalStorage::from_config(&config.upload));

    let state = AppState {
        auth_service: AuthService::new(user_repo.clone(), official_repo.clone(), &config.auth),
        request_service: RequestService::new(
            request_repo.clone(),
            category_repo.clone(),
            neighborhood_repo.clone(),
            official_repo.clone(),
            user_repo,
        ),
        official_service: OfficialService::new(official_repo, StatsService::new(request_repo)),
        catalog_service: CatalogService::new(category_repo, neighborhood_repo),
        upload_service: UploadService::new(storage, config.upload.max_bytes),
    };

    let app = Router::new()
        .nest("/api", api_router())
        .nest_service(&config.upload.base_url, ServeDir::new(&config.upload.path))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(DefaultBodyLimit::max(
            config.upload.max_bytes + MULTIPART_OVERHEAD,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
