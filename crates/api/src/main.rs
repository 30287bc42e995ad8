use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rms_api::auth::bootstrap::ensure_admin;
use rms_api::config::ServerConfig;
use rms_api::router::build_app_router;
use rms_api::session::registry::SessionRegistry;
use rms_api::state::AppState;
use rms_cloud::{MemoryStorage, ObjectStore, S3Config, S3Storage};
use rms_core::crypto::SessionCipher;
use rms_events::Mailer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rms_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = rms_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    rms_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    rms_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Admin bootstrap ---
    if let (Ok(email), Ok(password)) = (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
        ensure_admin(&pool, &email, &password)
            .await
            .expect("Failed to bootstrap admin account");
    }

    // --- Object storage ---
    let storage: Option<Arc<dyn ObjectStore>> = match S3Config::from_env() {
        Some(s3) => Some(Arc::new(S3Storage::connect(s3).await)),
        None => match std::env::var("MEMORY_STORAGE_URL") {
            Ok(base_url) => {
                tracing::warn!(%base_url, "Using in-memory object storage; files are lost on restart");
                Some(Arc::new(MemoryStorage::new(base_url)))
            }
            Err(_) => {
                tracing::warn!("S3_BUCKET not set; uploads will fail with 502");
                None
            }
        },
    };

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cipher: Arc::new(SessionCipher::from_secret(&config.session.secret)),
        sessions: Arc::new(SessionRegistry::new()),
        storage,
        mailer: Arc::new(Mailer::from_env()),
        http: reqwest::Client::new(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
