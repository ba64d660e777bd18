// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum_prometheus::PrometheusMetricLayer;
use cyber_assessment::config::Config;
use cyber_assessment::repositories::{PgQuestionCatalog, PgResultRepository};
use cyber_assessment::routes;
use cyber_assessment::services::{ResultStore, SubmissionService};
use cyber_assessment::state::AppState;
use cyber_assessment::utils::telemetry::{TelemetrySink, spawn_metrics_scraper};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    // Metrics recorder + HTTP layer
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();

    // The result store lives for the whole process and is shared by every request.
    let store = ResultStore::new();
    let submissions = SubmissionService::new(
        Arc::new(PgQuestionCatalog::new(pool.clone())),
        Arc::new(PgResultRepository::new(pool.clone())),
        Arc::new(TelemetrySink),
        store.clone(),
    )
    .with_scoring(config.scoring())
    .with_timeout(config.request_timeout());

    let _scraper = spawn_metrics_scraper(
        prometheus_handle.clone(),
        store,
        config.scrape_interval(),
    );

    // Create AppState
    let state = AppState {
        submissions,
        config: config.clone(),
        metrics: Some(prometheus_handle),
    };

    // Create the Axum application router
    let app = routes::create_router(state).layer(prometheus_layer);

    // Bind to the listening address
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .expect("BIND_ADDR must be a socket address");
    tracing::info!("Cyber Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}
