use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use eventhub_events::{EmailConfig, LogMailer, Mailer, NotificationBus, NotificationDispatcher, SmtpMailer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventhub_api::config::ServerConfig;
use eventhub_api::router::build_app_router;
use eventhub_api::state::AppState;
use eventhub_api::storage::ProofStorage;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventhub_api=debug,eventhub_events=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = eventhub_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    eventhub_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    eventhub_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Notifications ---
    let mailer = build_mailer();
    let bus = Arc::new(NotificationBus::default());
    let dispatcher = NotificationDispatcher::new(
        mailer,
        Duration::from_secs(config.notification_timeout_secs),
    );
    let dispatcher_handle = tokio::spawn(dispatcher.run(bus.subscribe()));
    tracing::info!("Notification dispatcher started");

    // --- Proof storage ---
    let proofs = Arc::new(ProofStorage::new(config.upload_dir.clone(), config.max_proof_bytes));
    tracing::info!(dir = %config.upload_dir.display(), "Proof storage ready");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        bus: Arc::clone(&bus),
        proofs,
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

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, draining notifications");

    // The router (and every AppState clone holding the bus) is gone once
    // serve returns; dropping the last handle closes the channel.
    drop(bus);
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, dispatcher_handle).await.is_err() {
        tracing::warn!(timeout_secs = config.shutdown_timeout_secs, "Notification dispatcher did not drain in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// SMTP when configured, otherwise a mailer that only logs.
fn build_mailer() -> Arc<dyn Mailer> {
    match EmailConfig::from_env() {
        Some(email_config) => match SmtpMailer::new(&email_config) {
            Ok(mailer) => {
                tracing::info!(host = %email_config.smtp_host, "SMTP delivery enabled");
                Arc::new(mailer)
            }
            Err(e) => {
                tracing::error!(error = %e, "Invalid SMTP configuration, falling back to log-only mailer");
                Arc::new(LogMailer)
            }
        },
        None => {
            tracing::info!("SMTP_HOST not set, notifications are logged only");
            Arc::new(LogMailer)
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
