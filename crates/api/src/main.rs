//! API server entry point.

use api::ServerError;
use api::config::Config;
use ledger::InMemoryLedger;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // 3. Open the ledger and build the application
    let app = match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!("using Postgres ledger");
            let ledger = api::connect_postgres(url).await?;
            api::create_app(
                api::create_default_state(ledger, config.machine_id.clone()),
                metrics_handle,
            )
        }
        None => {
            tracing::info!("DATABASE_URL not set, using seeded in-memory ledger");
            let ledger = InMemoryLedger::new();
            ledger::seed_defaults(&ledger).await?;
            api::create_app(
                api::create_default_state(ledger, config.machine_id.clone()),
                metrics_handle,
            )
        }
    };

    // 4. Start server
    let addr = config.addr();
    tracing::info!(%addr, machine_id = %config.machine_id, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}
