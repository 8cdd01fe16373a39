//! HTTP API server with observability for the beverage machine.
//!
//! Provides REST endpoints for browsing beverages, preparing them, and
//! maintaining ingredient stock, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::CatalogService;
use ledger::{Ledger, LedgerError, PostgresLedger};
use metrics_exporter_prometheus::{BuildError, PrometheusHandle};
use preparation::{InMemoryPaymentGate, PreparationCoordinator};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Metrics recorder error: {0}")]
    Metrics(#[from] BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<L: Ledger + 'static>(
    state: Arc<AppState<L>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<L>))
        .route("/beverages", get(routes::beverages::list::<L>))
        .route("/beverages/{id}", get(routes::beverages::get::<L>))
        .route(
            "/beverages/{id}/prepare",
            post(routes::beverages::prepare::<L>),
        )
        .route(
            "/ingredients",
            get(routes::ingredients::list::<L>).patch(routes::ingredients::adjust::<L>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over a ledger, with an in-memory payment
/// gate that authorizes every payment.
pub fn create_default_state<L: Ledger + Clone + 'static>(
    ledger: L,
    machine_id: impl Into<String>,
) -> Arc<AppState<L>> {
    let catalog = CatalogService::new(ledger.clone());
    let coordinator = PreparationCoordinator::new(ledger, InMemoryPaymentGate::new());

    Arc::new(AppState {
        catalog,
        coordinator,
        machine_id: machine_id.into(),
    })
}

/// Connects to Postgres, applies migrations, and installs the default catalog.
pub async fn connect_postgres(database_url: &str) -> Result<PostgresLedger, ServerError> {
    let ledger = PostgresLedger::connect(database_url).await?;
    ledger.run_migrations().await?;
    ledger::seed_defaults(&ledger).await?;
    Ok(ledger)
}
