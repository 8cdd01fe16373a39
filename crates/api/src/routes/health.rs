//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use ledger::Ledger;
use serde::Serialize;

use crate::routes::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub machine_id: String,
}

/// GET /health returns liveness and the machine identifier.
pub async fn check<L: Ledger + 'static>(
    State(state): State<Arc<AppState<L>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        machine_id: state.machine_id.clone(),
    })
}
