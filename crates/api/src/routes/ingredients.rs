//! Ingredient maintenance endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use ledger::{Ingredient, Ledger, StockAdjustment};
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct AdjustBody {
    pub changes: Vec<StockAdjustment>,
}

/// GET /ingredients lists all ingredients with their stock, ordered by name.
#[tracing::instrument(skip(state))]
pub async fn list<L: Ledger + 'static>(
    State(state): State<Arc<AppState<L>>>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    Ok(Json(state.catalog.list_ingredients().await?))
}

/// PATCH /ingredients applies set/increment/decrement changes atomically.
///
/// Either every change is applied or none is.
#[tracing::instrument(skip(state, body), fields(changes = body.changes.len()))]
pub async fn adjust<L: Ledger + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Json(body): Json<AdjustBody>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    if body.changes.is_empty() {
        return Err(ApiError::BadRequest(
            "changes must contain at least one entry".to_string(),
        ));
    }
    if let Some(change) = body.changes.iter().find(|c| !c.id.is_valid()) {
        return Err(ApiError::BadRequest(format!(
            "ingredient id must be positive, got {}",
            change.id
        )));
    }

    let ingredients = state.coordinator.adjust_stock(body.changes).await?;
    Ok(Json(ingredients))
}
