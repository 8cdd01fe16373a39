//! Beverage listing and preparation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{BeverageId, Money};
use domain::{BeverageView, StockShortage};
use ledger::{Ledger, RecipeLine};
use preparation::{PrepareRequest, PrepareResult};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct PrepareBody {
    #[serde(default)]
    pub sugar: Option<u32>,
    #[serde(default)]
    pub shots: Option<u32>,
    #[serde(default)]
    pub payment_ref: String,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct BeverageResponse {
    pub id: BeverageId,
    pub name: String,
    pub price: String,
    pub price_cents: i64,
    pub recipe: Vec<RecipeLine>,
    pub available: bool,
    pub shortages: Vec<StockShortage>,
}

impl BeverageResponse {
    fn from_view(view: BeverageView) -> Self {
        let price: Money = view.beverage.price;
        Self {
            id: view.beverage.id,
            name: view.beverage.name,
            price: price.to_string(),
            price_cents: price.cents(),
            recipe: view.beverage.recipe,
            available: view.availability.can_prepare,
            shortages: view.availability.shortages,
        }
    }
}

pub(crate) fn parse_beverage_id(raw: i64) -> Result<BeverageId, ApiError> {
    BeverageId::parse(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// -- Handlers --

/// GET /beverages lists every beverage with its current availability.
#[tracing::instrument(skip(state))]
pub async fn list<L: Ledger + 'static>(
    State(state): State<Arc<AppState<L>>>,
) -> Result<Json<Vec<BeverageResponse>>, ApiError> {
    let views = state.catalog.list_beverages().await?;
    Ok(Json(
        views.into_iter().map(BeverageResponse::from_view).collect(),
    ))
}

/// GET /beverages/{id} returns one beverage with its recipe and availability.
#[tracing::instrument(skip(state))]
pub async fn get<L: Ledger + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Path(id): Path<i64>,
) -> Result<Json<BeverageResponse>, ApiError> {
    let id = parse_beverage_id(id)?;
    let view = state
        .catalog
        .get_beverage(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Beverage {id} not found")))?;
    Ok(Json(BeverageResponse::from_view(view)))
}

/// POST /beverages/{id}/prepare prepares one beverage and decrements stock.
#[tracing::instrument(skip(state, body))]
pub async fn prepare<L: Ledger + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Path(id): Path<i64>,
    Json(body): Json<PrepareBody>,
) -> Result<Json<PrepareResult>, ApiError> {
    let id = parse_beverage_id(id)?;
    let request = PrepareRequest {
        beverage_id: id,
        sugar_grams: body.sugar,
        shots: body.shots,
        payment_ref: body.payment_ref,
    };

    let result = state.coordinator.prepare(request).await?;
    Ok(Json(result))
}
