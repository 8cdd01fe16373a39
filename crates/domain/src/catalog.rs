//! Read-only catalog queries for display.
//!
//! These run outside the preparation lock and may observe stock that is about
//! to change. They must never feed a decrement decision.

use ledger::{Beverage, BeverageId, Ingredient, IngredientId, Ledger};
use serde::Serialize;

use crate::availability::{Availability, compute_availability};
use crate::error::DomainError;

/// A beverage together with the availability of its base recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeverageView {
    pub beverage: Beverage,
    pub availability: Availability,
}

/// Service for display queries over the ledger.
pub struct CatalogService<L: Ledger> {
    ledger: L,
}

impl<L: Ledger> CatalogService<L> {
    /// Creates a new catalog service over the given ledger.
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Lists every beverage, ordered by name, with its current availability.
    #[tracing::instrument(skip(self))]
    pub async fn list_beverages(&self) -> Result<Vec<BeverageView>, DomainError> {
        let beverages = self.ledger.list_beverages().await?;

        let mut ids: Vec<IngredientId> = beverages
            .iter()
            .flat_map(|b| b.recipe.iter().map(|l| l.ingredient_id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        let snapshot = self.ledger.fetch_ingredients_by_ids(&ids).await?;

        Ok(beverages
            .into_iter()
            .map(|beverage| BeverageView {
                availability: compute_availability(&beverage.recipe, &snapshot),
                beverage,
            })
            .collect())
    }

    /// Loads one beverage with its current availability.
    #[tracing::instrument(skip(self))]
    pub async fn get_beverage(&self, id: BeverageId) -> Result<Option<BeverageView>, DomainError> {
        let Some(beverage) = self.ledger.fetch_beverage_with_recipe(id).await? else {
            return Ok(None);
        };

        let ids: Vec<IngredientId> = beverage.recipe.iter().map(|l| l.ingredient_id).collect();
        let snapshot = self.ledger.fetch_ingredients_by_ids(&ids).await?;

        Ok(Some(BeverageView {
            availability: compute_availability(&beverage.recipe, &snapshot),
            beverage,
        }))
    }

    /// Lists all ingredients with their stock, ordered by name.
    #[tracing::instrument(skip(self))]
    pub async fn list_ingredients(&self) -> Result<Vec<Ingredient>, DomainError> {
        Ok(self.ledger.list_ingredients().await?)
    }
}
