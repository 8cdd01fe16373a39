use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use crate::error::{LedgerError, Result};
use crate::model::{Beverage, Ingredient, NewBeverage, StockAdjustment, StockDecrement};
use crate::{BeverageId, IngredientId};

/// Core trait for ledger implementations.
///
/// A ledger persists ingredient stock and beverage recipes. All implementations
/// must be thread-safe (Send + Sync) and must never let stock go negative,
/// whatever the caller has already verified.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Loads a beverage together with its base recipe.
    ///
    /// Returns None if no beverage has the given id.
    async fn fetch_beverage_with_recipe(&self, id: BeverageId) -> Result<Option<Beverage>>;

    /// Loads the current stock for a set of ingredients.
    ///
    /// Unknown ids are absent from the returned map.
    async fn fetch_ingredients_by_ids(
        &self,
        ids: &[IngredientId],
    ) -> Result<HashMap<IngredientId, Ingredient>>;

    /// Looks up an ingredient by name, compared case-insensitively.
    async fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>>;

    /// Decrements stock for every line in a single commit-or-abort operation.
    ///
    /// Lines naming the same ingredient are summed before the check. If any
    /// ingredient is unknown or would go negative, nothing is changed.
    async fn atomic_decrement(&self, lines: &[StockDecrement]) -> Result<()>;

    /// Lists all beverages with their recipes, ordered by name.
    async fn list_beverages(&self) -> Result<Vec<Beverage>>;

    /// Lists all ingredients, ordered by name.
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>>;

    /// Applies maintenance adjustments atomically, in order.
    ///
    /// Later changes observe earlier ones on the same ingredient. Returns the
    /// full ingredient list after the changes, ordered by name.
    async fn adjust_stock(&self, changes: &[StockAdjustment]) -> Result<Vec<Ingredient>>;
}

/// Registration of catalog entries (ingredients and beverages).
///
/// Kept apart from [`Ledger`] because it is only used for seeding and tests,
/// never by the preparation pipeline.
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    /// Registers a new ingredient with an initial stock level.
    async fn add_ingredient(&self, name: &str, stock_units: u32) -> Result<IngredientId>;

    /// Registers a new beverage. Every recipe line must reference an existing ingredient.
    async fn add_beverage(&self, beverage: NewBeverage) -> Result<BeverageId>;
}

/// Sums decrement quantities per ingredient.
///
/// Totals are widened to u64 so that many lines on one ingredient cannot
/// overflow before the stock comparison.
pub fn total_by_ingredient(lines: &[StockDecrement]) -> BTreeMap<IngredientId, u64> {
    let mut totals = BTreeMap::new();
    for line in lines {
        *totals.entry(line.ingredient_id).or_insert(0u64) += u64::from(line.quantity);
    }
    totals
}

/// Checks a single aggregated decrement against the available stock and
/// returns the remaining level.
pub fn remaining_after(ingredient_id: IngredientId, available: u32, requested: u64) -> Result<u32> {
    u64::from(available)
        .checked_sub(requested)
        .and_then(|left| u32::try_from(left).ok())
        .ok_or(LedgerError::WouldGoNegative {
            ingredient_id,
            available,
            requested,
        })
}
