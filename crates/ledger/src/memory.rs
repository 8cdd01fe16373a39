use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{LedgerError, Result};
use crate::model::{
    Beverage, Ingredient, NewBeverage, NewRecipeLine, RecipeLine, StockAdjustment, StockDecrement,
};
use crate::store::{CatalogWriter, Ledger, remaining_after, total_by_ingredient};
use crate::{BeverageId, IngredientId, Money};

#[derive(Debug, Clone)]
struct BeverageRow {
    id: BeverageId,
    name: String,
    price: Money,
    recipe: Vec<NewRecipeLine>,
}

#[derive(Debug, Default)]
struct LedgerState {
    ingredients: BTreeMap<IngredientId, Ingredient>,
    beverages: BTreeMap<BeverageId, BeverageRow>,
    last_ingredient_id: i64,
    last_beverage_id: i64,
}

impl LedgerState {
    fn join(&self, row: &BeverageRow) -> Result<Beverage> {
        let recipe = row
            .recipe
            .iter()
            .map(|line| {
                let ingredient = self.ingredients.get(&line.ingredient_id).ok_or_else(|| {
                    LedgerError::Corrupt(format!(
                        "beverage {} references missing ingredient {}",
                        row.id, line.ingredient_id
                    ))
                })?;
                Ok(RecipeLine {
                    ingredient_id: line.ingredient_id,
                    ingredient_name: ingredient.name.clone(),
                    quantity: line.quantity,
                    unit: line.unit.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Beverage {
            id: row.id,
            name: row.name.clone(),
            price: row.price,
            recipe,
        })
    }

    fn ingredients_by_name(&self) -> Vec<Ingredient> {
        let mut all: Vec<_> = self.ingredients.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}

/// In-memory ledger implementation.
///
/// All state lives behind a single `RwLock`; every mutation is applied under
/// one write guard, so readers never observe a partially applied change.
/// Clones share the same state.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
    fail_on_decrement: Arc<AtomicBool>,
}

impl InMemoryLedger {
    /// Creates a new empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current stock of an ingredient, if it exists.
    pub async fn stock_of(&self, id: IngredientId) -> Option<u32> {
        self.state
            .read()
            .await
            .ingredients
            .get(&id)
            .map(|i| i.stock_units)
    }

    /// Makes every subsequent `atomic_decrement` fail with `Unavailable`.
    pub fn set_fail_on_decrement(&self, fail: bool) {
        self.fail_on_decrement.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn fetch_beverage_with_recipe(&self, id: BeverageId) -> Result<Option<Beverage>> {
        let state = self.state.read().await;
        state.beverages.get(&id).map(|row| state.join(row)).transpose()
    }

    async fn fetch_ingredients_by_ids(
        &self,
        ids: &[IngredientId],
    ) -> Result<HashMap<IngredientId, Ingredient>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.ingredients.get(id).map(|i| (*id, i.clone())))
            .collect())
    }

    async fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>> {
        let state = self.state.read().await;
        Ok(state
            .ingredients
            .values()
            .find(|i| i.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn atomic_decrement(&self, lines: &[StockDecrement]) -> Result<()> {
        if self.fail_on_decrement.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable(
                "decrement rejected by fault injection".to_string(),
            ));
        }

        let totals = total_by_ingredient(lines);
        let mut state = self.state.write().await;

        // Validate every line before touching any row.
        let mut updates = Vec::with_capacity(totals.len());
        for (id, requested) in totals {
            let ingredient = state
                .ingredients
                .get(&id)
                .ok_or(LedgerError::IngredientNotFound(id))?;
            updates.push((id, remaining_after(id, ingredient.stock_units, requested)?));
        }

        for (id, remaining) in updates {
            if let Some(ingredient) = state.ingredients.get_mut(&id) {
                ingredient.stock_units = remaining;
            }
        }
        Ok(())
    }

    async fn list_beverages(&self) -> Result<Vec<Beverage>> {
        let state = self.state.read().await;
        let mut beverages = state
            .beverages
            .values()
            .map(|row| state.join(row))
            .collect::<Result<Vec<_>>>()?;
        beverages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(beverages)
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        Ok(self.state.read().await.ingredients_by_name())
    }

    async fn adjust_stock(&self, changes: &[StockAdjustment]) -> Result<Vec<Ingredient>> {
        let mut state = self.state.write().await;

        // Work on a preview so a failing change leaves the ledger untouched.
        let mut preview: BTreeMap<IngredientId, u32> = BTreeMap::new();
        for change in changes {
            let current = match preview.get(&change.id) {
                Some(level) => *level,
                None => {
                    state
                        .ingredients
                        .get(&change.id)
                        .ok_or(LedgerError::IngredientNotFound(change.id))?
                        .stock_units
                }
            };
            let next = change.op.apply(change.id, current, change.amount)?;
            preview.insert(change.id, next);
        }

        for (id, level) in preview {
            if let Some(ingredient) = state.ingredients.get_mut(&id) {
                ingredient.stock_units = level;
            }
        }
        Ok(state.ingredients_by_name())
    }
}

#[async_trait]
impl CatalogWriter for InMemoryLedger {
    async fn add_ingredient(&self, name: &str, stock_units: u32) -> Result<IngredientId> {
        let mut state = self.state.write().await;
        if state
            .ingredients
            .values()
            .any(|i| i.name.eq_ignore_ascii_case(name))
        {
            return Err(LedgerError::DuplicateName(name.to_string()));
        }

        state.last_ingredient_id += 1;
        let id = IngredientId::new(state.last_ingredient_id);
        state.ingredients.insert(
            id,
            Ingredient {
                id,
                name: name.to_string(),
                stock_units,
            },
        );
        Ok(id)
    }

    async fn add_beverage(&self, beverage: NewBeverage) -> Result<BeverageId> {
        beverage.validate()?;

        let mut state = self.state.write().await;
        if state
            .beverages
            .values()
            .any(|b| b.name.eq_ignore_ascii_case(&beverage.name))
        {
            return Err(LedgerError::DuplicateName(beverage.name));
        }
        if let Some(line) = beverage
            .recipe
            .iter()
            .find(|l| !state.ingredients.contains_key(&l.ingredient_id))
        {
            return Err(LedgerError::IngredientNotFound(line.ingredient_id));
        }

        state.last_beverage_id += 1;
        let id = BeverageId::new(state.last_beverage_id);
        state.beverages.insert(
            id,
            BeverageRow {
                id,
                name: beverage.name,
                price: beverage.price,
                recipe: beverage.recipe,
            },
        );
        Ok(id)
    }
}
