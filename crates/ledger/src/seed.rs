//! Default catalog for a freshly installed machine.

use crate::error::Result;
use crate::model::NewBeverage;
use crate::store::{CatalogWriter, Ledger};
use crate::{BeverageId, IngredientId, Money};

/// Identifiers of the default catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededCatalog {
    pub espresso: IngredientId,
    pub milk: IngredientId,
    pub sugar: IngredientId,
    pub espresso_drink: BeverageId,
    pub cappuccino: BeverageId,
}

/// Installs the default ingredients and beverages.
///
/// Entries that already exist (matched by name) are left as they are, so the
/// function can run on every start-up.
#[tracing::instrument(skip(ledger))]
pub async fn seed_defaults<L>(ledger: &L) -> Result<SeededCatalog>
where
    L: Ledger + CatalogWriter,
{
    let espresso = ensure_ingredient(ledger, "espresso", 1000).await?;
    let milk = ensure_ingredient(ledger, "milk", 5000).await?;
    let sugar = ensure_ingredient(ledger, "sugar", 2000).await?;

    let espresso_drink = ensure_beverage(
        ledger,
        NewBeverage::new("Espresso", Money::from_cents(200)).with_line(espresso, 1, "shot"),
    )
    .await?;
    let cappuccino = ensure_beverage(
        ledger,
        NewBeverage::new("Cappuccino", Money::from_cents(300))
            .with_line(espresso, 1, "shot")
            .with_line(milk, 150, "ml")
            .with_line(sugar, 5, "gram"),
    )
    .await?;

    tracing::info!("default catalog installed");

    Ok(SeededCatalog {
        espresso,
        milk,
        sugar,
        espresso_drink,
        cappuccino,
    })
}

async fn ensure_ingredient<L>(ledger: &L, name: &str, stock_units: u32) -> Result<IngredientId>
where
    L: Ledger + CatalogWriter,
{
    match ledger.find_ingredient_by_name(name).await? {
        Some(existing) => Ok(existing.id),
        None => ledger.add_ingredient(name, stock_units).await,
    }
}

async fn ensure_beverage<L>(ledger: &L, beverage: NewBeverage) -> Result<BeverageId>
where
    L: Ledger + CatalogWriter,
{
    let existing = ledger
        .list_beverages()
        .await?
        .into_iter()
        .find(|b| b.name.eq_ignore_ascii_case(&beverage.name));
    match existing {
        Some(found) => Ok(found.id),
        None => ledger.add_beverage(beverage).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryLedger;

    #[tokio::test]
    async fn test_seed_installs_catalog() {
        let ledger = InMemoryLedger::new();
        let catalog = seed_defaults(&ledger).await.unwrap();

        assert_eq!(ledger.stock_of(catalog.espresso).await, Some(1000));
        assert_eq!(ledger.stock_of(catalog.milk).await, Some(5000));
        assert_eq!(ledger.stock_of(catalog.sugar).await, Some(2000));

        let cappuccino = ledger
            .fetch_beverage_with_recipe(catalog.cappuccino)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cappuccino.price, Money::from_cents(300));
        assert_eq!(cappuccino.recipe.len(), 3);
        assert!(cappuccino.recipe[2].is_named("sugar"));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let ledger = InMemoryLedger::new();
        let first = seed_defaults(&ledger).await.unwrap();
        let second = seed_defaults(&ledger).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(ledger.list_beverages().await.unwrap().len(), 2);
        assert_eq!(ledger.list_ingredients().await.unwrap().len(), 3);
    }
}
