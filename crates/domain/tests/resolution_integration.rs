//! Integration tests for recipe resolution and availability against a ledger.

use domain::{PrepareOptions, StockShortage, apply_options, compute_availability};
use ledger::{CatalogWriter, InMemoryLedger, Ledger, Money, NewBeverage};

/// Loads the recipe and the snapshot the way the preparation pipeline does.
async fn resolve(
    ledger: &InMemoryLedger,
    beverage_name: &str,
    options: PrepareOptions,
) -> Result<(Vec<ledger::RecipeLine>, domain::Availability), domain::DomainError> {
    let beverage = ledger
        .list_beverages()
        .await?
        .into_iter()
        .find(|b| b.name == beverage_name)
        .expect("beverage registered");
    let sugar = ledger.find_ingredient_by_name(domain::SUGAR).await?;
    let recipe = apply_options(&beverage.recipe, sugar.as_ref(), &options)?;
    let ids: Vec<_> = recipe.iter().map(|l| l.ingredient_id).collect();
    let snapshot = ledger.fetch_ingredients_by_ids(&ids).await?;
    let availability = compute_availability(&recipe, &snapshot);
    Ok((recipe, availability))
}

async fn cappuccino_ledger(milk_stock: u32, with_sugar: bool) -> InMemoryLedger {
    let ledger = InMemoryLedger::new();
    let espresso = ledger.add_ingredient("espresso", 10).await.unwrap();
    let milk = ledger.add_ingredient("milk", milk_stock).await.unwrap();
    if with_sugar {
        ledger.add_ingredient("sugar", 500).await.unwrap();
    }
    ledger
        .add_beverage(
            NewBeverage::new("Cappuccino", Money::from_cents(300))
                .with_line(espresso, 1, "shot")
                .with_line(milk, 150, "ml"),
        )
        .await
        .unwrap();
    ledger
}

#[tokio::test]
async fn sugar_is_added_from_the_ledger() {
    let ledger = cappuccino_ledger(1000, true).await;

    let (recipe, availability) = resolve(&ledger, "Cappuccino", PrepareOptions::new(Some(3), Some(1)))
        .await
        .unwrap();

    assert_eq!(recipe.len(), 3);
    assert!(recipe[2].is_named("sugar"));
    assert_eq!(recipe[2].quantity, 3);
    assert_eq!(recipe[2].unit, "gram");
    assert!(availability.can_prepare);
}

#[tokio::test]
async fn zero_sugar_adds_nothing() {
    let ledger = cappuccino_ledger(1000, true).await;

    let (recipe, _) = resolve(&ledger, "Cappuccino", PrepareOptions::new(Some(0), Some(1)))
        .await
        .unwrap();
    assert_eq!(recipe.len(), 2);
}

#[tokio::test]
async fn sugar_without_ingredient_is_a_configuration_error() {
    let ledger = cappuccino_ledger(1000, false).await;

    let result = resolve(&ledger, "Cappuccino", PrepareOptions::new(Some(2), None)).await;
    assert!(matches!(result, Err(domain::DomainError::Configuration(_))));
}

#[tokio::test]
async fn milk_shortage_is_reported() {
    let ledger = cappuccino_ledger(100, false).await;

    let (_, availability) = resolve(&ledger, "Cappuccino", PrepareOptions::new(Some(0), Some(1)))
        .await
        .unwrap();

    assert!(!availability.can_prepare);
    assert_eq!(
        availability.shortages,
        vec![StockShortage {
            ingredient_id: ledger::IngredientId::new(2),
            ingredient_name: "milk".to_string(),
            required: 150,
            available: 100,
            unit: "ml".to_string(),
        }]
    );
}
