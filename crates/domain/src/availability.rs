//! Stock availability for an effective recipe.

use std::collections::HashMap;

use ledger::{Ingredient, IngredientId, RecipeLine};
use serde::{Deserialize, Serialize};

/// Ingredient stock as read from the ledger at one point in time.
pub type LedgerSnapshot = HashMap<IngredientId, Ingredient>;

/// A per-ingredient deficit that blocks preparation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockShortage {
    pub ingredient_id: IngredientId,
    pub ingredient_name: String,
    pub required: u32,
    pub available: u32,
    pub unit: String,
}

/// Result of checking a recipe against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Availability {
    pub can_prepare: bool,
    pub shortages: Vec<StockShortage>,
}

/// Compares every recipe line with the snapshot and records a shortage when
/// `available < required`, in recipe order.
///
/// An ingredient missing from the snapshot counts as zero stock.
pub fn compute_availability(recipe: &[RecipeLine], snapshot: &LedgerSnapshot) -> Availability {
    let shortages: Vec<StockShortage> = recipe
        .iter()
        .filter_map(|line| {
            let available = snapshot
                .get(&line.ingredient_id)
                .map_or(0, |i| i.stock_units);
            (available < line.quantity).then(|| StockShortage {
                ingredient_id: line.ingredient_id,
                ingredient_name: line.ingredient_name.clone(),
                required: line.quantity,
                available,
                unit: line.unit.clone(),
            })
        })
        .collect();

    Availability {
        can_prepare: shortages.is_empty(),
        shortages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i64, name: &str, quantity: u32, unit: &str) -> RecipeLine {
        RecipeLine {
            ingredient_id: IngredientId::new(id),
            ingredient_name: name.to_string(),
            quantity,
            unit: unit.to_string(),
        }
    }

    fn snapshot(levels: &[(i64, &str, u32)]) -> LedgerSnapshot {
        levels
            .iter()
            .map(|(id, name, stock)| {
                (
                    IngredientId::new(*id),
                    Ingredient {
                        id: IngredientId::new(*id),
                        name: name.to_string(),
                        stock_units: *stock,
                    },
                )
            })
            .collect()
    }

    fn cappuccino() -> Vec<RecipeLine> {
        vec![line(1, "espresso", 1, "shot"), line(2, "milk", 150, "ml")]
    }

    #[test]
    fn test_enough_stock() {
        let snap = snapshot(&[(1, "espresso", 10), (2, "milk", 1000)]);
        let availability = compute_availability(&cappuccino(), &snap);
        assert!(availability.can_prepare);
        assert!(availability.shortages.is_empty());
    }

    #[test]
    fn test_exact_stock_is_enough() {
        let snap = snapshot(&[(1, "espresso", 1), (2, "milk", 150)]);
        assert!(compute_availability(&cappuccino(), &snap).can_prepare);
    }

    #[test]
    fn test_reports_each_short_line() {
        let snap = snapshot(&[(1, "espresso", 10), (2, "milk", 100)]);
        let availability = compute_availability(&cappuccino(), &snap);

        assert!(!availability.can_prepare);
        assert_eq!(
            availability.shortages,
            vec![StockShortage {
                ingredient_id: IngredientId::new(2),
                ingredient_name: "milk".to_string(),
                required: 150,
                available: 100,
                unit: "ml".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_ingredient_counts_as_empty() {
        let snap = snapshot(&[(2, "milk", 1000)]);
        let availability = compute_availability(&cappuccino(), &snap);
        assert_eq!(availability.shortages.len(), 1);
        assert_eq!(availability.shortages[0].available, 0);
        assert_eq!(availability.shortages[0].ingredient_name, "espresso");
    }

    #[test]
    fn test_zero_quantity_line_never_short() {
        let recipe = vec![line(3, "sugar", 0, "gram")];
        let availability = compute_availability(&recipe, &LedgerSnapshot::new());
        assert!(availability.can_prepare);
    }

    #[test]
    fn test_same_snapshot_same_answer() {
        let snap = snapshot(&[(1, "espresso", 0), (2, "milk", 100)]);
        let first = compute_availability(&cappuccino(), &snap);
        let second = compute_availability(&cappuccino(), &snap);
        assert_eq!(first, second);
        assert_eq!(first.shortages.len(), 2);
    }

    #[test]
    fn test_availability_serializes_shortages() {
        let snap = snapshot(&[(1, "espresso", 10), (2, "milk", 100)]);
        let json = serde_json::to_value(compute_availability(&cappuccino(), &snap)).unwrap();
        assert_eq!(json["can_prepare"], false);
        assert_eq!(json["shortages"][0]["required"], 150);
        assert_eq!(json["shortages"][0]["ingredient_id"], 2);
    }
}
