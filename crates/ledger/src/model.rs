//! Ledger data model: ingredients, recipes, and stock changes.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::{BeverageId, IngredientId, Money};

/// An ingredient and its current stock.
///
/// Stock is unsigned: the ledger refuses any change that would take it below
/// zero, so a negative level is not representable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub stock_units: u32,
}

/// One line of a recipe, already joined with the ingredient name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub ingredient_id: IngredientId,
    pub ingredient_name: String,
    pub quantity: u32,
    pub unit: String,
}

impl RecipeLine {
    /// Returns true if this line uses the ingredient with the given name,
    /// compared case-insensitively.
    pub fn is_named(&self, name: &str) -> bool {
        self.ingredient_name.eq_ignore_ascii_case(name)
    }
}

/// A beverage definition with its ordered base recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beverage {
    pub id: BeverageId,
    pub name: String,
    pub price: Money,
    pub recipe: Vec<RecipeLine>,
}

/// A single line of an atomic stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDecrement {
    pub ingredient_id: IngredientId,
    pub quantity: u32,
}

impl From<&RecipeLine> for StockDecrement {
    fn from(line: &RecipeLine) -> Self {
        Self {
            ingredient_id: line.ingredient_id,
            quantity: line.quantity,
        }
    }
}

/// Kind of maintenance adjustment applied to an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustOp {
    Set,
    Increment,
    Decrement,
}

impl AdjustOp {
    /// Computes the stock level after applying `amount` to `current`.
    pub fn apply(self, ingredient_id: IngredientId, current: u32, amount: u32) -> Result<u32> {
        match self {
            AdjustOp::Set => Ok(amount),
            AdjustOp::Increment => current
                .checked_add(amount)
                .ok_or(LedgerError::StockOverflow(ingredient_id)),
            AdjustOp::Decrement => {
                current
                    .checked_sub(amount)
                    .ok_or(LedgerError::WouldGoNegative {
                        ingredient_id,
                        available: current,
                        requested: u64::from(amount),
                    })
            }
        }
    }
}

/// A maintenance change to one ingredient's stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub id: IngredientId,
    pub op: AdjustOp,
    pub amount: u32,
}

/// A recipe line for a beverage that is being registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipeLine {
    pub ingredient_id: IngredientId,
    pub quantity: u32,
    pub unit: String,
}

impl NewRecipeLine {
    pub fn new(ingredient_id: IngredientId, quantity: u32, unit: impl Into<String>) -> Self {
        Self {
            ingredient_id,
            quantity,
            unit: unit.into(),
        }
    }
}

/// A beverage that is being registered in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBeverage {
    pub name: String,
    pub price: Money,
    pub recipe: Vec<NewRecipeLine>,
}

impl NewBeverage {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
            recipe: Vec::new(),
        }
    }

    /// Appends a recipe line.
    pub fn with_line(mut self, ingredient_id: IngredientId, quantity: u32, unit: &str) -> Self {
        self.recipe
            .push(NewRecipeLine::new(ingredient_id, quantity, unit));
        self
    }

    /// Checks the shape of the definition before it is stored.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::InvalidRecipe(
                "beverage name must not be empty".to_string(),
            ));
        }
        if !self.price.is_positive() {
            return Err(LedgerError::InvalidRecipe(format!(
                "price of '{}' must be positive",
                self.name
            )));
        }
        if self.recipe.is_empty() {
            return Err(LedgerError::InvalidRecipe(format!(
                "recipe of '{}' must have at least one line",
                self.name
            )));
        }
        for (i, line) in self.recipe.iter().enumerate() {
            if self.recipe[..i]
                .iter()
                .any(|earlier| earlier.ingredient_id == line.ingredient_id)
            {
                return Err(LedgerError::InvalidRecipe(format!(
                    "ingredient {} appears twice in '{}'",
                    line.ingredient_id, self.name
                )));
            }
        }
        if let Some(line) = self.recipe.iter().find(|l| l.quantity == 0) {
            return Err(LedgerError::InvalidRecipe(format!(
                "quantity for ingredient {} in '{}' must be positive",
                line.ingredient_id, self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str) -> RecipeLine {
        RecipeLine {
            ingredient_id: IngredientId::new(1),
            ingredient_name: name.to_string(),
            quantity: 1,
            unit: "shot".to_string(),
        }
    }

    #[test]
    fn recipe_line_name_match_ignores_case() {
        assert!(line("Espresso").is_named("espresso"));
        assert!(line("SUGAR").is_named("sugar"));
        assert!(!line("milk").is_named("sugar"));
    }

    #[test]
    fn adjust_op_set_replaces_value() {
        let id = IngredientId::new(1);
        assert_eq!(AdjustOp::Set.apply(id, 40, 7).unwrap(), 7);
    }

    #[test]
    fn adjust_op_decrement_refuses_to_go_negative() {
        let id = IngredientId::new(2);
        let err = AdjustOp::Decrement.apply(id, 3, 5).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::WouldGoNegative {
                available: 3,
                requested: 5,
                ..
            }
        ));
        assert_eq!(AdjustOp::Decrement.apply(id, 5, 5).unwrap(), 0);
    }

    #[test]
    fn adjust_op_increment_detects_overflow() {
        let id = IngredientId::new(3);
        assert!(matches!(
            AdjustOp::Increment.apply(id, u32::MAX, 1),
            Err(LedgerError::StockOverflow(_))
        ));
        assert_eq!(AdjustOp::Increment.apply(id, 10, 5).unwrap(), 15);
    }

    #[test]
    fn adjust_op_deserializes_lowercase() {
        let adj: StockAdjustment =
            serde_json::from_str(r#"{"id": 4, "op": "increment", "amount": 25}"#).unwrap();
        assert_eq!(adj.op, AdjustOp::Increment);
        assert_eq!(adj.id, IngredientId::new(4));
    }

    #[test]
    fn new_beverage_validation() {
        let id = IngredientId::new(1);
        assert!(
            NewBeverage::new("Espresso", Money::from_cents(200))
                .with_line(id, 1, "shot")
                .validate()
                .is_ok()
        );
        assert!(
            NewBeverage::new("Empty", Money::from_cents(200))
                .validate()
                .is_err()
        );
        assert!(
            NewBeverage::new("Free", Money::zero())
                .with_line(id, 1, "shot")
                .validate()
                .is_err()
        );
        assert!(
            NewBeverage::new("Nothing", Money::from_cents(100))
                .with_line(id, 0, "shot")
                .validate()
                .is_err()
        );
        assert!(
            NewBeverage::new("Double", Money::from_cents(100))
                .with_line(id, 1, "shot")
                .with_line(id, 1, "shot")
                .validate()
                .is_err()
        );
    }
}
