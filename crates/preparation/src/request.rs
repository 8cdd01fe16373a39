//! Preparation requests and results.

use common::{BeverageId, IngredientId};
use domain::PrepareOptions;
use ledger::RecipeLine;
use serde::{Deserialize, Serialize};

use crate::error::{PrepareError, Result};

/// Largest sugar override accepted, in grams.
pub const MAX_SUGAR_GRAMS: u32 = 5;

/// Largest shots override accepted.
pub const MAX_SHOTS: u32 = 3;

/// A request to prepare one beverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareRequest {
    pub beverage_id: BeverageId,
    #[serde(default)]
    pub sugar_grams: Option<u32>,
    #[serde(default)]
    pub shots: Option<u32>,
    pub payment_ref: String,
}

impl PrepareRequest {
    /// Creates a request with no recipe overrides.
    pub fn new(beverage_id: BeverageId, payment_ref: impl Into<String>) -> Self {
        Self {
            beverage_id,
            sugar_grams: None,
            shots: None,
            payment_ref: payment_ref.into(),
        }
    }

    pub fn with_sugar(mut self, grams: u32) -> Self {
        self.sugar_grams = Some(grams);
        self
    }

    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = Some(shots);
        self
    }

    /// Recipe overrides carried by this request.
    pub fn options(&self) -> PrepareOptions {
        PrepareOptions::new(self.sugar_grams, self.shots)
    }

    /// Rejects malformed requests. Runs before the lock is taken.
    pub fn validate(&self) -> Result<()> {
        if !self.beverage_id.is_valid() {
            return Err(PrepareError::InvalidRequest(format!(
                "beverage id must be positive, got {}",
                self.beverage_id
            )));
        }
        if self.payment_ref.trim().is_empty() {
            return Err(PrepareError::InvalidRequest(
                "payment reference must not be empty".to_string(),
            ));
        }
        if let Some(grams) = self.sugar_grams.filter(|g| *g > MAX_SUGAR_GRAMS) {
            return Err(PrepareError::InvalidRequest(format!(
                "sugar must be between 0 and {MAX_SUGAR_GRAMS} grams, got {grams}"
            )));
        }
        if let Some(shots) = self.shots.filter(|s| *s > MAX_SHOTS) {
            return Err(PrepareError::InvalidRequest(format!(
                "shots must be between 0 and {MAX_SHOTS}, got {shots}"
            )));
        }
        Ok(())
    }
}

/// One ingredient consumed by a successful preparation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedLine {
    pub ingredient_id: IngredientId,
    pub ingredient_name: String,
    pub quantity: u32,
    pub unit: String,
}

impl From<RecipeLine> for ConsumedLine {
    fn from(line: RecipeLine) -> Self {
        Self {
            ingredient_id: line.ingredient_id,
            ingredient_name: line.ingredient_name,
            quantity: line.quantity,
            unit: line.unit,
        }
    }
}

/// Outcome of a successful preparation: what was made and what it used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareResult {
    pub beverage_id: BeverageId,
    pub beverage_name: String,
    pub consumed: Vec<ConsumedLine>,
}

impl PrepareResult {
    /// Quantity consumed of the named ingredient, if it was part of the recipe.
    pub fn consumed_of(&self, ingredient_name: &str) -> Option<u32> {
        self.consumed
            .iter()
            .find(|l| l.ingredient_name.eq_ignore_ascii_case(ingredient_name))
            .map(|l| l.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PrepareRequest {
        PrepareRequest::new(BeverageId::new(1), "PAY-1")
    }

    #[test]
    fn test_valid_requests() {
        assert!(request().validate().is_ok());
        assert!(request().with_sugar(0).with_shots(0).validate().is_ok());
        assert!(
            request()
                .with_sugar(MAX_SUGAR_GRAMS)
                .with_shots(MAX_SHOTS)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_rejects_out_of_range_options() {
        assert!(matches!(
            request().with_sugar(6).validate(),
            Err(PrepareError::InvalidRequest(_))
        ));
        assert!(matches!(
            request().with_shots(4).validate(),
            Err(PrepareError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_rejects_blank_payment_ref() {
        let req = PrepareRequest::new(BeverageId::new(1), "  ");
        assert!(matches!(
            req.validate(),
            Err(PrepareError::InvalidRequest(m)) if m.contains("payment")
        ));
    }

    #[test]
    fn test_rejects_non_positive_beverage_id() {
        let req = PrepareRequest::new(BeverageId::new(0), "PAY-1");
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_options_carry_overrides() {
        let options = request().with_sugar(2).options();
        assert_eq!(options.sugar_grams, Some(2));
        assert_eq!(options.shots, None);
    }

    #[test]
    fn test_deserialize_without_overrides() {
        let req: PrepareRequest =
            serde_json::from_str(r#"{"beverage_id": 2, "payment_ref": "PAY-9"}"#).unwrap();
        assert_eq!(req.beverage_id, BeverageId::new(2));
        assert_eq!(req.sugar_grams, None);
        assert_eq!(req.shots, None);
    }

    #[test]
    fn test_consumed_of() {
        let result = PrepareResult {
            beverage_id: BeverageId::new(2),
            beverage_name: "Cappuccino".to_string(),
            consumed: vec![ConsumedLine {
                ingredient_id: IngredientId::new(2),
                ingredient_name: "milk".to_string(),
                quantity: 150,
                unit: "ml".to_string(),
            }],
        };
        assert_eq!(result.consumed_of("Milk"), Some(150));
        assert_eq!(result.consumed_of("sugar"), None);
    }
}
