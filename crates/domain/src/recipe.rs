//! Recipe resolution: merges a beverage's base recipe with per-request options.

use ledger::{Ingredient, RecipeLine};

use crate::error::DomainError;

/// Name of the ingredient that sugar options apply to.
pub const SUGAR: &str = "sugar";

/// Unit used for a sugar line added on request.
pub const SUGAR_UNIT: &str = "gram";

/// Ingredients whose quantity is driven by the shots option.
const SHOT_INGREDIENTS: [&str; 2] = ["espresso", "coffee"];

/// The recipe for one request after options have been applied. Never persisted.
pub type EffectiveRecipe = Vec<RecipeLine>;

/// Per-request overrides of a beverage's base recipe.
///
/// An omitted shots override keeps the base quantity. An omitted sugar
/// override means no sugar, so a base sugar line resolves to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrepareOptions {
    pub sugar_grams: Option<u32>,
    pub shots: Option<u32>,
}

impl PrepareOptions {
    pub fn new(sugar_grams: Option<u32>, shots: Option<u32>) -> Self {
        Self { sugar_grams, shots }
    }

    /// Returns true if resolving these options against `base` would add a
    /// sugar line, which requires a sugar ingredient to be registered.
    pub fn needs_sugar_ingredient(&self, base: &[RecipeLine]) -> bool {
        self.sugar_grams.is_some_and(|grams| grams > 0) && !base.iter().any(|l| l.is_named(SUGAR))
    }
}

fn is_shot_line(line: &RecipeLine) -> bool {
    SHOT_INGREDIENTS.iter().any(|name| line.is_named(name))
}

/// Computes the effective recipe for a request.
///
/// Rules, applied per base line:
/// - espresso/coffee lines use `max(base, shots)`; asking for fewer shots
///   never reduces the brewed amount
/// - sugar lines use the requested grams verbatim, zero when omitted
/// - every other line passes through unchanged
///
/// If the base recipe has no sugar line and sugar was requested, a sugar line
/// is appended using `sugar`. When no sugar ingredient is registered this is a
/// [`DomainError::Configuration`].
pub fn apply_options(
    base: &[RecipeLine],
    sugar: Option<&Ingredient>,
    options: &PrepareOptions,
) -> Result<EffectiveRecipe, DomainError> {
    let mut effective: EffectiveRecipe = base
        .iter()
        .map(|line| {
            let quantity = if line.is_named(SUGAR) {
                options.sugar_grams.unwrap_or_default()
            } else if is_shot_line(line) {
                options
                    .shots
                    .map_or(line.quantity, |shots| line.quantity.max(shots))
            } else {
                line.quantity
            };
            RecipeLine {
                quantity,
                ..line.clone()
            }
        })
        .collect();

    if options.needs_sugar_ingredient(base) {
        let sugar = sugar.ok_or_else(|| {
            DomainError::Configuration("sugar ingredient not found in inventory".to_string())
        })?;
        effective.push(RecipeLine {
            ingredient_id: sugar.id,
            ingredient_name: sugar.name.clone(),
            quantity: options.sugar_grams.unwrap_or_default(),
            unit: SUGAR_UNIT.to_string(),
        });
    }

    Ok(effective)
}
