//! Shared identifiers and value types used across the beverage machine crates.

pub mod types;

pub use types::{BeverageId, IngredientId, InvalidId, Money};
