//! Stock ledger for the beverage machine.
//!
//! The ledger owns ingredient stock and beverage recipes. It is the only
//! shared mutable state in the system; the preparation pipeline reads from it
//! and commits all-or-nothing stock decrements through the [`Ledger`] trait.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod seed;
pub mod store;

pub use common::{BeverageId, IngredientId, Money};
pub use error::{LedgerError, Result};
pub use memory::InMemoryLedger;
pub use model::{
    AdjustOp, Beverage, Ingredient, NewBeverage, NewRecipeLine, RecipeLine, StockAdjustment,
    StockDecrement,
};
pub use postgres::PostgresLedger;
pub use seed::{SeededCatalog, seed_defaults};
pub use store::{CatalogWriter, Ledger};
