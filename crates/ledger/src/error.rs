use thiserror::Error;

use crate::IngredientId;

/// Errors that can occur when interacting with the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A referenced ingredient does not exist.
    #[error("Ingredient {0} not found")]
    IngredientNotFound(IngredientId),

    /// Applying the change would leave an ingredient with negative stock.
    #[error(
        "Insufficient stock for ingredient {ingredient_id}: available {available}, requested {requested}"
    )]
    WouldGoNegative {
        ingredient_id: IngredientId,
        available: u32,
        requested: u64,
    },

    /// Applying the change would exceed the representable stock range.
    #[error("Stock overflow for ingredient {0}")]
    StockOverflow(IngredientId),

    /// An ingredient or beverage with the same name already exists.
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// A beverage definition was rejected.
    #[error("Invalid recipe: {0}")]
    InvalidRecipe(String),

    /// The ledger is temporarily unable to serve the request.
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be mapped back into the ledger model.
    #[error("Corrupt ledger data: {0}")]
    Corrupt(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
