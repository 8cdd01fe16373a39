//! Domain error types.

use ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The ledger is missing something the request depends on.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An error occurred in the ledger.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
