//! Preparation error types.

use common::BeverageId;
use domain::{DomainError, StockShortage};
use ledger::LedgerError;
use thiserror::Error;

use crate::payment::PaymentGateError;

/// Errors that end a preparation call. None of them is retried.
#[derive(Debug, Error)]
pub enum PrepareError {
    /// The request failed validation before the lock was taken.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No beverage has the requested id.
    #[error("Beverage {beverage_id} not found")]
    BeverageNotFound { beverage_id: BeverageId },

    /// At least one ingredient is short; `shortages` lists every deficit.
    #[error("Insufficient stock to prepare beverage {beverage_id}")]
    InsufficientStock {
        beverage_id: BeverageId,
        shortages: Vec<StockShortage>,
    },

    /// The payment gate declined the payment reference.
    #[error("Payment for beverage {beverage_id} was declined")]
    PaymentFailed { beverage_id: BeverageId },

    /// The ledger lacks something the request depends on, e.g. sugar.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The ledger failed unexpectedly.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The payment gate failed without reaching a decision.
    #[error("Payment gate error: {0}")]
    PaymentGate(#[from] PaymentGateError),

    /// The preparation task ended without producing a result.
    #[error("Preparation aborted: {0}")]
    Aborted(String),
}

impl PrepareError {
    /// Short, stable name of the error kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            PrepareError::InvalidRequest(_) => "invalid_request",
            PrepareError::BeverageNotFound { .. } => "beverage_not_found",
            PrepareError::InsufficientStock { .. } => "insufficient_stock",
            PrepareError::PaymentFailed { .. } => "payment_failed",
            PrepareError::Configuration(_) => "configuration",
            PrepareError::Ledger(_) => "ledger",
            PrepareError::PaymentGate(_) => "payment_gate",
            PrepareError::Aborted(_) => "aborted",
        }
    }
}

impl From<DomainError> for PrepareError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Configuration(msg) => PrepareError::Configuration(msg),
            DomainError::Ledger(e) => PrepareError::Ledger(e),
        }
    }
}

/// Convenience type alias for preparation results.
pub type Result<T> = std::result::Result<T, PrepareError>;
