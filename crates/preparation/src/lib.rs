//! Beverage preparation pipeline.
//!
//! This crate decides whether a requested beverage can be prepared and, if so,
//! commits an all-or-nothing decrement of every ingredient it needs. Every
//! preparation runs under one process-wide FIFO lock:
//! 1. Look up the beverage and its base recipe
//! 2. Resolve the effective recipe from the request options
//! 3. Check stock against a fresh ledger snapshot
//! 4. Authorize the payment
//! 5. Commit the stock decrement
//!
//! Any failure ends the call without touching stock, and the lock is released
//! on every path.

pub mod coordinator;
pub mod error;
pub mod lock;
pub mod payment;
pub mod request;
pub mod stage;

pub use coordinator::PreparationCoordinator;
pub use error::{PrepareError, Result};
pub use lock::{PrepareLock, PrepareLockGuard};
pub use payment::{InMemoryPaymentGate, PaymentDecision, PaymentGate, PaymentGateError};
pub use request::{ConsumedLine, MAX_SHOTS, MAX_SUGAR_GRAMS, PrepareRequest, PrepareResult};
pub use stage::PreparationStage;
