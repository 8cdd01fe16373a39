//! Payment gate trait and in-memory implementation.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use thiserror::Error;

/// Outcome of a payment authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentDecision {
    Authorized,
    Declined,
}

impl PaymentDecision {
    pub fn is_authorized(&self) -> bool {
        matches!(self, PaymentDecision::Authorized)
    }
}

/// The payment gate could not reach a decision.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentGateError {
    #[error("Payment gate unavailable: {0}")]
    Unavailable(String),
}

/// Authorizes the payment for a preparation.
///
/// The gate is consulted while the preparation lock is held, after stock has
/// been confirmed and before it is decremented.
#[async_trait]
pub trait PaymentGate: Send + Sync {
    /// Decides whether the payment identified by `payment_ref` is accepted.
    async fn authorize(&self, payment_ref: &str) -> Result<PaymentDecision, PaymentGateError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    declined: HashSet<String>,
    decline_all: bool,
    unavailable: bool,
    requests: Vec<String>,
}

/// In-memory payment gate for local runs and tests.
///
/// Authorizes everything unless told otherwise, and remembers every reference
/// it was asked about.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGate {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentGate {
    /// Creates a gate that authorizes every payment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declines every future authorization of `payment_ref`.
    pub fn decline_reference(&self, payment_ref: impl Into<String>) {
        self.write().declined.insert(payment_ref.into());
    }

    /// Configures the gate to decline every payment.
    pub fn set_decline_all(&self, decline: bool) {
        self.write().decline_all = decline;
    }

    /// Configures the gate to fail without a decision.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.write().unavailable = unavailable;
    }

    /// Returns the references the gate was asked about, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.read().requests.clone()
    }

    /// Returns the number of authorization calls received.
    pub fn request_count(&self) -> usize {
        self.read().requests.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryPaymentState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryPaymentState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PaymentGate for InMemoryPaymentGate {
    #[tracing::instrument(skip(self))]
    async fn authorize(&self, payment_ref: &str) -> Result<PaymentDecision, PaymentGateError> {
        let mut state = self.write();
        state.requests.push(payment_ref.to_string());

        if state.unavailable {
            return Err(PaymentGateError::Unavailable(
                "payment provider did not respond".to_string(),
            ));
        }

        if state.decline_all || state.declined.contains(payment_ref) {
            tracing::debug!(payment_ref, "payment declined");
            return Ok(PaymentDecision::Declined);
        }

        Ok(PaymentDecision::Authorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_authorizes_by_default() {
        let gate = InMemoryPaymentGate::new();
        let decision = gate.authorize("PAY-1").await.unwrap();
        assert!(decision.is_authorized());
        assert_eq!(gate.requests(), vec!["PAY-1".to_string()]);
    }

    #[tokio::test]
    async fn test_declines_listed_reference() {
        let gate = InMemoryPaymentGate::new();
        gate.decline_reference("card-declined");

        assert_eq!(
            gate.authorize("card-declined").await.unwrap(),
            PaymentDecision::Declined
        );
        assert_eq!(
            gate.authorize("card-ok").await.unwrap(),
            PaymentDecision::Authorized
        );
        assert_eq!(gate.request_count(), 2);
    }

    #[tokio::test]
    async fn test_decline_all() {
        let gate = InMemoryPaymentGate::new();
        gate.set_decline_all(true);
        assert_eq!(gate.authorize("x").await.unwrap(), PaymentDecision::Declined);

        gate.set_decline_all(false);
        assert_eq!(gate.authorize("x").await.unwrap(), PaymentDecision::Authorized);
    }

    #[tokio::test]
    async fn test_unavailable_gate_errors() {
        let gate = InMemoryPaymentGate::new();
        gate.set_unavailable(true);

        let result = gate.authorize("PAY-1").await;
        assert!(matches!(result, Err(PaymentGateError::Unavailable(_))));
        assert_eq!(gate.request_count(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let gate = InMemoryPaymentGate::new();
        let clone = gate.clone();
        clone.decline_reference("shared");

        assert_eq!(
            gate.authorize("shared").await.unwrap(),
            PaymentDecision::Declined
        );
        assert_eq!(clone.request_count(), 1);
    }
}
