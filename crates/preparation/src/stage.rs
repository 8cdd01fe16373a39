//! Preparation stage machine.

use serde::{Deserialize, Serialize};

/// The stage a preparation has reached.
///
/// Stage transitions:
/// ```text
/// Idle ──► Locked ──► Resolving ──► CheckingStock ──┬──► Authorizing ──┬──► Committing ──► Released
///                         │                         │                  └──► Declined ─────► Released
///                         │                         └──► InsufficientStock ──────────────► Released
///                         └──────────────────────────────────────────────────────────────► Released
/// ```
///
/// `Released` is reached on every path once the lock has been given up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PreparationStage {
    /// The call has not acquired the lock yet.
    #[default]
    Idle,

    /// The lock is held.
    Locked,

    /// Loading the beverage and resolving its effective recipe.
    Resolving,

    /// Reading a fresh snapshot and comparing it with the recipe.
    CheckingStock,

    /// At least one ingredient is short.
    InsufficientStock,

    /// Waiting on the payment gate.
    Authorizing,

    /// The payment gate declined.
    Declined,

    /// Applying the stock decrement.
    Committing,

    /// The lock has been given up (terminal state).
    Released,
}

impl PreparationStage {
    /// Returns true while the call owns the lock.
    pub fn holds_lock(&self) -> bool {
        !matches!(self, PreparationStage::Idle | PreparationStage::Released)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PreparationStage::Released)
    }

    /// Returns the stage name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PreparationStage::Idle => "Idle",
            PreparationStage::Locked => "Locked",
            PreparationStage::Resolving => "Resolving",
            PreparationStage::CheckingStock => "CheckingStock",
            PreparationStage::InsufficientStock => "InsufficientStock",
            PreparationStage::Authorizing => "Authorizing",
            PreparationStage::Declined => "Declined",
            PreparationStage::Committing => "Committing",
            PreparationStage::Released => "Released",
        }
    }
}

impl std::fmt::Display for PreparationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
