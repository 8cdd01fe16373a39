//! HTTP route handlers.

pub mod beverages;
pub mod health;
pub mod ingredients;
pub mod metrics;

use domain::CatalogService;
use ledger::Ledger;
use preparation::{InMemoryPaymentGate, PreparationCoordinator};

/// Shared application state accessible from all handlers.
pub struct AppState<L: Ledger + 'static> {
    pub catalog: CatalogService<L>,
    pub coordinator: PreparationCoordinator<L, InMemoryPaymentGate>,
    pub machine_id: String,
}
