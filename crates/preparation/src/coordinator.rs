//! Preparation coordinator: runs the locked check-authorize-commit pipeline.

use std::sync::Arc;
use std::time::Instant;

use domain::{SUGAR, StockShortage, apply_options, compute_availability};
use ledger::{Ingredient, IngredientId, Ledger, LedgerError, StockAdjustment, StockDecrement};

use crate::error::{PrepareError, Result};
use crate::lock::PrepareLock;
use crate::payment::PaymentGate;
use crate::request::{ConsumedLine, PrepareRequest, PrepareResult};
use crate::stage::PreparationStage;

/// Serializes preparations and stock maintenance over one ledger.
///
/// Every call to [`prepare`](Self::prepare) or
/// [`adjust_stock`](Self::adjust_stock) runs its ledger work under the same
/// FIFO lock, so no two of them interleave. Once started, a call runs to
/// completion on its own task even if the caller stops waiting.
pub struct PreparationCoordinator<L, P>
where
    L: Ledger,
    P: PaymentGate,
{
    inner: Arc<Inner<L, P>>,
}

struct Inner<L, P> {
    ledger: L,
    payment: P,
    lock: PrepareLock,
}

impl<L, P> Clone for PreparationCoordinator<L, P>
where
    L: Ledger,
    P: PaymentGate,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L, P> PreparationCoordinator<L, P>
where
    L: Ledger + 'static,
    P: PaymentGate + 'static,
{
    /// Creates a new coordinator with its own lock.
    pub fn new(ledger: L, payment: P) -> Self {
        Self {
            inner: Arc::new(Inner {
                ledger,
                payment,
                lock: PrepareLock::new(),
            }),
        }
    }

    /// Returns a reference to the payment gate.
    pub fn payment_gate(&self) -> &P {
        &self.inner.payment
    }

    /// Returns true while a preparation or adjustment holds the lock.
    pub fn is_busy(&self) -> bool {
        self.inner.lock.is_locked()
    }

    /// Number of calls waiting for the lock.
    pub fn queued(&self) -> usize {
        self.inner.lock.queued()
    }

    /// Prepares one beverage.
    ///
    /// Stock is decremented only if the beverage exists, every ingredient of
    /// the effective recipe is in stock, and the payment is authorized. On any
    /// error the ledger is left untouched.
    #[tracing::instrument(
        skip(self, request),
        fields(beverage_id = %request.beverage_id, payment_ref = %request.payment_ref)
    )]
    pub async fn prepare(&self, request: PrepareRequest) -> Result<PrepareResult> {
        request.validate()?;

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.prepare(request).await })
            .await
            .map_err(|e| PrepareError::Aborted(e.to_string()))?
    }

    /// Applies maintenance adjustments under the preparation lock.
    ///
    /// Returns every ingredient after the change, ordered by name.
    #[tracing::instrument(skip(self, changes), fields(changes = changes.len()))]
    pub async fn adjust_stock(&self, changes: Vec<StockAdjustment>) -> Result<Vec<Ingredient>> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.adjust_stock(&changes).await })
            .await
            .map_err(|e| PrepareError::Aborted(e.to_string()))?
    }
}

impl<L, P> Inner<L, P>
where
    L: Ledger,
    P: PaymentGate,
{
    async fn prepare(&self, request: PrepareRequest) -> Result<PrepareResult> {
        metrics::counter!("preparations_total").increment(1);
        let started = Instant::now();

        let mut guard = self.lock.acquire().await;
        metrics::histogram!("prepare_lock_wait_seconds").record(started.elapsed().as_secs_f64());

        let mut stage = PreparationStage::Locked;
        let outcome = self.run_locked(&request, &mut stage).await;

        guard.release();
        advance(&mut stage, PreparationStage::Released);
        debug_assert!(stage.is_terminal());

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("preparation_duration_seconds").record(duration);

        match &outcome {
            Ok(result) => {
                metrics::counter!("preparations_succeeded").increment(1);
                tracing::info!(
                    beverage = %result.beverage_name,
                    duration,
                    "beverage prepared"
                );
            }
            Err(e) => {
                metrics::counter!("preparations_failed", "reason" => e.kind()).increment(1);
                tracing::warn!(reason = e.kind(), error = %e, duration, "preparation failed");
            }
        }

        outcome
    }

    async fn run_locked(
        &self,
        request: &PrepareRequest,
        stage: &mut PreparationStage,
    ) -> Result<PrepareResult> {
        let beverage_id = request.beverage_id;

        // 1. Load the beverage and resolve the effective recipe
        advance(stage, PreparationStage::Resolving);
        let beverage = self
            .ledger
            .fetch_beverage_with_recipe(beverage_id)
            .await?
            .ok_or(PrepareError::BeverageNotFound { beverage_id })?;

        let options = request.options();
        let sugar = if options.needs_sugar_ingredient(&beverage.recipe) {
            self.ledger.find_ingredient_by_name(SUGAR).await?
        } else {
            None
        };
        let recipe = apply_options(&beverage.recipe, sugar.as_ref(), &options)?;

        // 2. Check a fresh snapshot
        advance(stage, PreparationStage::CheckingStock);
        let ids: Vec<IngredientId> = recipe.iter().map(|l| l.ingredient_id).collect();
        let snapshot = self.ledger.fetch_ingredients_by_ids(&ids).await?;
        let availability = compute_availability(&recipe, &snapshot);
        if !availability.can_prepare {
            advance(stage, PreparationStage::InsufficientStock);
            return Err(PrepareError::InsufficientStock {
                beverage_id,
                shortages: availability.shortages,
            });
        }

        // 3. Authorize the payment
        advance(stage, PreparationStage::Authorizing);
        let decision = self.payment.authorize(&request.payment_ref).await?;
        if !decision.is_authorized() {
            advance(stage, PreparationStage::Declined);
            return Err(PrepareError::PaymentFailed { beverage_id });
        }

        // 4. Commit
        advance(stage, PreparationStage::Committing);
        let lines: Vec<StockDecrement> = recipe.iter().map(StockDecrement::from).collect();
        if let Err(e) = self.ledger.atomic_decrement(&lines).await {
            return Err(match e {
                LedgerError::WouldGoNegative {
                    ingredient_id,
                    available,
                    requested,
                } => {
                    // Stock changed outside this process after the check.
                    tracing::warn!(%ingredient_id, available, requested, "stock moved before commit");
                    let line = recipe.iter().find(|l| l.ingredient_id == ingredient_id);
                    PrepareError::InsufficientStock {
                        beverage_id,
                        shortages: vec![StockShortage {
                            ingredient_id,
                            ingredient_name: line
                                .map(|l| l.ingredient_name.clone())
                                .unwrap_or_default(),
                            required: u32::try_from(requested).unwrap_or(u32::MAX),
                            available,
                            unit: line.map(|l| l.unit.clone()).unwrap_or_default(),
                        }],
                    }
                }
                other => other.into(),
            });
        }

        Ok(PrepareResult {
            beverage_id,
            beverage_name: beverage.name,
            consumed: recipe.into_iter().map(ConsumedLine::from).collect(),
        })
    }

    async fn adjust_stock(&self, changes: &[StockAdjustment]) -> Result<Vec<Ingredient>> {
        let _guard = self.lock.acquire().await;
        let ingredients = self.ledger.adjust_stock(changes).await?;
        metrics::counter!("stock_adjustments_total").increment(changes.len() as u64);
        tracing::info!(changes = changes.len(), "stock adjusted");
        Ok(ingredients)
    }
}

fn advance(stage: &mut PreparationStage, next: PreparationStage) {
    debug_assert!(stage.holds_lock(), "transition from {stage} without the lock");
    tracing::debug!(from = %stage, to = %next, "preparation stage");
    *stage = next;
}
