//! Coordinator façade — owns the gate, the engine and the recovery
//! coordinator, and exposes the control and status surface.

use std::sync::Arc;

use azerus_domain::error::ValidationError;
use azerus_domain::gate::PermissionGate;
use azerus_domain::rate::ActionRate;
use azerus_domain::recovery::{RecoveryAttempt, RecoveryOutcome, TriggerOrigin};
use azerus_domain::status::StatusSnapshot;

use crate::action_engine::{EarlyStop, GRACEFUL_STOP_TIMEOUT, PeriodicActionEngine};
use crate::ports::{ActionExecutor, RecoverySteps, RecoveryTrigger};
use crate::recovery::{RecoveryConfig, RecoveryCoordinator};

/// Explicitly constructed replacement for process-wide singletons: one gate
/// and one engine, shared by reference with every component that needs them.
pub struct Coordinator<A, R> {
    gate: Arc<PermissionGate>,
    engine: PeriodicActionEngine<A>,
    recovery: RecoveryCoordinator<A, R>,
}

impl<A, R> Coordinator<A, R>
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
{
    pub fn new(executor: A, steps: R, rate: ActionRate, config: RecoveryConfig) -> Self {
        let gate = Arc::new(PermissionGate::new());
        let engine = PeriodicActionEngine::new(Arc::clone(&gate), executor, rate);
        let recovery = RecoveryCoordinator::new(Arc::clone(&gate), engine.clone(), steps, config);
        Self {
            gate,
            engine,
            recovery,
        }
    }

    #[must_use]
    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    #[must_use]
    pub fn engine(&self) -> &PeriodicActionEngine<A> {
        &self.engine
    }

    /// Operator toggle. Returns whether the loop runs afterwards.
    pub async fn toggle(&self) -> bool {
        self.engine.toggle().await
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRate`] for non-positive rates; the
    /// current rate is left unchanged.
    pub fn set_rate(&self, per_second: f64) -> Result<ActionRate, ValidationError> {
        self.engine.set_rate(per_second)
    }

    pub fn set_early_stop(&self, predicate: Option<EarlyStop>) {
        self.engine.set_early_stop(predicate);
    }

    /// Request a recovery from the operator.
    pub async fn manual_trigger(&self) -> RecoveryAttempt {
        self.recovery.request_recovery(TriggerOrigin::Manual).await
    }

    #[must_use]
    pub fn last_outcome(&self) -> RecoveryOutcome {
        self.recovery.last_outcome()
    }

    #[must_use]
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            engine: self.engine.status(),
            gate: self.gate.snapshot(),
            recovery: self.recovery.status(),
        }
    }

    /// Stop the action loop before the process exits.
    ///
    /// The loop task holds its own handle on the engine state, so dropping
    /// the façade alone would leave it running.
    pub async fn shutdown(&self) {
        tracing::info!("shutting down coordinator");
        self.engine.stop(GRACEFUL_STOP_TIMEOUT).await;
    }
}

impl<A, R> RecoveryTrigger for Coordinator<A, R>
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
{
    async fn trigger(&self, origin: TriggerOrigin) -> RecoveryAttempt {
        self.recovery.request_recovery(origin).await
    }
}
