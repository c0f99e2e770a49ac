//! Recovery coordinator: the weapon recovery state machine.
//!
//! `Idle → Recovering → {Recovered | NotFound | Error} → Idle`.
//!
//! The ordering of gate updates around the sequence is the contract:
//!
//! 1. disallow actions
//! 2. mark recovery in progress
//! 3. force-stop the action loop (bounded)
//! 4. settle, release held input
//! 5. open context → neutral move → locate → assign → close
//! 6. clear recovery in progress
//! 7. allow actions
//! 8. restart the action loop if it was running
//!
//! The loop's execution context never exists between 3 and 8, apart from
//! the accepted case of a loop that outlived the force-stop deadline.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use azerus_domain::error::StepError;
use azerus_domain::gate::PermissionGate;
use azerus_domain::id::RecoveryId;
use azerus_domain::recovery::{RecoveryAttempt, RecoveryOutcome, TriggerOrigin};
use azerus_domain::status::RecoveryStatus;
use azerus_domain::time;

use crate::action_engine::{PeriodicActionEngine, StartOutcome};
use crate::ports::{ActionExecutor, RecoverySteps, RecoveryTrigger};

/// Timing and key bindings of a recovery sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryConfig {
    /// Hard deadline for stopping the action loop.
    pub force_stop_deadline: Duration,
    /// Pause after the force stop so in-flight input events drain.
    pub settle_delay: Duration,
    /// Pause after opening the context, letting it render.
    pub open_delay: Duration,
    /// Pause after closing the context.
    pub close_delay: Duration,
    /// Key that assigns the hovered item to its hotbar slot.
    pub assign_key: String,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            force_stop_deadline: Duration::from_secs(3),
            settle_delay: Duration::from_millis(50),
            open_delay: Duration::from_millis(220),
            close_delay: Duration::from_millis(120),
            assign_key: "2".to_string(),
        }
    }
}

/// Runs at most one recovery sequence at a time, process-wide.
///
/// Each sequence runs on its own task. A caller that stops waiting (an HTTP
/// client hanging up, a timeout) never cuts a sequence short, so teardown
/// and the engine restart always happen.
pub struct RecoveryCoordinator<A, R> {
    shared: Arc<Shared<A, R>>,
}

struct Shared<A, R> {
    gate: Arc<PermissionGate>,
    engine: PeriodicActionEngine<A>,
    steps: R,
    config: RecoveryConfig,
    status: Mutex<RecoveryStatus>,
    exclusive: Arc<tokio::sync::Mutex<()>>,
}

impl<A, R> RecoveryCoordinator<A, R>
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
{
    pub fn new(
        gate: Arc<PermissionGate>,
        engine: PeriodicActionEngine<A>,
        steps: R,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                gate,
                engine,
                steps,
                config,
                status: Mutex::new(RecoveryStatus::default()),
                exclusive: Arc::new(tokio::sync::Mutex::new(())),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RecoveryConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn status(&self) -> RecoveryStatus {
        self.shared.lock_status().clone()
    }

    #[must_use]
    pub fn last_outcome(&self) -> RecoveryOutcome {
        self.shared.lock_status().outcome.clone()
    }

    /// Run a recovery sequence and wait for its outcome.
    ///
    /// Requests arriving while another sequence holds the guard are dropped,
    /// never queued. Once past the guard the sequence always runs to
    /// completion, even if this future is dropped, and failures inside it
    /// never escape: they become [`RecoveryOutcome::Error`].
    pub async fn request_recovery(&self, origin: TriggerOrigin) -> RecoveryAttempt {
        let Ok(exclusive) = Arc::clone(&self.shared.exclusive).try_lock_owned() else {
            return self.shared.drop_request(origin);
        };
        if self.shared.gate.is_recovery_in_progress() {
            return self.shared.drop_request(origin);
        }

        let shared = Arc::clone(&self.shared);
        let sequence = tokio::spawn(async move {
            let outcome = shared.run_sequence(RecoveryId::new(), origin).await;
            drop(exclusive);
            outcome
        });

        match sequence.await {
            Ok(outcome) => RecoveryAttempt::Completed(outcome),
            Err(err) => RecoveryAttempt::Completed(self.shared.abandon(&err.to_string())),
        }
    }
}

impl<A, R> Shared<A, R>
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
{
    fn drop_request(&self, origin: TriggerOrigin) -> RecoveryAttempt {
        tracing::debug!(%origin, "recovery already running; request dropped");
        self.lock_status().record_dropped();
        RecoveryAttempt::Dropped
    }

    /// Reopen the gate after the sequence task died without tearing down.
    fn abandon(&self, reason: &str) -> RecoveryOutcome {
        tracing::error!(%reason, "recovery task died; releasing gate");
        let outcome = RecoveryOutcome::Error(format!("recovery task died: {reason}"));
        self.gate.set_recovery_in_progress(false);
        self.gate.set_actions_allowed(true);
        self.lock_status().finish(outcome.clone(), time::now());
        outcome
    }

    #[tracing::instrument(name = "recovery", skip_all, fields(%id, %origin))]
    async fn run_sequence(&self, id: RecoveryId, origin: TriggerOrigin) -> RecoveryOutcome {
        tracing::info!("recovery started");
        self.lock_status().begin(id, origin);

        let was_running = self.engine.is_running();
        tracing::debug!(was_running, "action loop state before recovery");

        self.gate.set_actions_allowed(false);
        self.gate.set_recovery_in_progress(true);

        // A start() that raced the gate update may have spawned a loop after
        // `was_running` was read; it is stopped (and later resumed) as well.
        let resume = was_running || self.engine.is_running();
        if resume {
            if let Err(err) = self.engine.force_stop(self.config.force_stop_deadline).await {
                tracing::error!(%err, "proceeding although the action loop may still be alive");
            }
        }

        tokio::time::sleep(self.config.settle_delay).await;
        if let Err(err) = self.steps.release_input().await {
            tracing::debug!(%err, "defensive input release failed");
        }

        let outcome = match self.recovery_body().await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(%err, "recovery failed");
                RecoveryOutcome::Error(err.to_string())
            }
        };

        self.gate.set_recovery_in_progress(false);
        self.gate.set_actions_allowed(true);
        self.lock_status().finish(outcome.clone(), time::now());

        if resume {
            tracing::info!("restarting action loop (was active before recovery)");
            let restarted = self.engine.start();
            if restarted != StartOutcome::Started {
                tracing::warn!(?restarted, "action loop did not restart after recovery");
            }
        }

        tracing::info!(%outcome, "recovery finished");
        outcome
    }

    /// Open, locate/assign, close. Close runs whenever open succeeded.
    async fn recovery_body(&self) -> Result<RecoveryOutcome, StepError> {
        tracing::info!("opening recovery context");
        self.steps.open_context().await?;
        tokio::time::sleep(self.config.open_delay).await;

        let located = self.locate_and_assign().await;

        tracing::info!("closing recovery context");
        let closed = self.steps.close_context().await;
        tokio::time::sleep(self.config.close_delay).await;

        match (located, closed) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), closed) => {
                if let Err(close_err) = closed {
                    tracing::error!(%close_err, "closing recovery context failed as well");
                }
                Err(err)
            }
        }
    }

    async fn locate_and_assign(&self) -> Result<RecoveryOutcome, StepError> {
        if let Err(err) = self.move_to_neutral().await {
            tracing::warn!(%err, "neutral pointer move failed");
        }

        let detections = self.steps.locate_target().await?;
        let Some(target) = detections.best() else {
            tracing::warn!("target not found by either detector");
            return Ok(RecoveryOutcome::NotFound);
        };
        tracing::info!(
            kind = %target.kind,
            x = target.x,
            y = target.y,
            confidence = target.confidence,
            "target located"
        );

        self.steps.move_pointer(target.x, target.y).await?;
        tracing::debug!(key = %self.config.assign_key, "assigning target");
        self.steps.press_key(&self.config.assign_key).await?;
        Ok(RecoveryOutcome::Recovered)
    }

    async fn move_to_neutral(&self) -> Result<(), StepError> {
        let (width, height) = self.steps.screen_size().await?;
        let (x, y) = neutral_point(width, height);
        self.steps.move_pointer(x, y).await?;
        tracing::debug!(x, y, "pointer moved to neutral position");
        Ok(())
    }

    fn lock_status(&self) -> MutexGuard<'_, RecoveryStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A, R> RecoveryTrigger for RecoveryCoordinator<A, R>
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
{
    async fn trigger(&self, origin: TriggerOrigin) -> RecoveryAttempt {
        self.request_recovery(origin).await
    }
}

/// Horizontal centre, upper quarter: away from both the inventory grid and
/// the hotbar.
fn neutral_point(width: u32, height: u32) -> (i32, i32) {
    let x = i32::try_from(width / 2).unwrap_or(i32::MAX);
    let y = i32::try_from(height / 4).unwrap_or(i32::MAX);
    (x, y)
}
