//! Periodic action engine — fires the action at a configurable rate on its
//! own task.
//!
//! The loop consults the [`PermissionGate`] and the optional early-stop
//! predicate twice per cycle: once before scheduling and once immediately
//! before firing, so a permission revoked in between is still honoured.
//! Sleeps are sliced into short ticks so that a stop request is observed
//! within a few milliseconds.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use azerus_domain::error::{StopTimeout, ValidationError};
use azerus_domain::gate::PermissionGate;
use azerus_domain::id::RunId;
use azerus_domain::rate::ActionRate;
use azerus_domain::status::EngineStatus;

use crate::ports::ActionExecutor;

/// Longest single sleep while waiting for the next due action.
const TICK: Duration = Duration::from_millis(2);

/// Sleep between gate polls while actions are disallowed.
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Poll step while waiting for the loop task to end.
const STOP_POLL: Duration = Duration::from_millis(1);

/// Timeout used by [`PeriodicActionEngine::toggle`] when stopping.
pub const GRACEFUL_STOP_TIMEOUT: Duration = Duration::from_millis(600);

/// Externally supplied predicate; when it returns `true` the loop exits.
pub type EarlyStop = Arc<dyn Fn() -> bool + Send + Sync>;

/// Result of [`PeriodicActionEngine::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
    Blocked(StartBlocked),
}

/// Why a start request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartBlocked {
    RecoveryInProgress,
    ActionsDisallowed,
    ExecutorUnavailable,
}

impl fmt::Display for StartBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecoveryInProgress => f.write_str("recovery in progress"),
            Self::ActionsDisallowed => f.write_str("actions disallowed by gate"),
            Self::ExecutorUnavailable => f.write_str("action executor unavailable"),
        }
    }
}

/// Handle to the periodic action loop.
///
/// Cloning the handle shares the same loop; the engine state lives behind
/// an `Arc`.
pub struct PeriodicActionEngine<A> {
    shared: Arc<Shared<A>>,
}

impl<A> Clone for PeriodicActionEngine<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<A> {
    gate: Arc<PermissionGate>,
    executor: A,
    rate: Mutex<ActionRate>,
    early_stop: RwLock<Option<EarlyStop>>,
    user_intent: AtomicBool,
    actions_fired: AtomicU64,
    last_action: Mutex<Option<Instant>>,
    run: Mutex<Option<ActiveRun>>,
}

/// The execution context of one loop lifetime.
struct ActiveRun {
    id: RunId,
    stop: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ActiveRun {
    fn is_alive(&self) -> bool {
        !self.task.is_finished()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<A: ActionExecutor> Shared<A> {
    fn rate(&self) -> ActionRate {
        *lock(&self.rate)
    }

    fn early_stop_requested(&self) -> bool {
        let predicate = self
            .early_stop
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        predicate.as_ref().is_some_and(|f| f())
    }

    fn record_action(&self, at: Instant) {
        *lock(&self.last_action) = Some(at);
        self.actions_fired.fetch_add(1, Ordering::Relaxed);
    }
}

impl<A: ActionExecutor + 'static> PeriodicActionEngine<A> {
    /// Create a stopped engine.
    pub fn new(gate: Arc<PermissionGate>, executor: A, rate: ActionRate) -> Self {
        Self {
            shared: Arc::new(Shared {
                gate,
                executor,
                rate: Mutex::new(rate),
                early_stop: RwLock::new(None),
                user_intent: AtomicBool::new(false),
                actions_fired: AtomicU64::new(0),
                last_action: Mutex::new(None),
                run: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn rate(&self) -> ActionRate {
        self.shared.rate()
    }

    /// Change the rate. Takes effect at the next scheduling decision of a
    /// running loop; no restart needed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRate`] when `per_second <= 0`; the
    /// current rate is left unchanged.
    pub fn set_rate(&self, per_second: f64) -> Result<ActionRate, ValidationError> {
        let rate = ActionRate::new(per_second)?;
        *lock(&self.shared.rate) = rate;
        tracing::info!(%rate, "action rate updated");
        Ok(rate)
    }

    /// Install or clear the early-stop predicate.
    pub fn set_early_stop(&self, predicate: Option<EarlyStop>) {
        *self
            .shared
            .early_stop
            .write()
            .unwrap_or_else(PoisonError::into_inner) = predicate;
    }

    /// Whether the loop's execution context is currently alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.shared.run)
            .as_ref()
            .is_some_and(ActiveRun::is_alive)
    }

    /// Whether the operator last toggled the loop on.
    #[must_use]
    pub fn user_intent(&self) -> bool {
        self.shared.user_intent.load(Ordering::SeqCst)
    }

    /// Spawn the action loop.
    ///
    /// Never fails loudly: a refused start is logged and reported through
    /// the returned [`StartOutcome`]. The gate is read while holding the
    /// run slot, so a recovery that closed the gate and then observed
    /// `is_running() == false` can never be raced by a new loop.
    pub fn start(&self) -> StartOutcome {
        let mut run = lock(&self.shared.run);

        if self.shared.gate.is_recovery_in_progress() {
            tracing::info!("action loop start blocked: recovery in progress");
            return StartOutcome::Blocked(StartBlocked::RecoveryInProgress);
        }
        if !self.shared.gate.are_actions_allowed() {
            tracing::info!("action loop start blocked: gate disallows actions");
            return StartOutcome::Blocked(StartBlocked::ActionsDisallowed);
        }
        if run.as_ref().is_some_and(ActiveRun::is_alive) {
            return StartOutcome::AlreadyRunning;
        }
        if !self.shared.executor.is_available() {
            tracing::error!("action executor unavailable; action loop not started");
            return StartOutcome::Blocked(StartBlocked::ExecutorUnavailable);
        }

        let id = RunId::new();
        let stop = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run_loop(
            Arc::clone(&self.shared),
            Arc::clone(&stop),
            id,
        ));
        tracing::info!(run_id = %id, rate = %self.rate(), "action loop started");
        *run = Some(ActiveRun { id, stop, task });
        StartOutcome::Started
    }

    /// Flip the loop on or off, recording the operator's intent.
    ///
    /// Returns whether the loop is running afterwards.
    pub async fn toggle(&self) -> bool {
        if self.is_running() {
            self.shared.user_intent.store(false, Ordering::SeqCst);
            self.stop(GRACEFUL_STOP_TIMEOUT).await;
            false
        } else {
            self.shared.user_intent.store(true, Ordering::SeqCst);
            matches!(
                self.start(),
                StartOutcome::Started | StartOutcome::AlreadyRunning
            )
        }
    }

    /// Request graceful termination and wait up to `timeout`.
    ///
    /// Idempotent. Always leaves the engine stopped and releases held input,
    /// even when the loop outlives the timeout (logged, not returned).
    pub async fn stop(&self, timeout: Duration) {
        let Some(id) = self.signal_stop() else {
            return;
        };
        tracing::info!(run_id = %id, "stopping action loop");
        if let Err(err) = self.await_exit(id, timeout, false).await {
            tracing::error!(run_id = %id, %err, "action loop did not stop within timeout");
        }
        self.release_input().await;
    }

    /// Stop with a hard deadline.
    ///
    /// Returns within `max_wait` plus one input release regardless of how
    /// the loop behaves. A loop still alive at the deadline is aborted
    /// (best-effort: an action that never yields can still complete) and
    /// reported as [`StopTimeout`].
    ///
    /// # Errors
    ///
    /// Returns [`StopTimeout`] when the loop was still alive at the deadline.
    pub async fn force_stop(&self, max_wait: Duration) -> Result<(), StopTimeout> {
        let Some(id) = self.signal_stop() else {
            return Ok(());
        };
        tracing::info!(run_id = %id, "force-stopping action loop");
        let result = self.await_exit(id, max_wait, true).await;
        if let Err(err) = &result {
            tracing::error!(run_id = %id, %err, "force stop deadline exceeded");
        }
        self.release_input().await;
        result
    }

    /// Snapshot for status readers.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        let last_action = *lock(&self.shared.last_action);
        let last_action_ms_ago =
            last_action.map(|at| u64::try_from(at.elapsed().as_millis()).unwrap_or(u64::MAX));
        EngineStatus {
            running: self.is_running(),
            user_intent: self.user_intent(),
            rate: self.rate(),
            actions_fired: self.shared.actions_fired.load(Ordering::Relaxed),
            last_action_ms_ago,
        }
    }

    fn signal_stop(&self) -> Option<RunId> {
        let run = lock(&self.shared.run);
        let run = run.as_ref()?;
        run.stop.store(true, Ordering::SeqCst);
        Some(run.id)
    }

    /// Poll until the loop identified by `id` has exited or `deadline`
    /// passes, then vacate the run slot.
    async fn await_exit(
        &self,
        id: RunId,
        deadline: Duration,
        abort_on_timeout: bool,
    ) -> Result<(), StopTimeout> {
        let started = Instant::now();
        while self.is_run_alive(id) && started.elapsed() < deadline {
            tokio::time::sleep(STOP_POLL).await;
        }

        let Some(run) = self.take_run(id) else {
            return Ok(());
        };
        if !run.is_alive() {
            return Ok(());
        }
        if abort_on_timeout {
            run.task.abort();
        }
        Err(StopTimeout { waited: deadline })
    }

    fn is_run_alive(&self, id: RunId) -> bool {
        lock(&self.shared.run)
            .as_ref()
            .is_some_and(|run| run.id == id && run.is_alive())
    }

    fn take_run(&self, id: RunId) -> Option<ActiveRun> {
        let mut slot = lock(&self.shared.run);
        if slot.as_ref().is_some_and(|run| run.id == id) {
            slot.take()
        } else {
            None
        }
    }

    async fn release_input(&self) {
        if let Err(err) = self.shared.executor.release_input().await {
            tracing::debug!(%err, "input release after stop failed");
        }
    }
}

async fn run_loop<A: ActionExecutor>(
    shared: Arc<Shared<A>>,
    stop: Arc<AtomicBool>,
    run_id: RunId,
) {
    tracing::debug!(%run_id, "action loop running");
    let mut last_fired: Option<Instant> = None;

    while !stop.load(Ordering::SeqCst) {
        if shared.early_stop_requested() {
            tracing::debug!(%run_id, "early-stop predicate fired");
            break;
        }
        if !shared.gate.are_actions_allowed() {
            tokio::time::sleep(IDLE_POLL).await;
            continue;
        }

        // Re-read the rate on every tick so a change applies to the pending
        // wait, not only to the one after it.
        let now = Instant::now();
        let wait = last_fired.map_or(Duration::ZERO, |at| remaining(at, shared.rate(), now));
        if !wait.is_zero() {
            tokio::time::sleep(TICK.min(wait)).await;
            continue;
        }

        // Final gates, closing the window since the coarse check.
        if stop.load(Ordering::SeqCst) || shared.early_stop_requested() {
            break;
        }
        if !shared.gate.are_actions_allowed() {
            continue;
        }

        if let Err(err) = shared.executor.perform_one_action().await {
            tracing::error!(%run_id, %err, "action failed; action loop terminated");
            break;
        }
        shared.record_action(now);
        last_fired = Some(now);
    }

    tracing::debug!(%run_id, "action loop exited");
}

/// Time left until the action after the one fired at `fired_at` is due.
fn remaining(fired_at: Instant, rate: ActionRate, now: Instant) -> Duration {
    fired_at
        .checked_add(rate.interval())
        .map_or(Duration::MAX, |due| due.saturating_duration_since(now))
}
