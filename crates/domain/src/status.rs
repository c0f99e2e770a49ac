//! Status snapshots — the read-only surface polled by presentation layers.

use serde::Serialize;

use crate::gate::GateSnapshot;
use crate::id::RecoveryId;
use crate::rate::ActionRate;
use crate::recovery::{RecoveryOutcome, TriggerOrigin};
use crate::time::Timestamp;

/// State of the periodic action engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub running: bool,
    /// Whether the operator last toggled the loop on.
    pub user_intent: bool,
    pub rate: ActionRate,
    pub actions_fired: u64,
    /// Milliseconds since the last action fired, if any did.
    pub last_action_ms_ago: Option<u64>,
}

/// Bookkeeping of recovery sequences.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RecoveryStatus {
    pub outcome: RecoveryOutcome,
    pub last_recovery: Option<RecoveryId>,
    pub last_origin: Option<TriggerOrigin>,
    pub finished_at: Option<Timestamp>,
    pub completed: u64,
    pub dropped: u64,
}

impl RecoveryStatus {
    /// Mark a new sequence as started.
    pub fn begin(&mut self, id: RecoveryId, origin: TriggerOrigin) {
        self.outcome = RecoveryOutcome::Recovering;
        self.last_recovery = Some(id);
        self.last_origin = Some(origin);
    }

    /// Record the final outcome of the running sequence.
    pub fn finish(&mut self, outcome: RecoveryOutcome, at: Timestamp) {
        self.outcome = outcome;
        self.finished_at = Some(at);
        self.completed += 1;
    }

    /// Count a request rejected by the re-entrancy guard.
    pub fn record_dropped(&mut self) {
        self.dropped += 1;
    }
}

/// Everything a status poller needs in one read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub engine: EngineStatus,
    pub gate: GateSnapshot,
    pub recovery: RecoveryStatus,
}
