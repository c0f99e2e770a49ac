//! Recovery outcome and step vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Observable result of the most recent recovery sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum RecoveryOutcome {
    #[default]
    Idle,
    Recovering,
    Recovered,
    NotFound,
    Error(String),
}

impl RecoveryOutcome {
    /// Whether a sequence is currently executing.
    #[must_use]
    pub fn is_recovering(&self) -> bool {
        matches!(self, Self::Recovering)
    }
}

impl fmt::Display for RecoveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Recovering => f.write_str("recovering"),
            Self::Recovered => f.write_str("recovered"),
            Self::NotFound => f.write_str("not found"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

/// What happened to a single recovery request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "outcome", rename_all = "snake_case")]
pub enum RecoveryAttempt {
    /// The request passed the guard and the sequence ran to completion.
    Completed(RecoveryOutcome),
    /// Another sequence was already running; the request was dropped.
    Dropped,
}

impl RecoveryAttempt {
    #[must_use]
    pub fn outcome(&self) -> Option<&RecoveryOutcome> {
        match self {
            Self::Completed(outcome) => Some(outcome),
            Self::Dropped => None,
        }
    }
}

/// The externally visible steps of a recovery sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStep {
    ReleaseInput,
    OpenContext,
    ScreenSize,
    MovePointer,
    LocateTarget,
    PressKey,
    CloseContext,
}

impl fmt::Display for RecoveryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReleaseInput => "release_input",
            Self::OpenContext => "open_context",
            Self::ScreenSize => "screen_size",
            Self::MovePointer => "move_pointer",
            Self::LocateTarget => "locate_target",
            Self::PressKey => "press_key",
            Self::CloseContext => "close_context",
        };
        f.write_str(name)
    }
}

/// Where a recovery request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerOrigin {
    /// A marker line appeared in the watched log.
    LogStream,
    /// An operator asked for it (hotkey, button, API call).
    Manual,
}

impl fmt::Display for TriggerOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogStream => f.write_str("log_stream"),
            Self::Manual => f.write_str("manual"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_idle() {
        assert_eq!(RecoveryOutcome::default(), RecoveryOutcome::Idle);
    }

    #[test]
    fn should_display_error_with_message() {
        let outcome = RecoveryOutcome::Error("move_pointer failed: boom".to_string());
        assert_eq!(outcome.to_string(), "error: move_pointer failed: boom");
    }

    #[test]
    fn should_serialize_outcome_with_state_tag() {
        let json = serde_json::to_value(RecoveryOutcome::NotFound).unwrap();
        assert_eq!(json, serde_json::json!({"state": "not_found"}));

        let json = serde_json::to_value(RecoveryOutcome::Error("x".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"state": "error", "message": "x"}));
    }

    #[test]
    fn should_expose_outcome_only_for_completed_attempts() {
        let completed = RecoveryAttempt::Completed(RecoveryOutcome::Recovered);
        assert_eq!(completed.outcome(), Some(&RecoveryOutcome::Recovered));
        assert_eq!(RecoveryAttempt::Dropped.outcome(), None);
    }

    #[test]
    fn should_report_recovering_only_while_running() {
        assert!(RecoveryOutcome::Recovering.is_recovering());
        assert!(!RecoveryOutcome::Recovered.is_recovering());
    }
}
