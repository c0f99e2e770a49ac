//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`AzerusError`] via `#[from]`.

use std::time::Duration;

use crate::recovery::RecoveryStep;

/// Top-level error for the azerus workspace.
#[derive(Debug, thiserror::Error)]
pub enum AzerusError {
    /// Input rejected synchronously (e.g. a non-positive rate).
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The periodic action could not be performed.
    #[error("action failed")]
    Action(#[from] ActionError),

    /// A single recovery step failed.
    #[error("recovery step failed")]
    Step(#[from] StepError),

    /// The action loop did not terminate before the force-stop deadline.
    #[error("stop timed out")]
    StopTimeout(#[from] StopTimeout),

    /// Reading the watched log stream failed.
    #[error("stream read failed")]
    Stream(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Action rate must be a finite number greater than zero.
    #[error("rate must be greater than zero, got {0}")]
    InvalidRate(f64),

    /// The log marker must not be empty.
    #[error("marker must not be empty")]
    EmptyMarker,

    /// A trigger source path must not be empty.
    #[error("trigger source path must not be empty")]
    EmptySourcePath,
}

/// Failure of a single periodic action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure of one recovery step, tagged with the step that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{step} failed: {message}")]
pub struct StepError {
    pub step: RecoveryStep,
    pub message: String,
}

impl StepError {
    #[must_use]
    pub fn new(step: RecoveryStep, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}

/// The action loop was still alive when the force-stop deadline expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("action loop still alive after {}ms", waited.as_millis())]
pub struct StopTimeout {
    pub waited: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_invalid_rate() {
        let err = ValidationError::InvalidRate(-5.0);
        assert_eq!(err.to_string(), "rate must be greater than zero, got -5");
    }

    #[test]
    fn should_display_step_error_with_step_name() {
        let err = StepError::new(RecoveryStep::MovePointer, "display lost");
        assert_eq!(err.to_string(), "move_pointer failed: display lost");
    }

    #[test]
    fn should_display_stop_timeout_in_millis() {
        let err = StopTimeout {
            waited: Duration::from_millis(200),
        };
        assert_eq!(err.to_string(), "action loop still alive after 200ms");
    }

    #[test]
    fn should_convert_validation_error_into_top_level() {
        let err: AzerusError = ValidationError::EmptyMarker.into();
        assert!(matches!(
            err,
            AzerusError::Validation(ValidationError::EmptyMarker)
        ));
    }
}
