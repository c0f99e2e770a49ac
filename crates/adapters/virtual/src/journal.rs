//! Input journal — every event the virtual backend "injected", in order.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One simulated input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Left button press and release at the pointer position.
    Click { x: i32, y: i32 },
    /// Explicit release of the left button.
    ButtonUp,
    /// Key press and release.
    KeyPress { key: String },
    /// Absolute pointer move.
    MoveTo { x: i32, y: i32 },
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click { x, y } => write!(f, "click({x},{y})"),
            Self::ButtonUp => f.write_str("button_up"),
            Self::KeyPress { key } => write!(f, "key({key})"),
            Self::MoveTo { x, y } => write!(f, "move({x},{y})"),
        }
    }
}

#[derive(Default)]
pub(crate) struct Journal {
    events: Mutex<Vec<InputEvent>>,
}

impl Journal {
    pub(crate) fn record(&self, event: InputEvent) {
        tracing::trace!(%event, "virtual input");
        self.lock().push(event);
    }

    pub(crate) fn snapshot(&self) -> Vec<InputEvent> {
        self.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<InputEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
