//! # azerus-adapter-virtual
//!
//! Simulated input backend. It implements both executor ports without
//! touching the operating system:
//!
//! | Port | Behaviour |
//! |------|-----------|
//! | `ActionExecutor` | One `Click` at the pointer position per action |
//! | `RecoverySteps` | `KeyPress` for open/close/assign, `MoveTo` for pointer moves, detections from configuration |
//!
//! Every event lands in a journal that tests and dry runs can inspect.
//!
//! ## Dependency rule
//!
//! Depends on `azerus-app` (port traits) and `azerus-domain` only.

mod journal;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use azerus_app::ports::{ActionExecutor, RecoverySteps};
use azerus_domain::error::{ActionError, StepError};
use azerus_domain::recovery::{Detections, RecoveryStep};

pub use journal::InputEvent;

/// Static parameters of the simulated screen and keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualInputConfig {
    /// Key that opens and closes the inventory.
    pub context_key: String,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Time the button stays down during a click.
    pub click_hold: Duration,
}

impl Default for VirtualInputConfig {
    fn default() -> Self {
        Self {
            context_key: "q".to_string(),
            screen_width: 1920,
            screen_height: 1080,
            click_hold: Duration::ZERO,
        }
    }
}

/// Input backend that records instead of injecting.
pub struct VirtualInput {
    config: VirtualInputConfig,
    journal: journal::Journal,
    pointer: Mutex<(i32, i32)>,
    detections: Mutex<Detections>,
    failing_step: Mutex<Option<RecoveryStep>>,
}

impl Default for VirtualInput {
    fn default() -> Self {
        Self::new(VirtualInputConfig::default())
    }
}

impl VirtualInput {
    #[must_use]
    pub fn new(config: VirtualInputConfig) -> Self {
        Self {
            config,
            journal: journal::Journal::default(),
            pointer: Mutex::new((0, 0)),
            detections: Mutex::new(Detections::none()),
            failing_step: Mutex::new(None),
        }
    }

    /// What the detectors report on the next `locate_target`.
    pub fn set_detections(&self, detections: Detections) {
        *lock(&self.detections) = detections;
    }

    /// Make one recovery step fail until cleared with `None`.
    pub fn fail_step(&self, step: Option<RecoveryStep>) {
        *lock(&self.failing_step) = step;
    }

    /// Copy of every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<InputEvent> {
        self.journal.snapshot()
    }

    /// Number of clicks fired by the action loop.
    #[must_use]
    pub fn clicks(&self) -> usize {
        self.journal
            .snapshot()
            .iter()
            .filter(|event| matches!(event, InputEvent::Click { .. }))
            .count()
    }

    pub fn clear_events(&self) {
        self.journal.clear();
    }

    #[must_use]
    pub fn pointer(&self) -> (i32, i32) {
        *lock(&self.pointer)
    }

    fn check_step(&self, step: RecoveryStep) -> Result<(), StepError> {
        if *lock(&self.failing_step) == Some(step) {
            return Err(StepError::new(step, "virtual failure injected"));
        }
        Ok(())
    }

    fn press(&self, key: &str) {
        self.journal.record(InputEvent::KeyPress {
            key: key.to_string(),
        });
    }
}

impl ActionExecutor for VirtualInput {
    async fn perform_one_action(&self) -> Result<(), ActionError> {
        let (x, y) = self.pointer();
        if !self.config.click_hold.is_zero() {
            tokio::time::sleep(self.config.click_hold).await;
        }
        self.journal.record(InputEvent::Click { x, y });
        Ok(())
    }

    async fn release_input(&self) -> Result<(), ActionError> {
        self.journal.record(InputEvent::ButtonUp);
        Ok(())
    }
}

impl RecoverySteps for VirtualInput {
    async fn open_context(&self) -> Result<(), StepError> {
        self.check_step(RecoveryStep::OpenContext)?;
        self.press(&self.config.context_key);
        Ok(())
    }

    async fn close_context(&self) -> Result<(), StepError> {
        self.check_step(RecoveryStep::CloseContext)?;
        self.press(&self.config.context_key);
        Ok(())
    }

    async fn move_pointer(&self, x: i32, y: i32) -> Result<(), StepError> {
        self.check_step(RecoveryStep::MovePointer)?;
        *lock(&self.pointer) = (x, y);
        self.journal.record(InputEvent::MoveTo { x, y });
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), StepError> {
        self.check_step(RecoveryStep::PressKey)?;
        self.press(key);
        Ok(())
    }

    async fn locate_target(&self) -> Result<Detections, StepError> {
        self.check_step(RecoveryStep::LocateTarget)?;
        let detections = *lock(&self.detections);
        tracing::debug!(?detections, "virtual detectors ran");
        Ok(detections)
    }

    async fn screen_size(&self) -> Result<(u32, u32), StepError> {
        self.check_step(RecoveryStep::ScreenSize)?;
        Ok((self.config.screen_width, self.config.screen_height))
    }

    async fn release_input(&self) -> Result<(), StepError> {
        self.check_step(RecoveryStep::ReleaseInput)?;
        self.journal.record(InputEvent::ButtonUp);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
