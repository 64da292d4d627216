//! Observer trait for run state changes.
//!
//! The orchestrator owns its state privately; callers (a UI, a CLI) receive
//! change notifications through a [`RunObserver`] and read snapshots from
//! [`crate::run::RunState`] between mutations. Observers never mutate.

use crate::run::{SlideProgress, StepId, StepStatus};
use parking_lot::RwLock;

/// Receives notifications as a run mutates its state.
///
/// All methods default to no-ops so observers implement only what they need.
/// Implementations must not block; they are called from within the run's
/// sequential execution.
pub trait RunObserver: Send + Sync {
    /// A line was appended to the run log.
    fn on_log(&self, line: &str) {
        let _ = line;
    }

    /// A step changed status. `error` is present only for error transitions.
    fn on_step(&self, step: StepId, status: StepStatus, error: Option<&str>) {
        let _ = (step, status, error);
    }

    /// Slide fan-out progress changed.
    fn on_slide_progress(&self, progress: SlideProgress) {
        let _ = progress;
    }
}

/// Discards all notifications. Default when no observer is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RunObserver for NoOpObserver {}

/// Records every notification, for tests and debugging.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    log_lines: RwLock<Vec<String>>,
    steps: RwLock<Vec<(StepId, StepStatus, Option<String>)>>,
    progress: RwLock<Vec<SlideProgress>>,
}

impl CollectingObserver {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All observed log lines, in order.
    #[must_use]
    pub fn log_lines(&self) -> Vec<String> {
        self.log_lines.read().clone()
    }

    /// All observed step transitions, in order.
    #[must_use]
    pub fn step_transitions(&self) -> Vec<(StepId, StepStatus, Option<String>)> {
        self.steps.read().clone()
    }

    /// All observed progress updates, in order.
    #[must_use]
    pub fn progress_updates(&self) -> Vec<SlideProgress> {
        self.progress.read().clone()
    }
}

impl RunObserver for CollectingObserver {
    fn on_log(&self, line: &str) {
        self.log_lines.write().push(line.to_string());
    }

    fn on_step(&self, step: StepId, status: StepStatus, error: Option<&str>) {
        self.steps
            .write()
            .push((step, status, error.map(str::to_owned)));
    }

    fn on_slide_progress(&self, progress: SlideProgress) {
        self.progress.write().push(progress);
    }
}
