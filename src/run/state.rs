//! Mutable state of one pipeline run and the reporter that mutates it.
//!
//! [`RunState`] is owned by the orchestrator and mutated only from within
//! its own sequential execution; callers observe it through the read-only
//! accessors (or a [`RunObserver`]) between mutations.

use crate::observer::RunObserver;
use crate::run::status::{StepId, StepState, StepStatus};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Slide fan-out progress; meaningful only during the images step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideProgress {
    /// Slides whose image generation succeeded.
    pub completed: usize,
    /// Total slides in the batch; fixed once the fan-out starts.
    pub total: usize,
}

/// The mutable state of one run: step statuses, the append-only log,
/// slide progress, and the last persisted artifact id.
#[derive(Debug)]
pub struct RunState {
    steps: RwLock<Vec<StepState>>,
    log: RwLock<Vec<String>>,
    slide_progress: RwLock<SlideProgress>,
    last_presentation_id: RwLock<Option<String>>,
    pdf_url: RwLock<Option<String>>,
    processing: AtomicBool,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    /// Creates a fresh run state with all five steps pending.
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: RwLock::new(StepId::ALL.map(StepState::pending).to_vec()),
            log: RwLock::new(Vec::new()),
            slide_progress: RwLock::new(SlideProgress::default()),
            last_presentation_id: RwLock::new(None),
            pdf_url: RwLock::new(None),
            processing: AtomicBool::new(false),
        }
    }

    /// Resets everything except the processing flag, for a new run.
    pub(crate) fn reset(&self) {
        *self.steps.write() = StepId::ALL.map(StepState::pending).to_vec();
        self.log.write().clear();
        *self.slide_progress.write() = SlideProgress::default();
        *self.last_presentation_id.write() = None;
        *self.pdf_url.write() = None;
    }

    /// Snapshot of all step states, in execution order.
    #[must_use]
    pub fn steps(&self) -> Vec<StepState> {
        self.steps.read().clone()
    }

    /// Current status of one step.
    #[must_use]
    pub fn step_status(&self, id: StepId) -> StepStatus {
        self.steps
            .read()
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.status)
            .unwrap_or_default()
    }

    /// Snapshot of the log lines, in append order.
    #[must_use]
    pub fn log(&self) -> Vec<String> {
        self.log.read().clone()
    }

    /// Current slide fan-out progress.
    #[must_use]
    pub fn slide_progress(&self) -> SlideProgress {
        *self.slide_progress.read()
    }

    /// Id of the last persisted presentation, if any.
    #[must_use]
    pub fn last_presentation_id(&self) -> Option<String> {
        self.last_presentation_id.read().clone()
    }

    /// URL of the rendered PDF, if any.
    #[must_use]
    pub fn pdf_url(&self) -> Option<String> {
        self.pdf_url.read().clone()
    }

    /// True while a run (or a render retry) is in flight.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// True iff all five steps completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.steps
            .read()
            .iter()
            .all(|s| s.status == StepStatus::Completed)
    }

    /// True iff a render retry is currently allowed: not running, an
    /// artifact id exists, and the render step's last status was error.
    #[must_use]
    pub fn can_retry_pdf(&self) -> bool {
        !self.is_processing()
            && self.last_presentation_id().is_some()
            && self.step_status(StepId::Render) == StepStatus::Error
    }

    /// The step currently in `Processing`, if any.
    #[must_use]
    pub fn processing_step(&self) -> Option<StepId> {
        self.steps
            .read()
            .iter()
            .find(|s| s.status == StepStatus::Processing)
            .map(|s| s.id)
    }

    pub(crate) fn set_step(&self, id: StepId, status: StepStatus, error: Option<String>) {
        let mut steps = self.steps.write();
        if let Some(step) = steps.iter_mut().find(|s| s.id == id) {
            step.status = status;
            step.error_message = error;
        }
    }

    pub(crate) fn push_log(&self, line: String) {
        self.log.write().push(line);
    }

    pub(crate) fn set_slide_progress(&self, progress: SlideProgress) {
        *self.slide_progress.write() = progress;
    }

    pub(crate) fn set_last_presentation_id(&self, id: String) {
        *self.last_presentation_id.write() = Some(id);
    }

    pub(crate) fn set_pdf_url(&self, url: String) {
        *self.pdf_url.write() = Some(url);
    }

    pub(crate) fn set_processing(&self, value: bool) {
        self.processing.store(value, Ordering::SeqCst);
    }
}

/// Couples every run-state mutation with observer notification.
///
/// This is the only write path to [`RunState`]; the retry machinery and the
/// fan-out generator narrate progress through it.
#[derive(Clone)]
pub struct RunReporter {
    state: Arc<RunState>,
    observer: Arc<dyn RunObserver>,
}

impl RunReporter {
    /// Creates a reporter over the given state and observer.
    #[must_use]
    pub fn new(state: Arc<RunState>, observer: Arc<dyn RunObserver>) -> Self {
        Self { state, observer }
    }

    /// Appends a timestamped line to the run log and notifies the observer.
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        let line = format!("[{}] {}", Utc::now().format("%H:%M:%S"), message);
        tracing::info!(target: "deckflow::run", "{message}");
        self.state.push_log(line.clone());
        self.observer.on_log(&line);
    }

    /// Transitions a step to a non-error status.
    pub fn step(&self, id: StepId, status: StepStatus) {
        self.state.set_step(id, status, None);
        self.observer.on_step(id, status, None);
    }

    /// Transitions a step to error, carrying the failure message verbatim.
    pub fn step_error(&self, id: StepId, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: "deckflow::run", step = %id, error = %message, "step failed");
        self.state.set_step(id, StepStatus::Error, Some(message.clone()));
        self.observer.on_step(id, StepStatus::Error, Some(&message));
    }

    /// Updates slide fan-out progress.
    pub fn slide_progress(&self, completed: usize, total: usize) {
        let progress = SlideProgress { completed, total };
        self.state.set_slide_progress(progress);
        self.observer.on_slide_progress(progress);
    }

    /// The state this reporter writes to.
    #[must_use]
    pub fn state(&self) -> &Arc<RunState> {
        &self.state
    }
}

impl std::fmt::Debug for RunReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunReporter").finish_non_exhaustive()
    }
}
