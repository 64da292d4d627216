//! Run state: step statuses, append-only log, and slide progress.

mod state;
mod status;

pub use state::{RunReporter, RunState, SlideProgress};
pub use status::{StepId, StepState, StepStatus};
