//! Pipeline orchestration.
//!
//! This module provides:
//! - The five-step orchestrator ([`PresentationPipeline`])
//! - The sequential slide fan-out generator ([`SlideGenerator`])

mod fanout;
mod orchestrator;

pub use fanout::SlideGenerator;
pub use orchestrator::{CreatePresentationInput, PresentationPipeline};
