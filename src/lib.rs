//! # Deckflow
//!
//! An orchestration engine that turns a meeting transcript into a
//! downloadable slide-deck PDF through a five-step workflow over
//! unreliable remote services:
//!
//! - **Bounded remote calls**: every AI call has a hard per-attempt deadline
//! - **Linear-backoff retries**: bounded attempts with 5s, 10s, 15s... delays
//! - **Partial-failure tolerance**: the slide fan-out skips exhausted slides
//! - **Resumable rendering**: a failed PDF step can be retried on its own
//! - **Observable runs**: step statuses, a narrated log, and slide progress
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use deckflow::prelude::*;
//! use std::sync::Arc;
//!
//! let config = PipelineConfig::new("https://backend.example", "api-key");
//! let invoker = Arc::new(HttpEdgeClient::from_config(&config));
//! let store = Arc::new(PostgrestStore::from_config(&config));
//! let pipeline = PresentationPipeline::new(invoker, store, config);
//!
//! pipeline
//!     .create_presentation(CreatePresentationInput {
//!         system_prompt: system_prompt.into(),
//!         user_prompt: user_prompt.into(),
//!         style_prompt: style_prompt.into(),
//!         transcript: transcript.into(),
//!     })
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod artifact;
pub mod config;
pub mod errors;
pub mod invoke;
pub mod observer;
pub mod outline;
pub mod pipeline;
pub mod run;
pub mod store;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::artifact::{
        NewPresentation, NewSlide, Presentation, PresentationPatch, PresentationStatus, SlideRow,
    };
    pub use crate::config::{PipelineConfig, StepPolicy};
    pub use crate::errors::PipelineError;
    pub use crate::invoke::{EdgeInvoker, HttpEdgeClient, RetryPolicy};
    pub use crate::observer::{CollectingObserver, NoOpObserver, RunObserver};
    pub use crate::outline::{Outline, SlideOutline};
    pub use crate::pipeline::{CreatePresentationInput, PresentationPipeline, SlideGenerator};
    pub use crate::run::{RunState, SlideProgress, StepId, StepState, StepStatus};
    pub use crate::store::{PostgrestStore, PresentationStore};
}
