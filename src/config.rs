//! Pipeline configuration: endpoints and per-step retry/timeout policies.

use crate::invoke::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Names of the remote edge functions the pipeline invokes.
pub mod functions {
    /// Transcript analysis.
    pub const ANALYZE_TRANSCRIPT: &str = "analyze-transcript";
    /// Outline generation.
    pub const CREATE_OUTLINE: &str = "create-outline";
    /// Per-slide image synthesis.
    pub const GENERATE_SINGLE_SLIDE: &str = "generate-single-slide";
    /// PDF assembly.
    pub const CREATE_PDF: &str = "create-pdf";
    /// File-to-text extraction for the upload path.
    pub const PARSE_DOCUMENT: &str = "parse-document";
}

/// Timeout and retry budget for one remote operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepPolicy {
    /// Hard wall-clock deadline per attempt.
    pub timeout: Duration,
    /// Attempt budget and backoff shape.
    pub retry: RetryPolicy,
}

impl StepPolicy {
    /// Creates a policy with the given timeout and the default retry budget.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Configuration for a presentation pipeline.
///
/// Defaults match the shipped product: 90s/3 attempts for the AI calls,
/// 120s/3 for PDF assembly, 3 attempts for each persistence write, and a
/// 5 second pacing delay between slides in the image fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base URL of the backend (edge functions and record store).
    pub base_url: String,
    /// API key sent as bearer auth on every call.
    pub api_key: String,
    /// Policy for the transcript-analysis call.
    pub analyze: StepPolicy,
    /// Policy for the outline-generation call.
    pub outline: StepPolicy,
    /// Policy for each per-slide image call.
    pub slide: StepPolicy,
    /// Policy for the PDF-assembly call.
    pub pdf: StepPolicy,
    /// Retry budget for each persistence write.
    pub persist: RetryPolicy,
    /// Fixed delay between consecutive slides in the image fan-out.
    pub slide_pacing: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            analyze: StepPolicy::new(Duration::from_secs(90)),
            outline: StepPolicy::new(Duration::from_secs(90)),
            slide: StepPolicy::new(Duration::from_secs(90)),
            pdf: StepPolicy::new(Duration::from_secs(120)),
            persist: RetryPolicy::default(),
            slide_pacing: Duration::from_secs(5),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration for the given backend.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Sets the pacing delay between slides.
    #[must_use]
    pub fn with_slide_pacing(mut self, pacing: Duration) -> Self {
        self.slide_pacing = pacing;
        self
    }

    /// Sets the persistence retry budget.
    #[must_use]
    pub fn with_persist_retry(mut self, retry: RetryPolicy) -> Self {
        self.persist = retry;
        self
    }
}
