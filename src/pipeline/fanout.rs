//! Sequential slide fan-out for the images step.
//!
//! Slides are processed strictly one at a time in slide-number order with a
//! fixed pacing sleep between them. This is a deliberate rate-limit choice
//! against the image provider, not an accidental limitation; do not
//! parallelize it.

use crate::config::{functions, PipelineConfig};
use crate::errors::PipelineError;
use crate::invoke::{invoke_with_retry, EdgeInvoker};
use crate::outline::{SlideImageRequest, SlideOutline};
use crate::run::{RunReporter, SlideProgress};

/// Drives image generation across a batch of slides, tolerating
/// individual failures.
pub struct SlideGenerator<'a> {
    invoker: &'a dyn EdgeInvoker,
    config: &'a PipelineConfig,
    reporter: &'a RunReporter,
}

impl<'a> SlideGenerator<'a> {
    /// Creates a generator bound to one run.
    #[must_use]
    pub fn new(
        invoker: &'a dyn EdgeInvoker,
        config: &'a PipelineConfig,
        reporter: &'a RunReporter,
    ) -> Self {
        Self {
            invoker,
            config,
            reporter,
        }
    }

    /// Generates an image for each slide, continuing past individual
    /// exhaustions.
    ///
    /// `total` is fixed up front and `completed` counts successes only;
    /// progress is updated after every slide's outcome regardless of it.
    /// Returns [`PipelineError::NoImagesGenerated`] iff zero slides succeed.
    pub async fn generate_all(
        &self,
        presentation_id: &str,
        slides: &[SlideOutline],
        style_prompt: &str,
    ) -> Result<SlideProgress, PipelineError> {
        let total = slides.len();
        let max_attempts = self.config.slide.retry.max_attempts;
        self.reporter.slide_progress(0, total);
        self.reporter
            .log(format!("Generando {total} diapositivas..."));

        let mut completed = 0usize;

        for (index, slide) in slides.iter().enumerate() {
            let slide_number = index as u32 + 1;

            if index > 0 {
                self.reporter.log(format!(
                    "Esperando {}s antes de siguiente slide...",
                    self.config.slide_pacing.as_secs()
                ));
                tokio::time::sleep(self.config.slide_pacing).await;
            }

            let body = serde_json::to_value(SlideImageRequest {
                presentation_id: presentation_id.to_string(),
                slide_number,
                title: slide.title.clone(),
                content: slide.content.clone(),
                description: slide.description.clone(),
                style_prompt: style_prompt.to_string(),
            })
            .map_err(|err| PipelineError::InvalidResponse {
                message: err.to_string(),
            })?;

            let label = format!("Generando slide {slide_number}/{total}");
            let outcome = invoke_with_retry(
                self.invoker,
                functions::GENERATE_SINGLE_SLIDE,
                &body,
                &self.config.slide,
                &label,
                self.reporter,
            )
            .await;

            match outcome {
                Ok(_) => {
                    completed += 1;
                    self.reporter.slide_progress(completed, total);
                    self.reporter.log(format!(
                        "✓ Slide {slide_number} completada ({completed}/{total})"
                    ));
                }
                Err(err) => {
                    tracing::warn!(
                        target: "deckflow::fanout",
                        slide = slide_number,
                        error = %err,
                        "slide generation exhausted"
                    );
                    self.reporter.log(format!(
                        "✗ Slide {slide_number} falló después de {max_attempts} intentos"
                    ));
                    self.reporter.slide_progress(completed, total);
                }
            }
        }

        if completed == 0 {
            return Err(PipelineError::NoImagesGenerated);
        }

        self.reporter
            .log(format!("Imágenes generadas: {completed}/{total}"));
        Ok(SlideProgress { completed, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoOpObserver;
    use crate::run::RunState;
    use crate::testing::ScriptedInvoker;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    fn slides(n: u32) -> Vec<SlideOutline> {
        (1..=n)
            .map(|i| SlideOutline {
                slide_number: i,
                title: format!("Slide {i}"),
                content: format!("contenido {i}"),
                description: format!("descripción {i}"),
            })
            .collect()
    }

    fn reporter() -> RunReporter {
        RunReporter::new(Arc::new(RunState::new()), Arc::new(NoOpObserver))
    }

    #[tokio::test(start_paused = true)]
    async fn paces_slides_and_counts_successes_only() {
        let invoker = ScriptedInvoker::new();
        invoker.enqueue_ok(functions::GENERATE_SINGLE_SLIDE, json!({"imageUrl": "u1"}));
        // Slide 2 exhausts all three attempts.
        for _ in 0..3 {
            invoker.enqueue_err(
                functions::GENERATE_SINGLE_SLIDE,
                PipelineError::http(500, "boom"),
            );
        }
        invoker.enqueue_ok(functions::GENERATE_SINGLE_SLIDE, json!({"imageUrl": "u3"}));

        let config = PipelineConfig::default();
        let reporter = reporter();
        let generator = SlideGenerator::new(&invoker, &config, &reporter);
        let progress = generator.generate_all("p1", &slides(3), "estilo").await.unwrap();

        assert_eq!(progress, SlideProgress { completed: 2, total: 3 });
        // 1 attempt + (1 pacing + 3 attempts) + (1 pacing + 1 attempt).
        assert_eq!(invoker.call_count(functions::GENERATE_SINGLE_SLIDE), 5);
        let log = reporter.state().log();
        assert!(log.iter().any(|l| l.contains("✓ Slide 1 completada (1/3)")));
        assert!(log
            .iter()
            .any(|l| l.contains("✗ Slide 2 falló después de 3 intentos")));
        assert!(log.iter().any(|l| l.contains("Imágenes generadas: 2/3")));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_successes_is_fatal() {
        let invoker = ScriptedInvoker::new();
        for _ in 0..6 {
            invoker.enqueue_err(
                functions::GENERATE_SINGLE_SLIDE,
                PipelineError::http(500, "boom"),
            );
        }
        let config = PipelineConfig::default();
        let reporter = reporter();
        let generator = SlideGenerator::new(&invoker, &config, &reporter);

        let err = generator
            .generate_all("p1", &slides(2), "estilo")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No se pudo generar ninguna imagen");
        assert_eq!(reporter.state().slide_progress().completed, 0);
        assert_eq!(reporter.state().slide_progress().total, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_sleep_runs_between_slides_only() {
        let invoker = ScriptedInvoker::new();
        for _ in 0..3 {
            invoker.enqueue_ok(functions::GENERATE_SINGLE_SLIDE, json!({"imageUrl": "u"}));
        }
        let config = PipelineConfig::default();
        let reporter = reporter();
        let generator = SlideGenerator::new(&invoker, &config, &reporter);

        let start = Instant::now();
        generator.generate_all("p1", &slides(3), "estilo").await.unwrap();
        // Two pacing gaps of 5s, no retry backoff.
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn request_carries_slide_fields_and_style() {
        let invoker = ScriptedInvoker::new();
        invoker.enqueue_ok(functions::GENERATE_SINGLE_SLIDE, json!({"imageUrl": "u"}));
        let config = PipelineConfig::default();
        let reporter = reporter();
        let generator = SlideGenerator::new(&invoker, &config, &reporter);

        generator.generate_all("p7", &slides(1), "estilo oscuro").await.unwrap();

        let calls = invoker.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body["presentationId"], "p7");
        assert_eq!(calls[0].body["slideNumber"], 1);
        assert_eq!(calls[0].body["stylePrompt"], "estilo oscuro");
    }
}
