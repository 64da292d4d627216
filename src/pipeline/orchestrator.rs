//! The orchestrator: drives the five pipeline steps end to end.

use crate::artifact::{NewPresentation, NewSlide, PresentationPatch, PresentationStatus};
use crate::config::{functions, PipelineConfig};
use crate::errors::PipelineError;
use crate::invoke::{invoke_with_retry, retry_with_backoff, EdgeInvoker};
use crate::observer::{NoOpObserver, RunObserver};
use crate::outline::{
    AnalyzeRequest, AnalyzeResponse, Outline, OutlineRequest, OutlineResponse, PdfRequest,
    PdfResponse,
};
use crate::pipeline::fanout::SlideGenerator;
use crate::run::{RunReporter, RunState, StepId, StepStatus};
use crate::store::PresentationStore;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Caller-supplied inputs for one run.
#[derive(Debug, Clone)]
pub struct CreatePresentationInput {
    /// System prompt for the analysis model.
    pub system_prompt: String,
    /// User prompt for the analysis model.
    pub user_prompt: String,
    /// Shared visual style directive.
    pub style_prompt: String,
    /// The meeting transcript.
    pub transcript: String,
}

/// Sequences the transcript-to-PDF pipeline and owns its run state.
///
/// One instance drives one run at a time; the whole run executes on a
/// single logical task with no intra-run concurrency. State is exposed
/// read-only through [`RunState`] and change notifications go to the
/// configured [`RunObserver`].
pub struct PresentationPipeline {
    invoker: Arc<dyn EdgeInvoker>,
    store: Arc<dyn PresentationStore>,
    config: PipelineConfig,
    state: Arc<RunState>,
    reporter: RunReporter,
}

impl PresentationPipeline {
    /// Creates a pipeline with no observer.
    #[must_use]
    pub fn new(
        invoker: Arc<dyn EdgeInvoker>,
        store: Arc<dyn PresentationStore>,
        config: PipelineConfig,
    ) -> Self {
        Self::with_observer(invoker, store, config, Arc::new(NoOpObserver))
    }

    /// Creates a pipeline that notifies `observer` on every state change.
    #[must_use]
    pub fn with_observer(
        invoker: Arc<dyn EdgeInvoker>,
        store: Arc<dyn PresentationStore>,
        config: PipelineConfig,
        observer: Arc<dyn RunObserver>,
    ) -> Self {
        let state = Arc::new(RunState::new());
        let reporter = RunReporter::new(Arc::clone(&state), observer);
        Self {
            invoker,
            store,
            config,
            state,
            reporter,
        }
    }

    /// Read-only handle to the run's state.
    #[must_use]
    pub fn state(&self) -> Arc<RunState> {
        Arc::clone(&self.state)
    }

    /// True iff all five steps completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// True iff a render-only retry is currently allowed.
    #[must_use]
    pub fn can_retry_pdf(&self) -> bool {
        self.state.can_retry_pdf()
    }

    /// Drives the five steps to completion or first fatal error.
    ///
    /// On a fatal error the currently processing step is marked `Error`
    /// with the cause verbatim, later steps stay `Pending`, and nothing
    /// already persisted is rolled back.
    pub async fn create_presentation(
        &self,
        input: CreatePresentationInput,
    ) -> Result<(), PipelineError> {
        self.state.set_processing(true);
        self.state.reset();
        self.reporter
            .log("Iniciando proceso de creación de presentación...");

        let result = self.run_steps(&input).await;

        if let Err(err) = &result {
            self.reporter.log(format!("ERROR: {err}"));
            if let Some(step) = self.state.processing_step() {
                self.reporter.step_error(step, err.to_string());
            }
        }
        self.state.set_processing(false);
        result
    }

    /// Re-runs only the render step against the last persisted artifact.
    ///
    /// Requires a previously stored presentation id; calling without one is
    /// a user error reported without touching run state. Repeated calls
    /// after success only update the same presentation row.
    pub async fn retry_pdf_only(&self) -> Result<(), PipelineError> {
        let Some(presentation_id) = self.state.last_presentation_id() else {
            return Err(PipelineError::MissingPresentation);
        };

        self.state.set_processing(true);
        self.reporter.step(StepId::Render, StepStatus::Processing);
        self.reporter.log("Reintentando generación de PDF...");

        let result = self.render_pdf(&presentation_id).await;
        match &result {
            Ok(url) => {
                self.reporter.step(StepId::Render, StepStatus::Completed);
                self.reporter.log("¡PDF generado exitosamente!");
                self.reporter.log(format!("PDF disponible en: {url}"));
            }
            Err(err) => {
                self.reporter.log(format!("ERROR: {err}"));
                self.reporter.step_error(StepId::Render, err.to_string());
            }
        }
        self.state.set_processing(false);
        result.map(|_| ())
    }

    async fn run_steps(&self, input: &CreatePresentationInput) -> Result<(), PipelineError> {
        let analysis = self.step_understand(input).await?;
        let outline = self.step_outline(&analysis, &input.style_prompt).await?;
        let presentation_id = self.step_persist(input, &outline).await?;
        self.step_images(&presentation_id, &outline, &input.style_prompt)
            .await?;
        self.step_render(&presentation_id).await
    }

    async fn step_understand(
        &self,
        input: &CreatePresentationInput,
    ) -> Result<String, PipelineError> {
        self.reporter
            .step(StepId::Understand, StepStatus::Processing);
        self.reporter.log("Paso 1: Analizando transcript...");

        let body = encode(AnalyzeRequest {
            system_prompt: input.system_prompt.clone(),
            user_prompt: input.user_prompt.clone(),
            transcript: input.transcript.clone(),
        })?;
        let value = invoke_with_retry(
            self.invoker.as_ref(),
            functions::ANALYZE_TRANSCRIPT,
            &body,
            &self.config.analyze,
            "Analizando transcript",
            &self.reporter,
        )
        .await?;
        let response: AnalyzeResponse = decode(value)?;

        self.reporter.log("Análisis completado exitosamente");
        self.reporter.log(format!(
            "Longitud del análisis: {} caracteres",
            response.analysis.len()
        ));
        self.reporter.step(StepId::Understand, StepStatus::Completed);
        Ok(response.analysis)
    }

    async fn step_outline(
        &self,
        analysis: &str,
        style_prompt: &str,
    ) -> Result<Outline, PipelineError> {
        self.reporter.step(StepId::Outline, StepStatus::Processing);
        self.reporter
            .log("Paso 2: Creando outline de presentación...");

        let body = encode(OutlineRequest {
            analysis: analysis.to_string(),
            style_prompt: style_prompt.to_string(),
        })?;
        let value = invoke_with_retry(
            self.invoker.as_ref(),
            functions::CREATE_OUTLINE,
            &body,
            &self.config.outline,
            "Creando outline",
            &self.reporter,
        )
        .await?;
        // Lenient recovery of malformed outlines belongs to the service
        // side; a body that does not decode is terminal here.
        let response: OutlineResponse = decode(value)?;

        self.reporter.log(format!(
            "Outline creado con {} diapositivas",
            response.outline.slides.len()
        ));
        self.reporter.step(StepId::Outline, StepStatus::Completed);
        Ok(response.outline)
    }

    async fn step_persist(
        &self,
        input: &CreatePresentationInput,
        outline: &Outline,
    ) -> Result<String, PipelineError> {
        self.reporter.step(StepId::Persist, StepStatus::Processing);
        self.reporter.log("Paso 3: Guardando en base de datos...");

        let max = self.config.persist.max_attempts;
        let new_presentation = NewPresentation {
            system_prompt: input.system_prompt.clone(),
            user_prompt: input.user_prompt.clone(),
            style_prompt: input.style_prompt.clone(),
            transcript: input.transcript.clone(),
            outline: outline.clone(),
            status: PresentationStatus::Processing,
        };
        let presentation = retry_with_backoff(
            &self.config.persist,
            &self.reporter,
            |attempt| format!("Guardando presentación (intento {attempt}/{max})..."),
            || self.store.create_presentation(new_presentation.clone()),
        )
        .await?;

        self.reporter
            .log(format!("Presentación guardada con ID: {}", presentation.id));
        self.state.set_last_presentation_id(presentation.id.clone());

        // Second phase: slide rows, retried independently. A failure here
        // leaves the presentation row in place.
        let rows: Vec<NewSlide> = outline
            .slides
            .iter()
            .enumerate()
            .map(|(index, slide)| NewSlide {
                presentation_id: presentation.id.clone(),
                slide_number: index as u32 + 1,
                description: slide.description.clone(),
            })
            .collect();
        let slides = retry_with_backoff(
            &self.config.persist,
            &self.reporter,
            |attempt| format!("Guardando slides (intento {attempt}/{max})..."),
            || self.store.insert_slides(rows.clone()),
        )
        .await?;

        self.reporter
            .log(format!("{} diapositivas guardadas en BD", slides.len()));
        self.reporter.step(StepId::Persist, StepStatus::Completed);
        Ok(presentation.id)
    }

    async fn step_images(
        &self,
        presentation_id: &str,
        outline: &Outline,
        style_prompt: &str,
    ) -> Result<(), PipelineError> {
        self.reporter.step(StepId::Images, StepStatus::Processing);
        self.reporter.log("Paso 4: Generando imágenes...");

        let generator = SlideGenerator::new(self.invoker.as_ref(), &self.config, &self.reporter);
        generator
            .generate_all(presentation_id, &outline.slides, style_prompt)
            .await?;

        self.reporter.step(StepId::Images, StepStatus::Completed);
        Ok(())
    }

    async fn step_render(&self, presentation_id: &str) -> Result<(), PipelineError> {
        self.reporter.step(StepId::Render, StepStatus::Processing);
        self.reporter.log("Paso 5: Compilando PDF...");

        let url = self.render_pdf(presentation_id).await?;

        self.reporter.step(StepId::Render, StepStatus::Completed);
        self.reporter.log("¡Proceso completado exitosamente!");
        self.reporter.log(format!("PDF disponible en: {url}"));
        Ok(())
    }

    /// Shared render logic for the initial run and the render-only retry.
    async fn render_pdf(&self, presentation_id: &str) -> Result<String, PipelineError> {
        let body = encode(PdfRequest {
            presentation_id: presentation_id.to_string(),
            selected_slides: None,
        })?;
        let value = invoke_with_retry(
            self.invoker.as_ref(),
            functions::CREATE_PDF,
            &body,
            &self.config.pdf,
            "Generando PDF",
            &self.reporter,
        )
        .await?;
        let response: PdfResponse = decode(value)?;

        // Direct, un-retried write-back: a failure is logged but does not
        // revert the step.
        let patch = PresentationPatch {
            pdf_url: Some(response.pdf_url.clone()),
            status: Some(PresentationStatus::Completed),
        };
        if let Err(err) = self.store.update_presentation(presentation_id, patch).await {
            tracing::warn!(
                target: "deckflow::pipeline",
                presentation_id,
                error = %err,
                "pdf write-back failed"
            );
            self.reporter
                .log(format!("Aviso: no se pudo actualizar la presentación: {err}"));
        }

        self.state.set_pdf_url(response.pdf_url.clone());
        Ok(response.pdf_url)
    }
}

fn encode(request: impl serde::Serialize) -> Result<serde_json::Value, PipelineError> {
    serde_json::to_value(request).map_err(|err| PipelineError::InvalidResponse {
        message: err.to_string(),
    })
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, PipelineError> {
    serde_json::from_value(value).map_err(|err| PipelineError::InvalidResponse {
        message: err.to_string(),
    })
}
