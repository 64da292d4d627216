//! Test doubles: a scripted remote invoker and an in-memory record store.
//!
//! Public (not `cfg(test)`) so downstream consumers can drive the pipeline
//! in their own tests without a live backend.

use crate::artifact::{NewPresentation, NewSlide, Presentation, PresentationPatch, SlideRow};
use crate::errors::PipelineError;
use crate::invoke::EdgeInvoker;
use crate::store::PresentationStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use uuid::Uuid;

/// One call observed by the [`ScriptedInvoker`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The invoked function name.
    pub function: String,
    /// The request body.
    pub body: serde_json::Value,
}

/// An [`EdgeInvoker`] that replays queued responses per function name.
///
/// Responses are consumed FIFO; invoking a function with an empty queue is
/// a test bug and fails loudly with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedInvoker {
    responses: Mutex<HashMap<String, VecDeque<Result<serde_json::Value, PipelineError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedInvoker {
    /// Creates an invoker with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response for `function`.
    pub fn enqueue_ok(&self, function: &str, value: serde_json::Value) {
        self.enqueue(function, Ok(value));
    }

    /// Queues a failure for `function`.
    pub fn enqueue_err(&self, function: &str, err: PipelineError) {
        self.enqueue(function, Err(err));
    }

    /// Queues a raw result for `function`.
    pub fn enqueue(&self, function: &str, result: Result<serde_json::Value, PipelineError>) {
        self.responses
            .lock()
            .entry(function.to_string())
            .or_default()
            .push_back(result);
    }

    /// All calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls made to `function`.
    #[must_use]
    pub fn call_count(&self, function: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.function == function)
            .count()
    }
}

#[async_trait]
impl EdgeInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        function: &str,
        body: &serde_json::Value,
        _timeout: Duration,
    ) -> Result<serde_json::Value, PipelineError> {
        self.calls.lock().push(RecordedCall {
            function: function.to_string(),
            body: body.clone(),
        });
        self.responses
            .lock()
            .get_mut(function)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(PipelineError::Transport {
                    message: format!("sin respuesta programada para {function}"),
                })
            })
    }
}

/// An in-memory [`PresentationStore`] with scriptable failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    presentations: Mutex<Vec<Presentation>>,
    slides: Mutex<Vec<SlideRow>>,
    create_failures: Mutex<VecDeque<PipelineError>>,
    insert_failures: Mutex<VecDeque<PipelineError>>,
    update_failures: Mutex<VecDeque<PipelineError>>,
    update_calls: Mutex<usize>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a failure for the next `create_presentation` call.
    pub fn fail_next_create(&self, err: PipelineError) {
        self.create_failures.lock().push_back(err);
    }

    /// Queues a failure for the next `insert_slides` call.
    pub fn fail_next_insert(&self, err: PipelineError) {
        self.insert_failures.lock().push_back(err);
    }

    /// Queues a failure for the next `update_presentation` call.
    pub fn fail_next_update(&self, err: PipelineError) {
        self.update_failures.lock().push_back(err);
    }

    /// All presentation rows.
    #[must_use]
    pub fn presentations(&self) -> Vec<Presentation> {
        self.presentations.lock().clone()
    }

    /// All slide rows.
    #[must_use]
    pub fn slides(&self) -> Vec<SlideRow> {
        self.slides.lock().clone()
    }

    /// Number of `update_presentation` calls, failed ones included.
    #[must_use]
    pub fn update_count(&self) -> usize {
        *self.update_calls.lock()
    }
}

#[async_trait]
impl PresentationStore for MemoryStore {
    async fn create_presentation(
        &self,
        new: NewPresentation,
    ) -> Result<Presentation, PipelineError> {
        if let Some(err) = self.create_failures.lock().pop_front() {
            return Err(err);
        }
        let row = Presentation {
            id: Uuid::new_v4().to_string(),
            system_prompt: new.system_prompt,
            user_prompt: new.user_prompt,
            style_prompt: new.style_prompt,
            transcript: new.transcript,
            outline: new.outline,
            status: new.status,
            pdf_url: None,
        };
        self.presentations.lock().push(row.clone());
        Ok(row)
    }

    async fn insert_slides(&self, rows: Vec<NewSlide>) -> Result<Vec<SlideRow>, PipelineError> {
        if let Some(err) = self.insert_failures.lock().pop_front() {
            return Err(err);
        }
        let created: Vec<SlideRow> = rows
            .into_iter()
            .map(|new| SlideRow {
                id: Uuid::new_v4().to_string(),
                presentation_id: new.presentation_id,
                slide_number: new.slide_number,
                description: new.description,
                image_url: None,
            })
            .collect();
        self.slides.lock().extend(created.clone());
        Ok(created)
    }

    async fn update_presentation(
        &self,
        id: &str,
        patch: PresentationPatch,
    ) -> Result<(), PipelineError> {
        *self.update_calls.lock() += 1;
        if let Some(err) = self.update_failures.lock().pop_front() {
            return Err(err);
        }
        let mut presentations = self.presentations.lock();
        let Some(row) = presentations.iter_mut().find(|p| p.id == id) else {
            return Err(PipelineError::Persistence {
                message: format!("presentación {id} no encontrada"),
            });
        };
        if let Some(url) = patch.pdf_url {
            row.pdf_url = Some(url);
        }
        if let Some(status) = patch.status {
            row.status = status;
        }
        Ok(())
    }

    async fn get_presentation(&self, id: &str) -> Result<Option<Presentation>, PipelineError> {
        Ok(self
            .presentations
            .lock()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn get_slides(&self, presentation_id: &str) -> Result<Vec<SlideRow>, PipelineError> {
        let mut rows: Vec<SlideRow> = self
            .slides
            .lock()
            .iter()
            .filter(|s| s.presentation_id == presentation_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.slide_number);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::PresentationStatus;
    use crate::outline::Outline;
    use serde_json::json;

    fn new_presentation() -> NewPresentation {
        NewPresentation {
            system_prompt: "sys".to_string(),
            user_prompt: "user".to_string(),
            style_prompt: "style".to_string(),
            transcript: "transcript".to_string(),
            outline: Outline {
                title: "t".to_string(),
                slides: Vec::new(),
            },
            status: PresentationStatus::Processing,
        }
    }

    #[tokio::test]
    async fn scripted_invoker_replays_fifo_and_records_calls() {
        let invoker = ScriptedInvoker::new();
        invoker.enqueue_ok("op", json!({"first": true}));
        invoker.enqueue_err("op", PipelineError::http(500, "boom"));

        let first = invoker
            .invoke("op", &json!({}), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(first["first"], true);
        assert!(invoker
            .invoke("op", &json!({}), Duration::from_secs(1))
            .await
            .is_err());
        assert_eq!(invoker.call_count("op"), 2);
    }

    #[tokio::test]
    async fn scripted_invoker_fails_loudly_when_unscripted() {
        let invoker = ScriptedInvoker::new();
        let err = invoker
            .invoke("missing", &json!({}), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("sin respuesta programada"));
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        let created = store.create_presentation(new_presentation()).await.unwrap();
        assert!(!created.id.is_empty());

        let slides = store
            .insert_slides(vec![NewSlide {
                presentation_id: created.id.clone(),
                slide_number: 1,
                description: "d".to_string(),
            }])
            .await
            .unwrap();
        assert_eq!(slides.len(), 1);

        store
            .update_presentation(
                &created.id,
                PresentationPatch {
                    pdf_url: Some("https://cdn/x.pdf".to_string()),
                    status: Some(PresentationStatus::Completed),
                },
            )
            .await
            .unwrap();

        let read = store.get_presentation(&created.id).await.unwrap().unwrap();
        assert_eq!(read.pdf_url.as_deref(), Some("https://cdn/x.pdf"));
        assert_eq!(read.status, PresentationStatus::Completed);
    }

    #[tokio::test]
    async fn get_slides_filters_by_presentation_and_orders_by_number() {
        let store = MemoryStore::new();
        store
            .insert_slides(vec![
                NewSlide {
                    presentation_id: "p1".to_string(),
                    slide_number: 3,
                    description: "tercera".to_string(),
                },
                NewSlide {
                    presentation_id: "p2".to_string(),
                    slide_number: 1,
                    description: "ajena".to_string(),
                },
                NewSlide {
                    presentation_id: "p1".to_string(),
                    slide_number: 1,
                    description: "primera".to_string(),
                },
                NewSlide {
                    presentation_id: "p1".to_string(),
                    slide_number: 2,
                    description: "segunda".to_string(),
                },
            ])
            .await
            .unwrap();

        let slides = store.get_slides("p1").await.unwrap();
        let numbers: Vec<u32> = slides.iter().map(|s| s.slide_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(slides.iter().all(|s| s.presentation_id == "p1"));
    }

    #[tokio::test]
    async fn memory_store_scripted_failures_are_consumed() {
        let store = MemoryStore::new();
        store.fail_next_create(PipelineError::Persistence {
            message: "down".to_string(),
        });
        assert!(store.create_presentation(new_presentation()).await.is_err());
        assert!(store.create_presentation(new_presentation()).await.is_ok());
    }
}
