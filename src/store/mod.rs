//! Persistence collaborator: the record store holding presentations and
//! slides.
//!
//! Calls are atomic individually but never transactional across calls; the
//! orchestrator retries each write independently and tolerates partial
//! completion (a presentation row without its slide rows is reachable and
//! is left in place).

use crate::artifact::{NewPresentation, NewSlide, Presentation, PresentationPatch, SlideRow};
use crate::errors::PipelineError;
use async_trait::async_trait;

mod postgrest;

pub use postgrest::PostgrestStore;

/// Record-store operations the pipeline consumes.
///
/// All failures surface as [`PipelineError::Persistence`].
#[async_trait]
pub trait PresentationStore: Send + Sync {
    /// Creates one presentation row and returns it with its assigned id.
    async fn create_presentation(
        &self,
        new: NewPresentation,
    ) -> Result<Presentation, PipelineError>;

    /// Batch-creates slide rows and returns them with assigned ids.
    async fn insert_slides(&self, rows: Vec<NewSlide>) -> Result<Vec<SlideRow>, PipelineError>;

    /// Applies a partial update to one presentation row.
    async fn update_presentation(
        &self,
        id: &str,
        patch: PresentationPatch,
    ) -> Result<(), PipelineError>;

    /// Reads one presentation by id.
    async fn get_presentation(&self, id: &str) -> Result<Option<Presentation>, PipelineError>;

    /// Reads a presentation's slides, ordered by slide number.
    async fn get_slides(&self, presentation_id: &str) -> Result<Vec<SlideRow>, PipelineError>;
}
