//! Durable records: the persisted presentation (Artifact) and its slides.
//!
//! Field names follow the record store's snake_case row shape.

use crate::outline::Outline;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse persisted state of a presentation, mirroring run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationStatus {
    /// Created by an editor flow, not yet run.
    Draft,
    /// A run is in flight (or ended before completion).
    Processing,
    /// A PDF was rendered and written back.
    Completed,
    /// The owning run failed.
    Error,
}

impl fmt::Display for PresentationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The durable record of one generated deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    /// Store-assigned identifier.
    pub id: String,
    /// System prompt used for analysis.
    pub system_prompt: String,
    /// User prompt used for analysis.
    pub user_prompt: String,
    /// Shared visual style directive.
    pub style_prompt: String,
    /// The submitted transcript.
    pub transcript: String,
    /// The persisted outline; its slide count is fixed once persisted.
    pub outline: Outline,
    /// Coarse run state tag.
    pub status: PresentationStatus,
    /// Set once PDF assembly succeeds.
    #[serde(default)]
    pub pdf_url: Option<String>,
}

/// Fields for creating a presentation row.
#[derive(Debug, Clone, Serialize)]
pub struct NewPresentation {
    /// System prompt used for analysis.
    pub system_prompt: String,
    /// User prompt used for analysis.
    pub user_prompt: String,
    /// Shared visual style directive.
    pub style_prompt: String,
    /// The submitted transcript.
    pub transcript: String,
    /// The outline to persist.
    pub outline: Outline,
    /// Initial status tag.
    pub status: PresentationStatus,
}

/// Partial update applied to a presentation row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PresentationPatch {
    /// New PDF URL, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    /// New status tag, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PresentationStatus>,
}

/// One persisted slide belonging to a presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideRow {
    /// Store-assigned identifier.
    pub id: String,
    /// Owning presentation id.
    pub presentation_id: String,
    /// 1-based, contiguous and unique within a presentation.
    pub slide_number: u32,
    /// Image-generation description.
    pub description: String,
    /// Null until an image is successfully generated.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Fields for creating a slide row.
#[derive(Debug, Clone, Serialize)]
pub struct NewSlide {
    /// Owning presentation id.
    pub presentation_id: String,
    /// 1-based slide number.
    pub slide_number: u32,
    /// Image-generation description.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&PresentationStatus::Processing).unwrap();
        assert_eq!(json, r#""processing""#);
        assert_eq!(PresentationStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn patch_skips_unset_fields() {
        let patch = PresentationPatch {
            pdf_url: Some("https://cdn/deck.pdf".to_string()),
            status: None,
        };
        let body = serde_json::to_value(patch).unwrap();
        assert_eq!(body, serde_json::json!({"pdf_url": "https://cdn/deck.pdf"}));
    }

    #[test]
    fn slide_row_decodes_null_image() {
        let raw = serde_json::json!({
            "id": "s1",
            "presentation_id": "p1",
            "slide_number": 2,
            "description": "desc",
            "image_url": null
        });
        let row: SlideRow = serde_json::from_value(raw).unwrap();
        assert_eq!(row.slide_number, 2);
        assert!(row.image_url.is_none());
    }
}
