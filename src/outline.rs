//! Wire types for the remote AI operations.
//!
//! Field names follow the edge functions' JSON contract (camelCase).

use serde::{Deserialize, Serialize};

/// The structured outline produced by the outline-generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Presentation title.
    pub title: String,
    /// Ordered slide descriptors, 1-based contiguous numbering.
    pub slides: Vec<SlideOutline>,
}

/// One slide descriptor within an [`Outline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideOutline {
    /// 1-based position within the deck.
    pub slide_number: u32,
    /// Slide title.
    pub title: String,
    /// Main content (bullets or paragraph).
    pub content: String,
    /// Prompt text driving image generation for this slide.
    pub description: String,
}

/// Request body for `analyze-transcript`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// System prompt for the analysis model.
    pub system_prompt: String,
    /// User prompt for the analysis model.
    pub user_prompt: String,
    /// The raw meeting transcript.
    pub transcript: String,
}

/// Success response from `analyze-transcript`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    /// Opaque analysis text carried into the outline step.
    pub analysis: String,
}

/// Request body for `create-outline`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineRequest {
    /// Analysis text from the previous step.
    pub analysis: String,
    /// Shared visual style directive.
    pub style_prompt: String,
}

/// Success response from `create-outline`.
#[derive(Debug, Clone, Deserialize)]
pub struct OutlineResponse {
    /// The decoded outline.
    pub outline: Outline,
}

/// Request body for `generate-single-slide`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideImageRequest {
    /// Owning presentation id.
    pub presentation_id: String,
    /// 1-based slide number.
    pub slide_number: u32,
    /// Slide title.
    pub title: String,
    /// Slide content.
    pub content: String,
    /// Image-generation description.
    pub description: String,
    /// Shared visual style directive.
    pub style_prompt: String,
}

/// Success response from `generate-single-slide`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideImageResponse {
    /// URL of the generated image.
    pub image_url: String,
}

/// Request body for `create-pdf`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfRequest {
    /// Presentation to assemble.
    pub presentation_id: String,
    /// Optional subset of slide numbers; `None` renders all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_slides: Option<Vec<u32>>,
}

/// Success response from `create-pdf`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfResponse {
    /// URL of the assembled PDF.
    pub pdf_url: String,
}

/// Success response from `parse-document`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedDocument {
    /// Extracted plain text.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn outline_decodes_from_wire_shape() {
        let raw = serde_json::json!({
            "title": "Q4 Review",
            "slides": [
                {
                    "slideNumber": 1,
                    "title": "Results",
                    "content": "Revenue up 25%",
                    "description": "A slide with a graph"
                }
            ]
        });
        let outline: Outline = serde_json::from_value(raw).unwrap();
        assert_eq!(outline.title, "Q4 Review");
        assert_eq!(outline.slides.len(), 1);
        assert_eq!(outline.slides[0].slide_number, 1);
    }

    #[test]
    fn pdf_request_omits_empty_selection() {
        let body = serde_json::to_value(PdfRequest {
            presentation_id: "p1".to_string(),
            selected_slides: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"presentationId": "p1"}));
    }

    #[test]
    fn slide_request_serializes_camel_case() {
        let body = serde_json::to_value(SlideImageRequest {
            presentation_id: "p1".to_string(),
            slide_number: 3,
            title: "t".to_string(),
            content: "c".to_string(),
            description: "d".to_string(),
            style_prompt: "s".to_string(),
        })
        .unwrap();
        assert_eq!(body["presentationId"], "p1");
        assert_eq!(body["slideNumber"], 3);
        assert_eq!(body["stylePrompt"], "s");
    }
}
