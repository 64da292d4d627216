//! Step identifiers and statuses for one pipeline run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five sequential pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    /// Transcript analysis.
    Understand,
    /// Outline generation.
    Outline,
    /// Artifact + slide rows write.
    Persist,
    /// Per-slide image fan-out.
    Images,
    /// PDF assembly.
    Render,
}

impl StepId {
    /// All steps in execution order.
    pub const ALL: [StepId; 5] = [
        Self::Understand,
        Self::Outline,
        Self::Persist,
        Self::Images,
        Self::Render,
    ];

    /// Short user-facing label shown next to the step.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Understand => "Analizando contenido",
            Self::Outline => "Creando outline",
            Self::Persist => "Guardando estructura",
            Self::Images => "Generando imágenes",
            Self::Render => "Compilando PDF",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Understand => write!(f, "understand"),
            Self::Outline => write!(f, "outline"),
            Self::Persist => write!(f, "persist"),
            Self::Images => write!(f, "images"),
            Self::Render => write!(f, "render"),
        }
    }
}

/// The execution status of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not yet reached.
    #[default]
    Pending,
    /// Currently executing. At most one step is in this state.
    Processing,
    /// Finished successfully.
    Completed,
    /// Failed terminally (for this automatic run).
    Error,
}

impl StepStatus {
    /// Returns true if the step has finished, successfully or not.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Mutable status of one step within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepState {
    /// Which step this is.
    pub id: StepId,
    /// Current status.
    pub status: StepStatus,
    /// Present only when `status == Error`.
    pub error_message: Option<String>,
}

impl StepState {
    /// Creates a pending step.
    #[must_use]
    pub fn pending(id: StepId) -> Self {
        Self {
            id,
            status: StepStatus::Pending,
            error_message: None,
        }
    }
}
