//! Error taxonomy for the deckflow pipeline.
//!
//! Every failure the orchestrator can observe maps onto one of these
//! variants. Retryable classes (timeout, transport, application-level,
//! persistence) are wrapped into [`PipelineError::Exhausted`] once a retry
//! budget runs out; the remaining variants are terminal on first occurrence.
//!
//! Display strings are the user-facing run-log messages the product ships
//! with, so they are kept verbatim (Spanish) and asserted in tests.

use thiserror::Error;

/// The error type for all pipeline operations.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// A remote call exceeded its configured wall-clock deadline.
    #[error("Timeout: La operación tardó más de {seconds} segundos")]
    Timeout {
        /// The configured deadline, in seconds.
        seconds: u64,
    },

    /// A network or HTTP-level failure (connection refused, DNS, non-2xx).
    #[error("{message}")]
    Transport {
        /// `HTTP {status}: {body}` for non-2xx responses, or the transport
        /// error message otherwise.
        message: String,
    },

    /// The endpoint responded 2xx but the body carried an `error` field.
    #[error("{message}")]
    Application {
        /// The server-supplied error message.
        message: String,
    },

    /// A create/update against the record store failed.
    #[error("{message}")]
    Persistence {
        /// The store-supplied error message.
        message: String,
    },

    /// All attempts for one operation were consumed.
    #[error("{}", exhausted_message(*attempts, last))]
    Exhausted {
        /// The number of attempts made.
        attempts: u32,
        /// The last underlying failure.
        last: Box<PipelineError>,
    },

    /// The image fan-out produced zero successful slides.
    #[error("No se pudo generar ninguna imagen")]
    NoImagesGenerated,

    /// A render retry was requested with no previously persisted artifact.
    #[error("No hay presentación para reintentar")]
    MissingPresentation,

    /// A 2xx response body could not be decoded into the expected shape.
    #[error("Respuesta inválida del servicio: {message}")]
    InvalidResponse {
        /// The decode error.
        message: String,
    },
}

impl PipelineError {
    /// Creates a transport error for a non-2xx HTTP response.
    #[must_use]
    pub fn http(status: u16, body: impl AsRef<str>) -> Self {
        Self::Transport {
            message: format!("HTTP {}: {}", status, body.as_ref()),
        }
    }

    /// Creates a transport error for a connection-level failure.
    #[must_use]
    pub fn connection(message: impl std::fmt::Display) -> Self {
        Self::Transport {
            message: format!("Error de conexión: {message}"),
        }
    }

    /// Returns true if another attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Transport { .. }
                | Self::Application { .. }
                | Self::Persistence { .. }
        )
    }

    /// Prefix used in the retry narration line before a backoff sleep.
    #[must_use]
    pub fn narration_prefix(&self) -> &'static str {
        match self {
            Self::Application { .. } => "Error servidor",
            Self::Persistence { .. } => "Error en BD",
            _ => "Error",
        }
    }
}

fn exhausted_message(attempts: u32, last: &PipelineError) -> String {
    match last {
        PipelineError::Application { message } => {
            format!("Error servidor después de {attempts} intentos: {message}")
        }
        other => format!("Error después de {attempts} intentos: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_carries_configured_seconds() {
        let err = PipelineError::Timeout { seconds: 90 };
        assert_eq!(
            err.to_string(),
            "Timeout: La operación tardó más de 90 segundos"
        );
    }

    #[test]
    fn http_constructor_formats_status_and_body() {
        let err = PipelineError::http(429, "Too Many Requests");
        assert_eq!(err.to_string(), "HTTP 429: Too Many Requests");
    }

    #[test]
    fn exhausted_display_states_attempt_count() {
        let err = PipelineError::Exhausted {
            attempts: 3,
            last: Box::new(PipelineError::http(500, "boom")),
        };
        assert_eq!(err.to_string(), "Error después de 3 intentos: HTTP 500: boom");
    }

    #[test]
    fn exhausted_display_distinguishes_server_errors() {
        let err = PipelineError::Exhausted {
            attempts: 3,
            last: Box::new(PipelineError::Application {
                message: "rate limited".to_string(),
            }),
        };
        assert_eq!(
            err.to_string(),
            "Error servidor después de 3 intentos: rate limited"
        );
    }

    #[test]
    fn retryable_classification() {
        assert!(PipelineError::Timeout { seconds: 1 }.is_retryable());
        assert!(PipelineError::http(500, "x").is_retryable());
        assert!(PipelineError::Application { message: "x".into() }.is_retryable());
        assert!(PipelineError::Persistence { message: "x".into() }.is_retryable());
        assert!(!PipelineError::NoImagesGenerated.is_retryable());
        assert!(!PipelineError::MissingPresentation.is_retryable());
    }

    #[test]
    fn narration_prefixes() {
        assert_eq!(
            PipelineError::Application { message: "x".into() }.narration_prefix(),
            "Error servidor"
        );
        assert_eq!(
            PipelineError::Persistence { message: "x".into() }.narration_prefix(),
            "Error en BD"
        );
        assert_eq!(PipelineError::http(500, "x").narration_prefix(), "Error");
    }
}
