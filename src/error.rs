use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a prediction.
///
/// `ModelNotFound`, `ModelLoad` and `UnexpectedModelShape` only come out of
/// model initialization; the rest are per-request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid telemetry: {0}")]
    InvalidTelemetry(String),

    #[error("model artifact not found at {}", path.display())]
    ModelNotFound { path: PathBuf },

    #[error("failed to load model {}: {detail:#}", path.display())]
    ModelLoad { path: PathBuf, detail: anyhow::Error },

    #[error("unexpected model signature: {0}")]
    UnexpectedModelShape(String),

    #[error("inference failed: {0:#}")]
    Inference(anyhow::Error),

    #[error("model returned no output")]
    EmptyOutput,

    #[error("model output is not finite: {0}")]
    NonFiniteOutput(f32),

    #[error("model predicted negative time: {0} minutes")]
    NegativeOutput(f32),
}

impl PipelineError {
    /// Stable machine-readable tag for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidTelemetry(_) => "invalid_telemetry",
            PipelineError::ModelNotFound { .. } => "model_not_found",
            PipelineError::ModelLoad { .. } => "model_load_error",
            PipelineError::UnexpectedModelShape(_) => "unexpected_model_shape",
            PipelineError::Inference(_) => "inference_error",
            PipelineError::EmptyOutput => "empty_output",
            PipelineError::NonFiniteOutput(_) => "non_finite_output",
            PipelineError::NegativeOutput(_) => "negative_output",
        }
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
