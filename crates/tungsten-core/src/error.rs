use thiserror::Error;
use tungsten_training::TrainingError;

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Error type for the pipeline core.
///
/// `Config`, `Decision` and `InvalidCandidate` are fatal configuration
/// errors: the controller validates before mutating the checkpoint, so a
/// corrected input can be retried without losing state. Promotion and
/// diagnostic failures are handled at the boundary and never reach here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("decision error: {0}")]
    Decision(String),

    #[error("invalid candidate selection: {0}")]
    InvalidCandidate(String),

    #[error("intake error: {0}")]
    Intake(String),

    #[error("promotion error: {0}")]
    Promotion(String),

    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
