use thiserror::Error;

pub type TrainingResult<T> = std::result::Result<T, TrainingError>;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("invalid hyperparameter grid: {0}")]
    InvalidGrid(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("model store error: {0}")]
    Store(String),

    #[error("trainer error: {0}")]
    Trainer(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
