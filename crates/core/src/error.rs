use thiserror::Error;

pub type InsightResult<T> = Result<T, InsightError>;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data load error: {0}")]
    DataLoad(String),

    #[error("Schema error: missing field '{0}'")]
    Schema(String),

    #[error("Model fit failed: {0}")]
    Separation(String),

    #[error("ROC undefined: {0}")]
    DegenerateLabels(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
