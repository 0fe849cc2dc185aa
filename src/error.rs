use thiserror::Error;

#[derive(Error, Debug)]
pub enum OscarError {
    #[error("Missing columns in CSV: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Model is not fitted")]
    ModelNotReady,

    #[error("Category model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, OscarError>;
