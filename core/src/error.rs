use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Extraction(String),

    #[error("{0}")]
    Search(String),

    #[error("cache load failed: {0}")]
    CacheLoad(String),

    #[error("cache write failed: {0}")]
    CacheWrite(String),

    #[error("an extraction is already in progress")]
    Busy,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
