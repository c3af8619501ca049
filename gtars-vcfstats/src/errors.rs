use thiserror::Error;

#[derive(Error, Debug)]
pub enum VcfStatsError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Malformed VCF record: {0}")]
    MalformedRecord(String),

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VcfStatsError>;
