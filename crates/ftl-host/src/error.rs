use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HostResult<T> = Result<T, HostError>;
