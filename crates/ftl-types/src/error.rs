use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid quantity: {0:?}")]
    InvalidQuantity(String),

    #[error("unknown event name: {0}")]
    UnknownEvent(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
