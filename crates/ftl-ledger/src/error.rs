use ftl_store::StoreError;

/// Failure reported by a host collaborator (identity or event bus).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HostFault(pub String);

impl HostFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors produced by ledger operations.
///
/// Every variant aborts the invocation and none is retried inside the
/// engine. All of them except `StorageWriteError` are raised before the
/// operation issues any write. A `StorageWriteError` comes from the flush
/// itself; whether earlier keys of the batch landed depends on the store's
/// `put_batch`, and the host transaction is what discards them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid arguments for {operation}: {reason}")]
    InvalidArguments {
        operation: &'static str,
        reason: String,
    },

    #[error("invalid function name: {0}")]
    UnknownOperation(String),

    #[error("arithmetic overflow: {a} + {b}")]
    ArithmeticOverflow { a: u64, b: u64 },

    #[error("arithmetic underflow: {a} - {b}")]
    ArithmeticUnderflow { a: u64, b: u64 },

    #[error("storage read failed for {key}: {reason}")]
    StorageReadError { key: String, reason: String },

    #[error("storage write failed for {key}: {reason}")]
    StorageWriteError { key: String, reason: String },

    #[error("corrupt value under {key}: {value:?}")]
    StorageCorruption { key: String, value: String },

    #[error("cannot resolve caller identity: {0}")]
    IdentityResolutionError(String),

    #[error("event emission failed: {0}")]
    EventEmissionError(String),

    #[error("ledger already initialized for {0}")]
    AlreadyInitialized(String),
}

impl LedgerError {
    pub(crate) fn invalid_args(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            operation,
            reason: reason.into(),
        }
    }

    pub(crate) fn read(key: &str, err: StoreError) -> Self {
        Self::StorageReadError {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn write(key: &str, err: StoreError) -> Self {
        Self::StorageWriteError {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }

    /// Stable machine-readable code for the host's reporting layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArguments { .. } => "InvalidArguments",
            Self::UnknownOperation(_) => "UnknownOperation",
            Self::ArithmeticOverflow { .. } => "ArithmeticOverflow",
            Self::ArithmeticUnderflow { .. } => "ArithmeticUnderflow",
            Self::StorageReadError { .. } => "StorageReadError",
            Self::StorageWriteError { .. } => "StorageWriteError",
            Self::StorageCorruption { .. } => "StorageCorruption",
            Self::IdentityResolutionError(_) => "IdentityResolutionError",
            Self::EventEmissionError(_) => "EventEmissionError",
            Self::AlreadyInitialized(_) => "AlreadyInitialized",
        }
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
