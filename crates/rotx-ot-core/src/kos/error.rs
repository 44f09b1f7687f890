/// Errors that can occur when using the KOS sender.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error("invalid state: expected {0}")]
    InvalidState(String),
    #[error("count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
    #[error("invalid count: {0} OTs overflow the padded extension")]
    InvalidCount(usize),
    #[error("invalid extend")]
    InvalidExtend,
    #[error("consistency check failed")]
    ConsistencyCheckFailed,
}

/// Errors that can occur when using the KOS receiver.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error("invalid state: expected {0}")]
    InvalidState(String),
    #[error("invalid count: {0} OTs overflow the padded extension")]
    InvalidCount(usize),
}
