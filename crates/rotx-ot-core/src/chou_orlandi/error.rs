/// Errors that can occur when using the CO15 sender.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error("count mismatch: sender has {0} messages, receiver sent {1} choices")]
    CountMismatch(usize, usize),
}

/// Errors that can occur when using the CO15 receiver.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error("invalid sender setup: {0}")]
    InvalidSetup(String),
    #[error("count mismatch: expected {0} ciphertexts, got {1}")]
    CountMismatch(usize, usize),
}
