use std::fmt::Display;

use rotx_cointoss::{CointossError, CoreError};
use rotx_common::NetworkError;
use rotx_core::{
    commit::{CommitmentError, CommitmentErrorKind},
    expand::ExpansionError,
};
use rotx_ot_core::{chou_orlandi, kos};

use crate::config::RotConfigBuilderError;

/// A random OT error.
///
/// Every fault of the layers below [`BatchRot`](crate::BatchRot) is narrowed to one of
/// these two kinds, keeping the original diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OTError {
    /// The peer deviated from the protocol.
    #[error("malicious behavior: {0}")]
    MaliciousBehavior(String),
    /// The operation failed for a reason not attributable to the peer.
    #[error("operation failed: {0}")]
    OperationFailed(String),
}

impl OTError {
    /// Returns `true` if the error is caused by a cheating peer.
    pub fn is_malicious(&self) -> bool {
        matches!(self, OTError::MaliciousBehavior(_))
    }
}

impl From<SeedSourceError> for OTError {
    fn from(err: SeedSourceError) -> Self {
        let msg = err.to_string();
        match err {
            SeedSourceError::Extension(err) => match err.kind() {
                ExtensionErrorKind::Malicious => OTError::MaliciousBehavior(msg),
                ExtensionErrorKind::Failed => OTError::OperationFailed(msg),
            },
            SeedSourceError::Commitment(err) => match err.kind() {
                CommitmentErrorKind::Malicious => OTError::MaliciousBehavior(msg),
                CommitmentErrorKind::Failed => OTError::OperationFailed(msg),
            },
            SeedSourceError::Cointoss(_) => OTError::OperationFailed(msg),
        }
    }
}

impl From<ExpansionError> for OTError {
    fn from(err: ExpansionError) -> Self {
        match err {
            ExpansionError::Unavailable(_) => {
                OTError::OperationFailed(format!("seed expansion error: {err}"))
            }
        }
    }
}

impl From<RotConfigBuilderError> for OTError {
    fn from(err: RotConfigBuilderError) -> Self {
        match err {
            RotConfigBuilderError::UninitializedField(field) => {
                OTError::OperationFailed(format!("config error: missing {field}"))
            }
            RotConfigBuilderError::ValidationError(msg) => {
                OTError::OperationFailed(format!("config error: {msg}"))
            }
        }
    }
}

/// An error returned by a random OT role.
#[derive(Debug, thiserror::Error)]
pub enum SeedSourceError {
    /// The OT extension failed.
    #[error("extension error: {0}")]
    Extension(#[from] ExtensionError),
    /// A commitment failed to open.
    #[error("commitment error: {0}")]
    Commitment(#[from] CommitmentError),
    /// A coin toss failed.
    #[error("coin toss error: {0}")]
    Cointoss(CointossError),
}

impl From<CointossError> for SeedSourceError {
    fn from(err: CointossError) -> Self {
        match err {
            CointossError::Core(CoreError::Commitment(err)) => SeedSourceError::Commitment(err),
            err => SeedSourceError::Cointoss(err),
        }
    }
}

impl From<NetworkError> for SeedSourceError {
    fn from(err: NetworkError) -> Self {
        SeedSourceError::Extension(err.into())
    }
}

impl From<kos::SenderError> for SeedSourceError {
    fn from(err: kos::SenderError) -> Self {
        SeedSourceError::Extension(err.into())
    }
}

impl From<kos::ReceiverError> for SeedSourceError {
    fn from(err: kos::ReceiverError) -> Self {
        SeedSourceError::Extension(err.into())
    }
}

impl From<chou_orlandi::SenderError> for SeedSourceError {
    fn from(err: chou_orlandi::SenderError) -> Self {
        SeedSourceError::Extension(err.into())
    }
}

impl From<chou_orlandi::ReceiverError> for SeedSourceError {
    fn from(err: chou_orlandi::ReceiverError) -> Self {
        SeedSourceError::Extension(err.into())
    }
}

impl From<crate::kos::sender::StateError> for SeedSourceError {
    fn from(err: crate::kos::sender::StateError) -> Self {
        SeedSourceError::Extension(ExtensionError::state(err.to_string()))
    }
}

impl From<crate::kos::receiver::StateError> for SeedSourceError {
    fn from(err: crate::kos::receiver::StateError) -> Self {
        SeedSourceError::Extension(ExtensionError::state(err.to_string()))
    }
}

/// The kind of an [`ExtensionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionErrorKind {
    /// The peer cheated.
    Malicious,
    /// The extension failed without evidence of cheating.
    Failed,
}

/// OT extension error.
#[derive(Debug, thiserror::Error)]
pub struct ExtensionError {
    kind: ExtensionErrorKind,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ExtensionError {
    /// Creates an error attributed to a cheating peer.
    pub fn malicious(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            kind: ExtensionErrorKind::Malicious,
            source: Some(source.into()),
        }
    }

    /// Creates an error not attributable to the peer.
    pub fn failed(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            kind: ExtensionErrorKind::Failed,
            source: Some(source.into()),
        }
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        Self::failed(format!("invalid state: {}", msg.into()))
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> ExtensionErrorKind {
        self.kind
    }

    /// Returns `true` if the peer cheated.
    pub fn is_malicious(&self) -> bool {
        self.kind == ExtensionErrorKind::Malicious
    }
}

impl Display for ExtensionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ExtensionErrorKind::Malicious => f.write_str("malicious extension")?,
            ExtensionErrorKind::Failed => f.write_str("extension failed")?,
        }

        if let Some(source) = &self.source {
            write!(f, " caused by: {}", source)
        } else {
            Ok(())
        }
    }
}

impl From<NetworkError> for ExtensionError {
    fn from(err: NetworkError) -> Self {
        Self::failed(err)
    }
}

impl From<kos::SenderError> for ExtensionError {
    fn from(err: kos::SenderError) -> Self {
        match err {
            kos::SenderError::ConsistencyCheckFailed => Self::malicious(err),
            err => Self::failed(err),
        }
    }
}

impl From<kos::ReceiverError> for ExtensionError {
    fn from(err: kos::ReceiverError) -> Self {
        Self::failed(err)
    }
}

impl From<chou_orlandi::SenderError> for ExtensionError {
    fn from(err: chou_orlandi::SenderError) -> Self {
        Self::failed(err)
    }
}

impl From<chou_orlandi::ReceiverError> for ExtensionError {
    fn from(err: chou_orlandi::ReceiverError) -> Self {
        match err {
            chou_orlandi::ReceiverError::InvalidSetup(_) => Self::malicious(err),
            err => Self::failed(err),
        }
    }
}
