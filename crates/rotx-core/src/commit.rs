//! A hash commitment scheme.
//!
//! A commitment to a value is the BLAKE3 hash of a random 32-byte nonce followed
//! by the bincode encoding of the value. It is hiding as long as the nonce stays
//! secret and binding by collision resistance of the hash.

use std::fmt::Display;

use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

const DOMAIN: &str = "rotx 2024 hash commitment";

/// Error kind of a [`CommitmentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentErrorKind {
    /// The committer opened to a value other than the one committed to.
    Malicious,
    /// The scheme could not be executed.
    Failed,
}

/// Commitment scheme error.
#[derive(Debug, thiserror::Error)]
pub struct CommitmentError {
    kind: CommitmentErrorKind,
    detail: String,
}

impl CommitmentError {
    /// Creates an error attributable to a cheating committer.
    pub fn malicious(detail: impl Into<String>) -> Self {
        Self {
            kind: CommitmentErrorKind::Malicious,
            detail: detail.into(),
        }
    }

    /// Creates an error which is not attributable to cheating.
    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            kind: CommitmentErrorKind::Failed,
            detail: detail.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> CommitmentErrorKind {
        self.kind
    }

    /// Returns `true` if the error was caused by a cheating committer.
    pub fn is_malicious(&self) -> bool {
        self.kind == CommitmentErrorKind::Malicious
    }
}

impl Display for CommitmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            CommitmentErrorKind::Malicious => f.write_str("malicious commitment")?,
            CommitmentErrorKind::Failed => f.write_str("commitment failed")?,
        }

        write!(f, ": {}", self.detail)
    }
}

/// A random nonce which hides the committed value.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce([u8; 32]);

opaque_debug::implement!(Nonce);

impl Nonce {
    /// Samples a fresh nonce.
    pub fn random() -> Self {
        Self(thread_rng().gen())
    }
}

/// A commitment to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment([u8; 32]);

impl Commitment {
    /// Returns the commitment bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// The opening of a [`Commitment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decommitment<T> {
    nonce: Nonce,
    data: T,
}

impl<T> Decommitment<T>
where
    T: Serialize,
{
    /// Creates a new opening for `data` with a fresh nonce.
    pub fn new(data: T) -> Self {
        Self {
            nonce: Nonce::random(),
            data,
        }
    }

    /// Creates a new opening for `data` with the provided nonce.
    pub fn new_with_nonce(data: T, nonce: Nonce) -> Self {
        Self { nonce, data }
    }

    /// Computes the commitment.
    pub fn commit(&self) -> Result<Commitment, CommitmentError> {
        let encoded = bincode::serialize(&self.data)
            .map_err(|e| CommitmentError::failed(format!("failed to encode value: {e}")))?;

        let mut hasher = blake3::Hasher::new_derive_key(DOMAIN);
        hasher.update(&self.nonce.0);
        hasher.update(&encoded);

        Ok(Commitment(*hasher.finalize().as_bytes()))
    }

    /// Verifies that this opening matches `commitment`.
    pub fn verify(&self, commitment: &Commitment) -> Result<(), CommitmentError> {
        if &self.commit()? != commitment {
            return Err(CommitmentError::malicious(
                "opening does not match the commitment",
            ));
        }

        Ok(())
    }

    /// Returns a reference to the committed value.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns the committed value.
    pub fn into_inner(self) -> T {
        self.data
    }
}

/// A value which can be hash committed.
pub trait HashCommit: Serialize + Sized {
    /// Commits to `self`, returning the opening and the commitment.
    fn hash_commit(self) -> Result<(Decommitment<Self>, Commitment), CommitmentError> {
        let decommitment = Decommitment::new(self);
        let commitment = decommitment.commit()?;

        Ok((decommitment, commitment))
    }
}

impl<T: Serialize> HashCommit for T {}
