//! Low-level crate containing the state machines of a two-party coin toss.
//!
//! The sender commits to its seeds, the receiver answers with its own seeds in the
//! clear, and the sender opens its commitment. Both parties output the XOR of the
//! two seed vectors. Neither party can bias the output without breaking the
//! commitment.
//!
//! ```text
//! Sender                          Receiver
//!   | --- SenderCommitment -------> |
//!   | <-- ReceiverPayload --------- |
//!   | --- SenderPayload ----------> |
//! ```

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

pub mod msgs;
mod receiver;
mod sender;

pub use receiver::{state as receiver_state, Receiver};
pub use sender::{state as sender_state, Sender};

use rotx_core::commit::CommitmentError;

/// A coin-toss error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum CointossError {
    #[error("count mismatch: expected {expected} seeds, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    Commitment(#[from] CommitmentError),
}
