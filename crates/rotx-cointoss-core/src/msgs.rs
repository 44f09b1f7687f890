//! Coin-toss messages.

use rotx_core::{
    commit::{Commitment, Decommitment},
    Block,
};
use serde::{Deserialize, Serialize};

/// The sender's commitment to its seeds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SenderCommitment {
    /// The commitment.
    pub commitment: Commitment,
}

/// The receiver's seeds, sent in the clear after receiving the commitment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverPayload {
    /// The receiver's seeds.
    pub seeds: Vec<Block>,
}

/// The opening of the sender's commitment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderPayload {
    /// The opening.
    pub decommitment: Decommitment<Vec<Block>>,
}
