use rotx_core::{commit::Commitment, Block};

use crate::{
    msgs::{ReceiverPayload, SenderCommitment, SenderPayload},
    CointossError,
};

/// A coin-toss receiver.
#[derive(Debug)]
pub struct Receiver<S: state::State = state::Initialized> {
    state: S,
}

impl Receiver {
    /// Creates a new receiver.
    ///
    /// # Arguments
    ///
    /// * `seeds` - The receiver's seeds.
    pub fn new(seeds: Vec<Block>) -> Self {
        Self {
            state: state::Initialized { seeds },
        }
    }

    /// Receives the sender's commitment, returning the seeds to send back.
    pub fn receive_commitment(
        self,
        commitment: SenderCommitment,
    ) -> (ReceiverPayload, Receiver<state::Received>) {
        let state::Initialized { seeds } = self.state;

        (
            ReceiverPayload {
                seeds: seeds.clone(),
            },
            Receiver {
                state: state::Received {
                    seeds,
                    commitment: commitment.commitment,
                },
            },
        )
    }
}

impl Receiver<state::Received> {
    /// Verifies the sender's opening, returning the coin-toss output.
    pub fn receive(self, payload: SenderPayload) -> Result<Vec<Block>, CointossError> {
        let state::Received { seeds, commitment } = self.state;
        let SenderPayload { decommitment } = payload;

        decommitment.verify(&commitment)?;

        let sender_seeds = decommitment.into_inner();
        if sender_seeds.len() != seeds.len() {
            return Err(CointossError::CountMismatch {
                expected: seeds.len(),
                actual: sender_seeds.len(),
            });
        }

        Ok(sender_seeds
            .into_iter()
            .zip(seeds)
            .map(|(a, b)| a ^ b)
            .collect())
    }
}

/// Coin-toss receiver states.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl Sealed for super::Received {}
    }

    /// A receiver state.
    pub trait State: sealed::Sealed {}

    /// The receiver's initial state.
    pub struct Initialized {
        pub(super) seeds: Vec<Block>,
    }

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The receiver has received the sender's commitment.
    pub struct Received {
        pub(super) seeds: Vec<Block>,
        pub(super) commitment: Commitment,
    }

    impl State for Received {}

    opaque_debug::implement!(Received);
}
