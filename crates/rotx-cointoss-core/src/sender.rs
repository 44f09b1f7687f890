use rotx_core::{commit::Decommitment, Block};

use crate::{
    msgs::{ReceiverPayload, SenderCommitment, SenderPayload},
    CointossError,
};

/// A coin-toss sender.
#[derive(Debug)]
pub struct Sender<S: state::State = state::Initialized> {
    state: S,
}

impl Sender {
    /// Creates a new sender.
    ///
    /// # Arguments
    ///
    /// * `seeds` - The sender's seeds.
    pub fn new(seeds: Vec<Block>) -> Self {
        Self {
            state: state::Initialized { seeds },
        }
    }

    /// Commits to the seeds, returning the commitment to send to the receiver.
    pub fn commit(self) -> Result<(SenderCommitment, Sender<state::Committed>), CointossError> {
        let decommitment = Decommitment::new(self.state.seeds);
        let commitment = decommitment.commit()?;

        Ok((
            SenderCommitment { commitment },
            Sender {
                state: state::Committed { decommitment },
            },
        ))
    }
}

impl Sender<state::Committed> {
    /// Receives the receiver's seeds, returning the coin-toss output.
    pub fn receive(
        self,
        payload: ReceiverPayload,
    ) -> Result<(Vec<Block>, Sender<state::Received>), CointossError> {
        let state::Committed { decommitment } = self.state;
        let ReceiverPayload {
            seeds: receiver_seeds,
        } = payload;

        let seeds = decommitment.data();
        if seeds.len() != receiver_seeds.len() {
            return Err(CointossError::CountMismatch {
                expected: seeds.len(),
                actual: receiver_seeds.len(),
            });
        }

        let output = seeds
            .iter()
            .zip(receiver_seeds)
            .map(|(a, b)| *a ^ b)
            .collect();

        Ok((
            output,
            Sender {
                state: state::Received { decommitment },
            },
        ))
    }
}

impl Sender<state::Received> {
    /// Returns the opening of the commitment.
    pub fn finalize(self) -> SenderPayload {
        SenderPayload {
            decommitment: self.state.decommitment,
        }
    }
}

/// Coin-toss sender states.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl Sealed for super::Committed {}
        impl Sealed for super::Received {}
    }

    /// A sender state.
    pub trait State: sealed::Sealed {}

    /// The sender's initial state.
    pub struct Initialized {
        pub(super) seeds: Vec<Block>,
    }

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The sender has committed to its seeds.
    pub struct Committed {
        pub(super) decommitment: Decommitment<Vec<Block>>,
    }

    impl State for Committed {}

    opaque_debug::implement!(Committed);

    /// The sender has received the receiver's seeds.
    pub struct Received {
        pub(super) decommitment: Decommitment<Vec<Block>>,
    }

    impl State for Received {}

    opaque_debug::implement!(Received);
}
