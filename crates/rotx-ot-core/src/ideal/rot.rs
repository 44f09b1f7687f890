//! Ideal Random Oblivious Transfer functionality.

use rand::{
    distributions::{Distribution, Standard},
    Rng, SeedableRng,
};
use rand_chacha::ChaCha8Rng;
use rotx_core::{prg::Prg, Block};

use crate::{ROTReceiverOutput, ROTSenderOutput, TransferId};

/// The ideal ROT functionality.
///
/// Two instances created from the same seed produce the same message pairs, so a
/// sender and a receiver can each hold one and stay correlated without
/// communicating.
#[derive(Debug)]
pub struct IdealROT {
    transfer_id: TransferId,
    counter: usize,
    prg: Prg,
}

impl IdealROT {
    /// Creates a new ideal ROT functionality.
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed for the PRG.
    pub fn new(seed: Block) -> Self {
        IdealROT {
            transfer_id: TransferId::default(),
            counter: 0,
            prg: Prg::from_seed(seed),
        }
    }

    /// Returns the current transfer id.
    pub fn transfer_id(&self) -> TransferId {
        self.transfer_id
    }

    /// Returns the number of OTs executed.
    pub fn count(&self) -> usize {
        self.counter
    }

    /// Executes random oblivious transfers with random choices.
    ///
    /// # Arguments
    ///
    /// * `count` - The number of OTs to execute.
    pub fn random<T: Copy>(
        &mut self,
        count: usize,
    ) -> (ROTSenderOutput<[T; 2]>, ROTReceiverOutput<bool, T>)
    where
        Standard: Distribution<T>,
    {
        let mut choices = vec![false; count];

        self.prg.random_bools(&mut choices);

        self.random_with_choices(choices)
    }

    /// Executes random oblivious transfers with choices provided by the receiver.
    ///
    /// # Arguments
    ///
    /// * `choices` - The choices made by the receiver.
    pub fn random_with_choices<T: Copy>(
        &mut self,
        choices: Vec<bool>,
    ) -> (ROTSenderOutput<[T; 2]>, ROTReceiverOutput<bool, T>)
    where
        Standard: Distribution<T>,
    {
        let ROTSenderOutput { id, msgs } = self.send_random(choices.len());

        let chosen = choices
            .iter()
            .zip(msgs.iter())
            .map(|(&choice, [zero, one])| if choice { *one } else { *zero })
            .collect();

        (
            ROTSenderOutput { id, msgs },
            ROTReceiverOutput {
                id,
                choices,
                msgs: chosen,
            },
        )
    }

    /// Outputs the sender's side of `count` random oblivious transfers.
    ///
    /// Draws the same pairs [`IdealROT::random_with_choices`] would for the same
    /// count, so a sender-side instance matches a receiver-side instance with the
    /// same seed.
    ///
    /// # Arguments
    ///
    /// * `count` - The number of OTs to execute.
    pub fn send_random<T>(&mut self, count: usize) -> ROTSenderOutput<[T; 2]>
    where
        Standard: Distribution<T>,
    {
        let msgs: Vec<[T; 2]> = (0..count)
            .map(|_| [self.prg.sample(Standard), self.prg.sample(Standard)])
            .collect();

        self.counter += count;
        let id = self.transfer_id.next_id();

        ROTSenderOutput { id, msgs }
    }
}

impl Default for IdealROT {
    fn default() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        Self::new(rng.gen())
    }
}
