use crate::{
    kos::{
        chis, extension_matrix_size, hash_key, into_blocks,
        msgs::{Check, Extend},
        pad_ot_count, transpose_bits, ReceiverConfig, ReceiverError, CSP,
    },
    ROTReceiverOutput, TransferId,
};

use rotx_core::{prg::Prg, Block};

use rand::Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// KOS receiver.
#[derive(Debug, Default)]
pub struct Receiver<T: state::State = state::Initialized> {
    config: ReceiverConfig,
    state: T,
}

impl<T> Receiver<T>
where
    T: state::State,
{
    /// Returns the Receiver's configuration
    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }
}

impl Receiver {
    /// Creates a new Receiver
    ///
    /// # Arguments
    ///
    /// * `config` - The Receiver's configuration
    pub fn new(config: ReceiverConfig) -> Self {
        Receiver {
            config,
            state: state::Initialized {},
        }
    }

    /// Complete the setup phase of the protocol.
    ///
    /// # Arguments
    ///
    /// * `seeds` - The base OT message pairs, the receiver acted as base OT sender.
    /// * `session` - The coin-tossed session id.
    pub fn setup(self, seeds: [[Block; 2]; CSP], session: Block) -> Receiver<state::Extension> {
        Receiver {
            config: self.config,
            state: state::Extension {
                rngs: seeds
                    .into_iter()
                    .map(|seeds| seeds.map(Prg::from_seed))
                    .collect(),
                session,
                transfer_id: TransferId::default(),
                counter: 0,
                pending: None,
            },
        }
    }
}

impl Receiver<state::Extension> {
    /// Extends OTs for the provided choices.
    ///
    /// # Arguments
    ///
    /// * `choices` - The receiver's choice bits.
    /// * `rng` - The RNG used to sample the choices of the sacrificial OTs.
    pub fn extend<R: RngCore + CryptoRng>(
        &mut self,
        choices: &[bool],
        rng: &mut R,
    ) -> Result<Extend, ReceiverError> {
        if self.state.pending.is_some() {
            return Err(ReceiverError::InvalidState(
                "consistency check of the previous extension".to_string(),
            ));
        }

        let count = choices.len();
        let padded = pad_ot_count(count, self.config.statistical_security())
            .ok_or(ReceiverError::InvalidCount(count))?;
        let row_width = padded / 8;

        // x₁,...,xₗ bits in Figure 3, step 1, with random padding.
        let choices = choices
            .iter()
            .copied()
            .chain((count..padded).map(|_| rng.gen::<bool>()))
            .collect::<Vec<_>>();

        // 𝐱ⁱ in Figure 3. Note that it is the same for all i = 1,...,k.
        let mut choice_vector = vec![0u8; row_width];
        for (i, _) in choices.iter().enumerate().filter(|(_, c)| **c) {
            choice_vector[i / 8] |= 1 << (i % 8);
        }

        // 𝐭₀ⁱ in Figure 3.
        let mut ts = vec![0u8; extension_matrix_size(padded)];
        let mut us = vec![0u8; extension_matrix_size(padded)];
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = self.state.rngs
                    .par_iter_mut()
                    .zip(ts.par_chunks_exact_mut(row_width))
                    .zip(us.par_chunks_exact_mut(row_width));
            } else {
                let iter = self.state.rngs
                    .iter_mut()
                    .zip(ts.chunks_exact_mut(row_width))
                    .zip(us.chunks_exact_mut(row_width));
            }
        }

        iter.for_each(|((rngs, t_0), u)| {
            // Figure 3, step 2.
            rngs[0].fill_bytes(t_0);
            // reuse u to avoid memory allocation for 𝐭₁ⁱ
            rngs[1].fill_bytes(u);

            // Figure 3, step 3.
            // Computing `u = t_0 + t_1 + x`.
            u.iter_mut()
                .zip(t_0.iter())
                .zip(&choice_vector)
                .for_each(|((u, t_0), x)| {
                    *u ^= *t_0 ^ x;
                });
        });

        let ts = into_blocks(&transpose_bits(&ts, CSP));

        self.state.pending = Some(state::Pending { count, choices, ts });

        Ok(Extend { count, us })
    }

    /// Performs the consistency check for the pending extension, returning the
    /// check message and the receiver's output.
    ///
    /// # ⚠️ Warning ⚠️
    ///
    /// The provided seed must be unbiased! It should be generated using a
    /// secure coin-toss protocol **after** the receiver has sent its
    /// extension message, ie after it has already committed to its choices.
    ///
    /// # Arguments
    ///
    /// * `chi_seed` - The seed used to generate the consistency check weights.
    pub fn check(
        &mut self,
        chi_seed: Block,
    ) -> Result<(Check, ROTReceiverOutput<bool, Block>), ReceiverError> {
        let state::Pending {
            count,
            mut choices,
            mut ts,
        } = self.state.pending.take().ok_or_else(|| {
            ReceiverError::InvalidState("an extension before the check".to_string())
        })?;

        // Sample random weights for the consistency check.
        let padded = ts.len();
        let chis = chis(chi_seed, padded);

        // Compute the random linear combinations.
        let (x, t0, t1) = choices.iter().zip(&ts).zip(chis).fold(
            (Block::ZERO, Block::ZERO, Block::ZERO),
            |(x, t0, t1), ((c, t), chi)| {
                let (lo, hi) = t.clmul(chi);
                let x = if *c { x ^ chi } else { x };
                (x, t0 ^ lo, t1 ^ hi)
            },
        );

        // Strip off the sacrificial rows.
        ts.truncate(count);
        choices.truncate(count);

        let session = self.state.session;
        let offset = self.state.counter;
        let msgs = ts
            .into_iter()
            .enumerate()
            .map(|(i, t)| hash_key(session, offset + i as u128, t))
            .collect();

        self.state.counter += padded as u128;

        Ok((
            Check { x, t0, t1 },
            ROTReceiverOutput {
                id: self.state.transfer_id.next_id(),
                choices,
                msgs,
            },
        ))
    }
}

/// The receiver's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl Sealed for super::Extension {}
    }

    /// The receiver's state.
    pub trait State: sealed::Sealed {}

    /// The receiver's initial state.
    #[derive(Default)]
    pub struct Initialized {}

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The receiver's state after the setup phase.
    ///
    /// In this state the receiver performs OT extension.
    pub struct Extension {
        /// Receiver's rngs
        pub(super) rngs: Vec<[Prg; 2]>,
        /// Session id mixed into every output.
        pub(super) session: Block,
        /// Current transfer id
        pub(super) transfer_id: TransferId,
        /// Number of OTs extended so far, used as the hash tweak.
        pub(super) counter: u128,
        /// Extension awaiting its consistency check.
        pub(super) pending: Option<Pending>,
    }

    impl State for Extension {}

    opaque_debug::implement!(Extension);

    pub(super) struct Pending {
        pub(super) count: usize,
        pub(super) choices: Vec<bool>,
        pub(super) ts: Vec<Block>,
    }
}
