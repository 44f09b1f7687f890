use crate::{
    kos::{
        chis, extension_matrix_size, hash_key, into_blocks,
        msgs::{Check, Extend},
        pad_ot_count, transpose_bits, SenderConfig, SenderError, CSP,
    },
    ROTSenderOutput, TransferId,
};

use rotx_core::{prg::Prg, Block};

use rand_core::{RngCore, SeedableRng};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// KOS sender.
#[derive(Debug, Default)]
pub struct Sender<T: state::State = state::Initialized> {
    config: SenderConfig,
    state: T,
}

impl<T> Sender<T>
where
    T: state::State,
{
    /// Returns the Sender's configuration
    pub fn config(&self) -> &SenderConfig {
        &self.config
    }
}

impl Sender {
    /// Creates a new Sender
    ///
    /// # Arguments
    ///
    /// * `config` - The Sender's configuration
    /// * `delta` - The correlation, used as the base OT choices.
    pub fn new(config: SenderConfig, delta: Block) -> Self {
        Sender {
            config,
            state: state::Initialized { delta },
        }
    }

    /// Returns the base OT choices, which are the bits of delta.
    pub fn base_choices(&self) -> Vec<bool> {
        self.state.delta.iter_lsb0().collect()
    }

    /// Complete the setup phase of the protocol.
    ///
    /// # Arguments
    ///
    /// * `seeds` - The base OT messages chosen with the bits of delta.
    /// * `session` - The coin-tossed session id.
    pub fn setup(self, seeds: [Block; CSP], session: Block) -> Sender<state::Extension> {
        Sender {
            config: self.config,
            state: state::Extension {
                delta: self.state.delta,
                rngs: seeds.into_iter().map(Prg::from_seed).collect(),
                session,
                transfer_id: TransferId::default(),
                counter: 0,
                pending: None,
            },
        }
    }
}

impl Sender<state::Extension> {
    /// Processes the receiver's extension message.
    ///
    /// # Arguments
    ///
    /// * `count` - The number of OTs the sender expects.
    /// * `extend` - The receiver's extension message.
    pub fn extend(&mut self, count: usize, extend: Extend) -> Result<(), SenderError> {
        if self.state.pending.is_some() {
            return Err(SenderError::InvalidState(
                "consistency check of the previous extension".to_string(),
            ));
        }

        let Extend {
            count: receiver_count,
            us,
        } = extend;

        if count != receiver_count {
            return Err(SenderError::CountMismatch {
                expected: count,
                actual: receiver_count,
            });
        }

        let padded = pad_ot_count(count, self.config.statistical_security())
            .ok_or(SenderError::InvalidCount(count))?;
        if us.len() != extension_matrix_size(padded) {
            return Err(SenderError::InvalidExtend);
        }

        let row_width = padded / 8;
        let delta = self.state.delta;

        let mut qs = vec![0u8; extension_matrix_size(padded)];
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = self.state.rngs
                    .par_iter_mut()
                    .enumerate()
                    .zip(qs.par_chunks_exact_mut(row_width))
                    .zip(us.par_chunks_exact(row_width));
            } else {
                let iter = self.state.rngs
                    .iter_mut()
                    .enumerate()
                    .zip(qs.chunks_exact_mut(row_width))
                    .zip(us.chunks_exact(row_width));
            }
        }

        iter.for_each(|(((j, rng), q), u)| {
            // Figure 3, step 4.
            rng.fill_bytes(q);
            if delta.bit(j) {
                // If `x_i = 1` xor the column with `u`.
                q.iter_mut().zip(u).for_each(|(q, u)| *q ^= u);
            }
        });

        let qs = into_blocks(&transpose_bits(&qs, CSP));

        self.state.pending = Some(state::Pending { count, qs });

        Ok(())
    }

    /// Verifies the receiver's consistency check, returning the sender's output.
    ///
    /// # ⚠️ Warning ⚠️
    ///
    /// The provided seed must be unbiased! It should be generated using a
    /// secure coin-toss protocol **after** the receiver has sent its
    /// extension message.
    ///
    /// # Arguments
    ///
    /// * `chi_seed` - The seed used to generate the consistency check weights.
    /// * `receiver_check` - The receiver's check message.
    pub fn check(
        &mut self,
        chi_seed: Block,
        receiver_check: Check,
    ) -> Result<ROTSenderOutput<[Block; 2]>, SenderError> {
        let state::Pending { count, mut qs } =
            self.state.pending.take().ok_or_else(|| {
                SenderError::InvalidState("an extension before the check".to_string())
            })?;

        let padded = qs.len();
        let chis = chis(chi_seed, padded);

        let (q0, q1) = qs
            .iter()
            .zip(chis)
            .fold((Block::ZERO, Block::ZERO), |(q0, q1), (q, chi)| {
                let (lo, hi) = q.clmul(chi);
                (q0 ^ lo, q1 ^ hi)
            });

        let Check { x, t0, t1 } = receiver_check;
        let (xd0, xd1) = x.clmul(self.state.delta);

        if q0 != t0 ^ xd0 || q1 != t1 ^ xd1 {
            return Err(SenderError::ConsistencyCheckFailed);
        }

        qs.truncate(count);

        let delta = self.state.delta;
        let session = self.state.session;
        let offset = self.state.counter;
        let msgs = qs
            .into_iter()
            .enumerate()
            .map(|(i, q)| {
                let tweak = offset + i as u128;
                [
                    hash_key(session, tweak, q),
                    hash_key(session, tweak, q ^ delta),
                ]
            })
            .collect();

        self.state.counter += padded as u128;

        Ok(ROTSenderOutput {
            id: self.state.transfer_id.next_id(),
            msgs,
        })
    }
}

/// The sender's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl Sealed for super::Extension {}
    }

    /// The sender's state.
    pub trait State: sealed::Sealed {}

    /// The sender's initial state.
    #[derive(Default)]
    pub struct Initialized {
        /// Sender's correlation
        pub(super) delta: Block,
    }

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The sender's state after the setup phase.
    ///
    /// In this state the sender performs OT extension.
    pub struct Extension {
        /// Sender's correlation
        pub(super) delta: Block,
        /// Sender's rngs
        pub(super) rngs: Vec<Prg>,
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
        pub(super) qs: Vec<Block>,
    }
}
