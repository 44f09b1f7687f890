use std::mem;

use enum_try_as_inner::EnumTryAsInner;
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rotx_cointoss::{cointoss_receiver, cointoss_sender};
use rotx_common::{IoExt, Network, PartyId};
use rotx_core::{BitVector, Block};
use rotx_ot_core::{
    chou_orlandi::{msgs::ReceiverPayload as BaseReceiverPayload, Sender as BaseSender},
    kos::{receiver_state as state, Receiver as ReceiverCore, ReceiverConfig, CSP},
    ROTReceiverOutput,
};
use tracing::instrument;

use crate::{RoleState, RotReceiver, SeedSourceError};

#[derive(Debug, EnumTryAsInner)]
#[derive_err(Debug)]
pub(crate) enum State {
    Initialized(Box<ReceiverCore<state::Initialized>>),
    Extension(Box<ReceiverCore<state::Extension>>),
    Error,
}

/// KOS receiver.
///
/// Acts as the base OT sender of random seed pairs.
#[derive(Debug)]
pub struct Receiver<N> {
    state: State,
    /// Set once the setup completes, never cleared.
    initialized: bool,
    net: N,
    peer: PartyId,
    rng: ChaCha20Rng,
}

impl<N> Receiver<N> {
    /// Creates a new Receiver.
    ///
    /// # Arguments
    ///
    /// * `config` - The extension configuration.
    /// * `net` - The network endpoint.
    /// * `peer` - The ID of the sender.
    /// * `rng` - The RNG used for the base OT, the padding choices and coin tosses.
    pub fn new(config: ReceiverConfig, net: N, peer: PartyId, rng: ChaCha20Rng) -> Self {
        Self {
            state: State::Initialized(Box::new(ReceiverCore::new(config))),
            initialized: false,
            net,
            peer,
            rng,
        }
    }

    /// Returns the ID of the sender.
    pub fn peer(&self) -> PartyId {
        self.peer
    }

    /// Returns a reference to the network endpoint.
    pub fn network(&self) -> &N {
        &self.net
    }
}

impl<N: Network> RotReceiver for Receiver<N> {
    fn state(&self) -> RoleState {
        if self.initialized {
            RoleState::Initialized
        } else {
            RoleState::Uninitialized
        }
    }

    #[instrument(level = "debug", fields(peer = %self.peer), skip_all, err)]
    fn initialize(&mut self) -> Result<(), SeedSourceError> {
        if self.initialized {
            return Ok(());
        }

        let ext_receiver = mem::replace(&mut self.state, State::Error).try_into_initialized()?;

        let (setup, mut base) = BaseSender::new_with_seed(self.rng.gen()).setup();
        self.net.send_msg(self.peer, &setup)?;

        let seeds: [[Block; 2]; CSP] = std::array::from_fn(|_| self.rng.gen());

        let payload: BaseReceiverPayload = self.net.expect_next(self.peer)?;
        let payload = base.send(&seeds, payload)?;
        self.net.send_msg(self.peer, &payload)?;

        let session = cointoss_receiver(&mut self.net, self.peer, vec![self.rng.gen()])?[0];

        self.state = State::Extension(Box::new(ext_receiver.setup(seeds, session)));
        self.initialized = true;

        Ok(())
    }

    #[instrument(level = "debug", fields(peer = %self.peer, count = choices.len()), skip_all, err)]
    fn extend(&mut self, choices: &BitVector) -> Result<Vec<BitVector>, SeedSourceError> {
        if choices.is_empty() {
            return Ok(Vec::new());
        }

        let mut ext_receiver = mem::replace(&mut self.state, State::Error).try_into_extension()?;

        let extend = ext_receiver.extend(&choices.to_bools(), &mut self.rng)?;
        self.net.send_msg(self.peer, &extend)?;

        // The receiver commits to its share of chi_seed.
        let chi_seed = cointoss_sender(&mut self.net, self.peer, vec![self.rng.gen()])?[0];

        let (check, output) = ext_receiver.check(chi_seed)?;
        self.net.send_msg(self.peer, &check)?;

        self.state = State::Extension(ext_receiver);

        let ROTReceiverOutput { id, msgs, .. } = output;

        tracing::debug!(%id, "extension complete");

        Ok(msgs.into_iter().map(BitVector::from).collect())
    }
}
