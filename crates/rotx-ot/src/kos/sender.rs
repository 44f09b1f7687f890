use std::mem;

use enum_try_as_inner::EnumTryAsInner;
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rotx_cointoss::{cointoss_receiver, cointoss_sender};
use rotx_common::{IoExt, Network, PartyId};
use rotx_core::{BitVector, Block};
use rotx_ot_core::{
    chou_orlandi::{
        msgs::{SenderPayload as BaseSenderPayload, SenderSetup},
        Receiver as BaseReceiver,
    },
    kos::{
        msgs::{Check, Extend},
        sender_state as state, Sender as SenderCore, SenderConfig, CSP,
    },
    ROTSenderOutput,
};
use tracing::instrument;

use crate::{ExtensionError, RoleState, RotSender, SeedPairs, SeedSourceError};

#[derive(Debug, EnumTryAsInner)]
#[derive_err(Debug)]
pub(crate) enum State {
    Initialized(Box<SenderCore<state::Initialized>>),
    Extension(Box<SenderCore<state::Extension>>),
    Error,
}

/// KOS sender.
///
/// Acts as the base OT receiver, choosing with the bits of its secret
/// correlation.
#[derive(Debug)]
pub struct Sender<N> {
    state: State,
    /// Set once the setup completes, never cleared.
    initialized: bool,
    net: N,
    peer: PartyId,
    rng: ChaCha20Rng,
}

impl<N> Sender<N> {
    /// Creates a new Sender.
    ///
    /// # Arguments
    ///
    /// * `config` - The extension configuration.
    /// * `net` - The network endpoint.
    /// * `peer` - The ID of the receiver.
    /// * `rng` - The RNG used for the correlation, the base OT and coin tosses.
    pub fn new(config: SenderConfig, net: N, peer: PartyId, mut rng: ChaCha20Rng) -> Self {
        let delta: Block = rng.gen();

        Self {
            state: State::Initialized(Box::new(SenderCore::new(config, delta))),
            initialized: false,
            net,
            peer,
            rng,
        }
    }

    /// Returns the ID of the receiver.
    pub fn peer(&self) -> PartyId {
        self.peer
    }

    /// Returns a reference to the network endpoint.
    pub fn network(&self) -> &N {
        &self.net
    }
}

impl<N: Network> RotSender for Sender<N> {
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

        let ext_sender = mem::replace(&mut self.state, State::Error).try_into_initialized()?;

        // Base OT with the bits of delta as choices.
        let setup: SenderSetup = self.net.expect_next(self.peer)?;
        let mut base = BaseReceiver::new_with_seed(self.rng.gen()).setup(setup)?;

        let payload = base.choose(&ext_sender.base_choices());
        self.net.send_msg(self.peer, &payload)?;

        let payload: BaseSenderPayload = self.net.expect_next(self.peer)?;
        let seeds: [Block; CSP] = base
            .receive(payload)?
            .try_into()
            .map_err(|seeds: Vec<Block>| {
                ExtensionError::failed(format!("expected {CSP} base OT seeds, got {}", seeds.len()))
            })?;

        let session = cointoss_sender(&mut self.net, self.peer, vec![self.rng.gen()])?[0];

        self.state = State::Extension(Box::new(ext_sender.setup(seeds, session)));
        self.initialized = true;

        Ok(())
    }

    #[instrument(level = "debug", fields(peer = %self.peer, count), skip_all, err)]
    fn extend(&mut self, count: usize) -> Result<SeedPairs, SeedSourceError> {
        if count == 0 {
            return Ok(SeedPairs::default());
        }

        let mut ext_sender = mem::replace(&mut self.state, State::Error).try_into_extension()?;

        let extend: Extend = self.net.expect_next(self.peer)?;
        ext_sender.extend(count, extend)?;

        // Sample chi_seed with coin-toss, after the receiver is bound to the matrix.
        let chi_seed = cointoss_receiver(&mut self.net, self.peer, vec![self.rng.gen()])?[0];

        let check: Check = self.net.expect_next(self.peer)?;
        let ROTSenderOutput { id, msgs } = ext_sender.check(chi_seed, check)?;

        self.state = State::Extension(ext_sender);

        tracing::debug!(%id, "extension verified");

        let (zero, one) = msgs
            .into_iter()
            .map(|[zero, one]| (BitVector::from(zero), BitVector::from(one)))
            .unzip();

        Ok(SeedPairs { zero, one })
    }
}
