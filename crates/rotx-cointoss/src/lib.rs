//! A simple 2-party coin-toss protocol.
//!
//! # Sender
//!
//! 1. Samples random seeds.
//! 2. Commits to the seeds and sends the commitment to the receiver.
//! 3. Receives the receiver's seeds.
//! 4. Sends the opening to the receiver.
//! 5. Outputs the XOR of the seeds.
//!
//! # Receiver
//!
//! 1. Samples random seeds.
//! 2. Receives the sender's commitment.
//! 3. Sends its seeds to the sender.
//! 4. Receives and verifies the opening.
//! 5. Outputs the XOR of the seeds.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

use rotx_cointoss_core::{
    msgs::{ReceiverPayload, SenderCommitment, SenderPayload},
    Receiver as ReceiverCore, Sender as SenderCore,
};
use rotx_common::{IoExt, Network, NetworkError, PartyId};
use rotx_core::{commit::CommitmentError, Block};
use tracing::instrument;

pub use rotx_cointoss_core::{
    msgs, receiver_state, sender_state, CointossError as CoreError,
};

/// Coin-toss protocol error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum CointossError {
    #[error(transparent)]
    Io(#[from] NetworkError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CointossError {
    /// Returns the commitment error, if the coin toss failed because of one.
    pub fn commitment_error(&self) -> Option<&CommitmentError> {
        match self {
            CointossError::Core(CoreError::Commitment(err)) => Some(err),
            _ => None,
        }
    }
}

/// A coin-toss sender.
#[derive(Debug)]
pub struct Sender<S: sender_state::State = sender_state::Initialized> {
    inner: SenderCore<S>,
}

impl Sender {
    /// Creates a new sender.
    ///
    /// # Arguments
    ///
    /// * `seeds` - The seeds to use for the coin toss.
    pub fn new(seeds: Vec<Block>) -> Self {
        Self {
            inner: SenderCore::new(seeds),
        }
    }

    /// Sends the coin-toss commitment.
    #[instrument(level = "debug", skip_all, err)]
    pub fn commit<N: Network + ?Sized>(
        self,
        net: &mut N,
        peer: PartyId,
    ) -> Result<Sender<sender_state::Committed>, CointossError> {
        let (commitment, inner) = self.inner.commit()?;
        net.send_msg(peer, &commitment)?;

        Ok(Sender { inner })
    }
}

impl Sender<sender_state::Committed> {
    /// Receives the receiver's seeds, returning the coin-toss output.
    #[instrument(level = "debug", skip_all, err)]
    pub fn receive<N: Network + ?Sized>(
        self,
        net: &mut N,
        peer: PartyId,
    ) -> Result<(Vec<Block>, Sender<sender_state::Received>), CointossError> {
        let payload: ReceiverPayload = net.expect_next(peer)?;
        let (output, inner) = self.inner.receive(payload)?;

        Ok((output, Sender { inner }))
    }
}

impl Sender<sender_state::Received> {
    /// Sends the opening of the commitment.
    #[instrument(level = "debug", skip_all, err)]
    pub fn finalize<N: Network + ?Sized>(
        self,
        net: &mut N,
        peer: PartyId,
    ) -> Result<(), CointossError> {
        let payload: SenderPayload = self.inner.finalize();
        net.send_msg(peer, &payload)?;

        Ok(())
    }
}

/// A coin-toss receiver.
#[derive(Debug)]
pub struct Receiver<S: receiver_state::State = receiver_state::Initialized> {
    inner: ReceiverCore<S>,
}

impl Receiver {
    /// Creates a new receiver.
    ///
    /// # Arguments
    ///
    /// * `seeds` - The seeds to use for the coin toss.
    pub fn new(seeds: Vec<Block>) -> Self {
        Self {
            inner: ReceiverCore::new(seeds),
        }
    }

    /// Receives the sender's commitment and sends the receiver's seeds.
    #[instrument(level = "debug", skip_all, err)]
    pub fn receive_commitment<N: Network + ?Sized>(
        self,
        net: &mut N,
        peer: PartyId,
    ) -> Result<Receiver<receiver_state::Received>, CointossError> {
        let commitment: SenderCommitment = net.expect_next(peer)?;
        let (payload, inner) = self.inner.receive_commitment(commitment);
        net.send_msg(peer, &payload)?;

        Ok(Receiver { inner })
    }
}

impl Receiver<receiver_state::Received> {
    /// Receives and verifies the opening, returning the coin-toss output.
    #[instrument(level = "debug", skip_all, err)]
    pub fn receive<N: Network + ?Sized>(
        self,
        net: &mut N,
        peer: PartyId,
    ) -> Result<Vec<Block>, CointossError> {
        let payload: SenderPayload = net.expect_next(peer)?;

        Ok(self.inner.receive(payload)?)
    }
}

/// Executes the coin-toss protocol as the sender.
///
/// # Arguments
///
/// * `net` - The network.
/// * `peer` - The receiver.
/// * `seeds` - The seeds to use for the coin toss.
#[instrument(level = "debug", skip_all, fields(count = seeds.len()), err)]
pub fn cointoss_sender<N: Network + ?Sized>(
    net: &mut N,
    peer: PartyId,
    seeds: Vec<Block>,
) -> Result<Vec<Block>, CointossError> {
    let (output, sender) = Sender::new(seeds).commit(net, peer)?.receive(net, peer)?;
    sender.finalize(net, peer)?;

    Ok(output)
}

/// Executes the coin-toss protocol as the receiver.
///
/// # Arguments
///
/// * `net` - The network.
/// * `peer` - The sender.
/// * `seeds` - The seeds to use for the coin toss.
#[instrument(level = "debug", skip_all, fields(count = seeds.len()), err)]
pub fn cointoss_receiver<N: Network + ?Sized>(
    net: &mut N,
    peer: PartyId,
    seeds: Vec<Block>,
) -> Result<Vec<Block>, CointossError> {
    Receiver::new(seeds)
        .receive_commitment(net, peer)?
        .receive(net, peer)
}
