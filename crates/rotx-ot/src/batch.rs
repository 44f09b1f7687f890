use rand::{CryptoRng, Rng};
use rotx_common::{Network, PartyId};
use rotx_core::{
    expand::{ExpansionError, PrgExpander, SeedExpander},
    BitVector,
};
use tracing::instrument;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    kos::{self, Rot},
    OTError, RoleState, RotConfig, RotReceiver, RotSender, SeedPairs,
};

/// A pair of random messages output to the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePair {
    /// The message selected by a `0` choice.
    pub zero: BitVector,
    /// The message selected by a `1` choice.
    pub one: BitVector,
}

impl MessagePair {
    /// Returns the message selected by `choice`.
    pub fn get(&self, choice: bool) -> &BitVector {
        if choice {
            &self.one
        } else {
            &self.zero
        }
    }
}

/// Batched random OT over expanded seeds.
///
/// Initializes its roles on first use, extends one seed per OT and expands every
/// seed to the requested message length. Sender and receiver expand with the same
/// [`SeedExpander`], so the receiver's messages match the sender's pairs.
#[derive(Debug)]
pub struct BatchRot<S, R, E = PrgExpander> {
    sender: S,
    receiver: R,
    expander: E,
}

impl<S, R> BatchRot<S, R> {
    /// Creates a new batched random OT from a pair of roles.
    pub fn new(sender: S, receiver: R) -> Self {
        Self::with_expander(sender, receiver, PrgExpander::new())
    }
}

impl<S, R, E> BatchRot<S, R, E> {
    /// Creates a new batched random OT with a custom seed expander.
    ///
    /// Both parties must use the same expander.
    pub fn with_expander(sender: S, receiver: R, expander: E) -> Self {
        Self {
            sender,
            receiver,
            expander,
        }
    }

    /// Returns the sender role.
    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Returns the receiver role.
    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    /// Returns the seed expander.
    pub fn expander(&self) -> &E {
        &self.expander
    }

    /// Returns the roles and the expander.
    pub fn into_inner(self) -> (S, R, E) {
        (self.sender, self.receiver, self.expander)
    }
}

impl<N: Network + Clone> BatchRot<kos::Sender<N>, kos::Receiver<N>> {
    /// Creates a new batched random OT from a networked pairing.
    pub fn from_rot(rot: Rot<N>) -> Self {
        let (sender, receiver) = rot.into_parts();
        Self::new(sender, receiver)
    }

    /// Creates a new batched random OT with a fresh networked pairing.
    ///
    /// # Arguments
    ///
    /// * `my_id` - The ID of this party.
    /// * `other_id` - The ID of the peer.
    /// * `computational_security` - The seed length in bits, must be 128.
    /// * `statistical_security` - The statistical security parameter of the extension.
    /// * `rng` - The source of randomness the roles are seeded from.
    /// * `network` - The network endpoint.
    pub fn from_network<Rn: Rng + CryptoRng>(
        my_id: PartyId,
        other_id: PartyId,
        computational_security: usize,
        statistical_security: usize,
        rng: &mut Rn,
        network: N,
    ) -> Result<Self, OTError> {
        let config = RotConfig::builder()
            .computational_security(computational_security)
            .statistical_security(statistical_security)
            .build()?;

        Ok(Self::from_rot(Rot::new(my_id, other_id, config, rng, network)?))
    }
}

impl<S, R, E> BatchRot<S, R, E>
where
    S: RotSender,
    R: RotReceiver,
    E: SeedExpander + Sync,
{
    /// Outputs `count` pairs of random messages of `message_len` bits each.
    ///
    /// The peer must call [`BatchRot::receive`] with `count` choices.
    ///
    /// # Arguments
    ///
    /// * `count` - The number of OTs.
    /// * `message_len` - The length of every message in bits.
    #[instrument(level = "debug", skip_all, fields(count = count, len = message_len), err)]
    pub fn send(&mut self, count: usize, message_len: usize) -> Result<Vec<MessagePair>, OTError> {
        check_message_len(message_len)?;

        if count == 0 {
            return Ok(Vec::new());
        }

        if self.sender.state() == RoleState::Uninitialized {
            self.sender.initialize()?;
        }

        let SeedPairs { zero, one } = self.sender.extend(count)?;

        if zero.len() != count || one.len() != count {
            return Err(OTError::OperationFailed(format!(
                "expected {count} seed pairs, got {} and {}",
                zero.len(),
                one.len()
            )));
        }

        let zero = expand_seeds(&self.expander, &zero, message_len)?;
        let one = expand_seeds(&self.expander, &one, message_len)?;

        Ok(zero
            .into_iter()
            .zip(one)
            .map(|(zero, one)| MessagePair { zero, one })
            .collect())
    }

    /// Outputs the random messages selected by `choices`, of `message_len` bits each.
    ///
    /// The peer must call [`BatchRot::send`] with `choices.len()` OTs.
    ///
    /// # Arguments
    ///
    /// * `choices` - The choice bits, one per OT.
    /// * `message_len` - The length of every message in bits.
    #[instrument(level = "debug", skip_all, fields(count = choices.len(), len = message_len), err)]
    pub fn receive(
        &mut self,
        choices: &BitVector,
        message_len: usize,
    ) -> Result<Vec<BitVector>, OTError> {
        check_message_len(message_len)?;

        if choices.is_empty() {
            return Ok(Vec::new());
        }

        if self.receiver.state() == RoleState::Uninitialized {
            self.receiver.initialize()?;
        }

        let seeds = self.receiver.extend(choices)?;

        if seeds.len() != choices.len() {
            return Err(OTError::OperationFailed(format!(
                "expected {} seeds, got {}",
                choices.len(),
                seeds.len()
            )));
        }

        Ok(expand_seeds(&self.expander, &seeds, message_len)?)
    }
}

fn check_message_len(message_len: usize) -> Result<(), OTError> {
    if message_len == 0 {
        return Err(OTError::OperationFailed(
            "message length must be at least one bit".to_string(),
        ));
    }

    Ok(())
}

/// Expands every seed, keeping the order of the seeds.
fn expand_seeds<E: SeedExpander + Sync>(
    expander: &E,
    seeds: &[BitVector],
    len: usize,
) -> Result<Vec<BitVector>, ExpansionError> {
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            seeds.par_iter().map(|seed| expander.expand(seed, len)).collect()
        } else {
            seeds.iter().map(|seed| expander.expand(seed, len)).collect()
        }
    }
}
