//! Random OT roles backed by a networked KOS15 style extension.
//!
//! Each party holds a [`Sender`] and a [`Receiver`]. A party's sender talks to the
//! peer's receiver and vice versa, so both directions share the network link and
//! the parties must run their transfers in the same order.
//!
//! ```text
//! Receiver                                  Sender
//!   | --- base OT setup -------------------> |
//!   | <-- base OT choices ------------------ |
//!   | --- base OT payload -----------------> |
//!   | <== session coin toss (sender commits) |
//!   |                                        |
//!   | --- Extend --------------------------> |   per batch
//!   | ==> chi coin toss (receiver commits)   |
//!   | --- Check ---------------------------> |
//! ```

pub(crate) mod receiver;
pub(crate) mod sender;

pub use receiver::Receiver;
pub use sender::Sender;

use rand::{CryptoRng, Rng};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use rotx_common::{Network, PartyId};

use crate::{ExtensionError, RotConfig, SeedSourceError};

/// A party's pair of random OT roles, connected to one peer.
#[derive(Debug)]
pub struct Rot<N> {
    sender: Sender<N>,
    receiver: Receiver<N>,
}

impl<N: Network + Clone> Rot<N> {
    /// Creates the random OT roles of a party.
    ///
    /// # Arguments
    ///
    /// * `my_id` - The ID of this party, must match the network endpoint.
    /// * `other_id` - The ID of the peer.
    /// * `config` - The random OT configuration.
    /// * `rng` - The source of randomness the roles are seeded from.
    /// * `network` - The network endpoint, shared by both roles.
    pub fn new<R: Rng + CryptoRng>(
        my_id: PartyId,
        other_id: PartyId,
        config: RotConfig,
        rng: &mut R,
        network: N,
    ) -> Result<Self, SeedSourceError> {
        if network.id() != my_id {
            return Err(ExtensionError::failed(format!(
                "network endpoint belongs to {}, not {}",
                network.id(),
                my_id
            ))
            .into());
        }

        if my_id == other_id {
            return Err(
                ExtensionError::failed(format!("{my_id} can not transfer to itself")).into(),
            );
        }

        let sender = Sender::new(
            config.sender_config(),
            network.clone(),
            other_id,
            ChaCha20Rng::from_seed(rng.gen()),
        );
        let receiver = Receiver::new(
            config.receiver_config(),
            network,
            other_id,
            ChaCha20Rng::from_seed(rng.gen()),
        );

        Ok(Self { sender, receiver })
    }
}

impl<N> Rot<N> {
    /// Returns the sender role.
    pub fn sender(&self) -> &Sender<N> {
        &self.sender
    }

    /// Returns the receiver role.
    pub fn receiver(&self) -> &Receiver<N> {
        &self.receiver
    }

    /// Splits the pairing into its roles.
    pub fn into_parts(self) -> (Sender<N>, Receiver<N>) {
        (self.sender, self.receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand_chacha::ChaCha12Rng;
    use rotx_common::MemoryNetwork;
    use rotx_core::BitVector;
    use rotx_ot_core::test::assert_rot;
    use rstest::*;

    use crate::{OTError, RoleState, RotReceiver, RotSender};

    const ALICE: PartyId = PartyId::new(0);
    const BOB: PartyId = PartyId::new(1);

    fn roles() -> (Sender<MemoryNetwork>, Receiver<MemoryNetwork>) {
        let (alice_net, bob_net) = MemoryNetwork::pair(ALICE, BOB);
        let mut rng = ChaCha12Rng::seed_from_u64(0);

        let (sender, _) = Rot::new(ALICE, BOB, RotConfig::default(), &mut rng, alice_net)
            .unwrap()
            .into_parts();
        let (_, receiver) = Rot::new(BOB, ALICE, RotConfig::default(), &mut rng, bob_net)
            .unwrap()
            .into_parts();

        (sender, receiver)
    }

    #[rstest]
    #[case::one(1)]
    #[case::unaligned(100)]
    #[case::aligned(256)]
    fn test_kos_roles(#[case] count: usize) {
        let (mut sender, mut receiver) = roles();
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let choices = BitVector::random(&mut rng, count);

        let handle = std::thread::spawn(move || {
            sender.initialize().unwrap();
            let seeds = sender.extend(count).unwrap();
            (sender, seeds)
        });

        receiver.initialize().unwrap();
        let received = receiver.extend(&choices).unwrap();
        let (sender, seeds) = handle.join().unwrap();

        assert_eq!(sender.state(), RoleState::Initialized);
        assert_eq!(receiver.state(), RoleState::Initialized);
        assert_eq!(seeds.len(), count);
        assert!(received.iter().all(|seed| seed.len() == 128));

        let msgs: Vec<[BitVector; 2]> = seeds
            .zero
            .into_iter()
            .zip(seeds.one)
            .map(|(zero, one)| [zero, one])
            .collect();
        assert_rot(&choices.to_bools(), &msgs, &received);
    }

    #[test]
    fn test_kos_extend_before_initialize() {
        let (mut sender, _receiver) = roles();

        let err = sender.extend(8).unwrap_err();

        assert!(matches!(OTError::from(err), OTError::OperationFailed(_)));
    }

    #[test]
    fn test_kos_empty_extension() {
        let (mut sender, mut receiver) = roles();

        assert!(sender.extend(0).unwrap().is_empty());
        assert!(receiver.extend(&BitVector::zeros(0)).unwrap().is_empty());
    }

    #[test]
    fn test_rot_wrong_endpoint() {
        let (alice_net, _bob_net) = MemoryNetwork::pair(ALICE, BOB);
        let mut rng = ChaCha12Rng::seed_from_u64(0);

        let err = Rot::new(BOB, ALICE, RotConfig::default(), &mut rng, alice_net).unwrap_err();

        assert!(matches!(OTError::from(err), OTError::OperationFailed(_)));
    }
}
