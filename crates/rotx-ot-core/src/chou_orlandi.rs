//! An implementation of the Chou-Orlandi [`CO15`](https://eprint.iacr.org/2015/267.pdf) oblivious transfer protocol.
//!
//! Used as the base OT of the [`kos`](crate::kos) extension.

mod error;
pub mod msgs;
mod receiver;
mod sender;

pub use error::{ReceiverError, SenderError};
pub use receiver::{state as receiver_state, Receiver};
pub use sender::{state as sender_state, Sender};

use blake3::Hasher;
use curve25519_dalek::ristretto::RistrettoPoint;
use rotx_core::Block;

/// Hashes a ristretto point to a symmetric key
///
/// Prepending a tweak is suggested in Section 2, "Non-Malleability in Practice"
pub(crate) fn hash_point(point: &RistrettoPoint, tweak: u128) -> Block {
    // Compute H(tweak || point)
    let mut h = Hasher::new();
    h.update(&tweak.to_be_bytes());
    h.update(point.compress().as_bytes());
    let digest = h.finalize();

    let mut block = [0u8; 16];
    block.copy_from_slice(&digest.as_bytes()[..16]);
    block.into()
}

#[cfg(test)]
mod tests {
    use crate::test::assert_rot;

    use super::*;
    use curve25519_dalek::traits::Identity;
    use msgs::SenderSetup;
    use rstest::*;

    use rand::Rng;
    use rand_chacha::ChaCha12Rng;
    use rand_core::SeedableRng;

    const SENDER_SEED: [u8; 32] = [0u8; 32];
    const RECEIVER_SEED: [u8; 32] = [1u8; 32];

    #[fixture]
    fn choices() -> Vec<bool> {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        (0..128).map(|_| rng.gen()).collect()
    }

    #[fixture]
    fn data() -> Vec<[Block; 2]> {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        (0..128).map(|_| [rng.gen(), rng.gen()]).collect()
    }

    fn setup() -> (Sender<sender_state::Setup>, Receiver<receiver_state::Setup>) {
        let sender = Sender::new_with_seed(SENDER_SEED);
        let receiver = Receiver::new_with_seed(RECEIVER_SEED);

        let (sender_setup, sender) = sender.setup();
        let receiver = receiver.setup(sender_setup).unwrap();

        (sender, receiver)
    }

    #[rstest]
    fn test_ot_pass(choices: Vec<bool>, data: Vec<[Block; 2]>) {
        let (mut sender, mut receiver) = setup();

        let receiver_payload = receiver.choose(&choices);
        let sender_payload = sender.send(&data, receiver_payload).unwrap();
        let received = receiver.receive(sender_payload).unwrap();

        assert_rot(&choices, &data, &received);
    }

    #[rstest]
    fn test_multiple_ot_pass(choices: Vec<bool>, data: Vec<[Block; 2]>) {
        let (mut sender, mut receiver) = setup();

        for _ in 0..2 {
            let receiver_payload = receiver.choose(&choices);
            let sender_payload = sender.send(&data, receiver_payload).unwrap();
            let received = receiver.receive(sender_payload).unwrap();

            assert_rot(&choices, &data, &received);
        }
    }

    #[rstest]
    fn test_ot_count_mismatch(choices: Vec<bool>, data: Vec<[Block; 2]>) {
        let (mut sender, mut receiver) = setup();

        let receiver_payload = receiver.choose(&choices[..10]);
        let err = sender.send(&data, receiver_payload).unwrap_err();

        assert!(matches!(err, SenderError::CountMismatch(128, 10)));
    }

    #[test]
    fn test_identity_public_key_rejected() {
        let receiver = Receiver::new_with_seed(RECEIVER_SEED);

        let err = receiver
            .setup(SenderSetup {
                public_key: RistrettoPoint::identity(),
            })
            .unwrap_err();

        assert!(matches!(err, ReceiverError::InvalidSetup(_)));
    }
}
