//! Random oblivious transfer extension with a correlation check, based on
//! [`KOS15`](https://eprint.iacr.org/archive/2015/546/1433798896.pdf).
//!
//! The receiver extends `count` OTs using its own choice bits, padded with random
//! choices for `CSP + SSP` sacrificial OTs consumed by the consistency check. The
//! correlated outputs are broken with a session-keyed hash, yielding random OTs.

mod config;
mod error;
pub mod msgs;
mod receiver;
mod sender;

pub use config::{
    ReceiverConfig, ReceiverConfigBuilder, ReceiverConfigBuilderError, SenderConfig,
    SenderConfigBuilder, SenderConfigBuilderError,
};
pub use error::{ReceiverError, SenderError};
pub use receiver::{state as receiver_state, Receiver};
pub use sender::{state as sender_state, Sender};

use rotx_core::Block;

/// Computational security parameter
pub const CSP: usize = 128;
/// Default statistical security parameter
pub const SSP: usize = 40;

/// Session domain separator for the output hash.
const HASH_CONTEXT: &str = "rotx 2024 kos random ot";

/// Returns the number of OTs actually extended for a batch of `count`, padded with
/// `ssp + CSP` sacrificial OTs and rounded up to a multiple of 64.
///
/// Returns `None` if the padded count, or the size of its extension matrix, overflows.
pub fn pad_ot_count(count: usize, ssp: usize) -> Option<usize> {
    count
        .checked_add(CSP)?
        .checked_add(ssp)?
        .checked_add(63)
        .map(|n| n & !63)
        .filter(|n| n.checked_mul(CSP / 8).is_some())
}

/// Returns the size in bytes of the extension matrix for a given number of OTs.
pub const fn extension_matrix_size(count: usize) -> usize {
    count * (CSP / 8)
}

/// Transposes a bit matrix.
///
/// The matrix has `rows` rows stored contiguously, each row packed in LSB0 order.
/// Both `rows` and the number of columns must be multiples of 8.
pub fn transpose_bits(matrix: &[u8], rows: usize) -> Vec<u8> {
    debug_assert!(rows % 8 == 0);
    debug_assert!(matrix.len() % rows == 0);

    let row_bytes = matrix.len() / rows;
    let cols = row_bytes * 8;
    let out_row_bytes = rows / 8;

    let mut out = vec![0u8; matrix.len()];
    for (r, row) in matrix.chunks_exact(row_bytes).enumerate() {
        for c in 0..cols {
            let bit = (row[c / 8] >> (c % 8)) & 1;
            out[c * out_row_bytes + r / 8] |= bit << (r % 8);
        }
    }

    out
}

/// Breaks the correlation of an extended OT.
///
/// The tweak is the running OT index, so no two OTs of a session share a key.
pub(crate) fn hash_key(session: Block, tweak: u128, block: Block) -> Block {
    let mut h = blake3::Hasher::new_derive_key(HASH_CONTEXT);
    h.update(session.as_bytes());
    h.update(&tweak.to_le_bytes());
    h.update(block.as_bytes());
    let digest = h.finalize();

    let mut key = [0u8; 16];
    key.copy_from_slice(&digest.as_bytes()[..16]);
    key.into()
}

/// Splits a transposed matrix into one block per row.
pub(crate) fn into_blocks(matrix: &[u8]) -> Vec<Block> {
    matrix
        .chunks_exact(Block::LEN)
        .map(|chunk| {
            let mut block = [0u8; 16];
            block.copy_from_slice(chunk);
            Block::new(block)
        })
        .collect()
}

/// Derives the consistency check weights from the coin-tossed seed.
pub(crate) fn chis(chi_seed: Block, count: usize) -> Vec<Block> {
    use rand_core::SeedableRng;

    let mut prg = rotx_core::prg::Prg::from_seed(chi_seed);
    let mut chis = vec![Block::ZERO; count];
    prg.random_blocks(&mut chis);
    chis
}

#[cfg(test)]
mod tests {
    use crate::{test::assert_rot, ROTReceiverOutput, ROTSenderOutput};

    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    use rand::Rng;
    use rand_chacha::ChaCha12Rng;
    use rand_core::SeedableRng;

    #[fixture]
    fn choices() -> Vec<bool> {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        (0..100).map(|_| rng.gen()).collect()
    }

    #[fixture]
    fn delta() -> Block {
        let mut rng = ChaCha12Rng::seed_from_u64(2);
        rng.gen()
    }

    #[fixture]
    fn receiver_seeds() -> [[Block; 2]; CSP] {
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        std::array::from_fn(|_| [rng.gen(), rng.gen()])
    }

    #[fixture]
    fn sender_seeds(delta: Block, receiver_seeds: [[Block; 2]; CSP]) -> [Block; CSP] {
        std::array::from_fn(|i| receiver_seeds[i][delta.bit(i) as usize])
    }

    #[fixture]
    fn chi_seed() -> Block {
        let mut rng = ChaCha12Rng::seed_from_u64(4);
        rng.gen()
    }

    #[fixture]
    fn session() -> Block {
        Block::new([42u8; 16])
    }

    fn setup(
        delta: Block,
        sender_seeds: [Block; CSP],
        receiver_seeds: [[Block; 2]; CSP],
        session: Block,
    ) -> (
        Sender<sender_state::Extension>,
        Receiver<receiver_state::Extension>,
    ) {
        let sender = Sender::new(SenderConfig::default(), delta).setup(sender_seeds, session);
        let receiver = Receiver::new(ReceiverConfig::default()).setup(receiver_seeds, session);

        (sender, receiver)
    }

    #[rstest]
    fn test_kos_extension(
        choices: Vec<bool>,
        delta: Block,
        sender_seeds: [Block; CSP],
        receiver_seeds: [[Block; 2]; CSP],
        chi_seed: Block,
        session: Block,
    ) {
        let (mut sender, mut receiver) = setup(delta, sender_seeds, receiver_seeds, session);
        let mut rng = ChaCha12Rng::seed_from_u64(5);

        let extend = receiver.extend(&choices, &mut rng).unwrap();
        sender.extend(choices.len(), extend).unwrap();

        let (check, receiver_output) = receiver.check(chi_seed).unwrap();
        let sender_output = sender.check(chi_seed, check).unwrap();

        let ROTSenderOutput {
            id: sender_id,
            msgs,
        } = sender_output;
        let ROTReceiverOutput {
            id: receiver_id,
            choices: received_choices,
            msgs: received,
        } = receiver_output;

        assert_eq!(sender_id, receiver_id);
        assert_eq!(received_choices, choices);
        assert_rot(&choices, &msgs, &received);
    }

    #[rstest]
    fn test_kos_extension_multiple(
        choices: Vec<bool>,
        delta: Block,
        sender_seeds: [Block; CSP],
        receiver_seeds: [[Block; 2]; CSP],
        chi_seed: Block,
        session: Block,
    ) {
        let (mut sender, mut receiver) = setup(delta, sender_seeds, receiver_seeds, session);
        let mut rng = ChaCha12Rng::seed_from_u64(5);

        let mut outputs = Vec::new();
        for _ in 0..2 {
            let extend = receiver.extend(&choices, &mut rng).unwrap();
            sender.extend(choices.len(), extend).unwrap();

            let (check, receiver_output) = receiver.check(chi_seed).unwrap();
            let sender_output = sender.check(chi_seed, check).unwrap();

            assert_eq!(sender_output.id, receiver_output.id);
            assert_rot(&choices, &sender_output.msgs, &receiver_output.msgs);
            outputs.push(sender_output.msgs);
        }

        // Every batch yields fresh keys.
        assert_ne!(outputs[0], outputs[1]);
    }

    #[rstest]
    fn test_kos_tampered_matrix(
        choices: Vec<bool>,
        delta: Block,
        sender_seeds: [Block; CSP],
        receiver_seeds: [[Block; 2]; CSP],
        chi_seed: Block,
        session: Block,
    ) {
        let (mut sender, mut receiver) = setup(delta, sender_seeds, receiver_seeds, session);
        let mut rng = ChaCha12Rng::seed_from_u64(5);

        let mut extend = receiver.extend(&choices, &mut rng).unwrap();
        extend.us.iter_mut().for_each(|u| *u = !*u);
        sender.extend(choices.len(), extend).unwrap();

        let (check, _) = receiver.check(chi_seed).unwrap();
        let err = sender.check(chi_seed, check).unwrap_err();

        assert!(matches!(err, SenderError::ConsistencyCheckFailed));
    }

    #[rstest]
    fn test_kos_count_mismatch(
        choices: Vec<bool>,
        delta: Block,
        sender_seeds: [Block; CSP],
        receiver_seeds: [[Block; 2]; CSP],
        session: Block,
    ) {
        let (mut sender, mut receiver) = setup(delta, sender_seeds, receiver_seeds, session);
        let mut rng = ChaCha12Rng::seed_from_u64(5);

        let extend = receiver.extend(&choices, &mut rng).unwrap();
        let err = sender.extend(choices.len() + 1, extend).unwrap_err();

        assert!(matches!(err, SenderError::CountMismatch { .. }));
    }

    #[rstest]
    fn test_kos_count_overflow(
        delta: Block,
        sender_seeds: [Block; CSP],
        receiver_seeds: [[Block; 2]; CSP],
        session: Block,
    ) {
        let mut sender =
            Sender::new(SenderConfig::new(usize::MAX), delta).setup(sender_seeds, session);
        let mut receiver =
            Receiver::new(ReceiverConfig::new(usize::MAX)).setup(receiver_seeds, session);
        let mut rng = ChaCha12Rng::seed_from_u64(5);

        let err = receiver.extend(&[true], &mut rng).unwrap_err();
        assert!(matches!(err, ReceiverError::InvalidCount(1)));

        let extend = msgs::Extend {
            count: 1,
            us: vec![0u8; extension_matrix_size(64)],
        };
        let err = sender.extend(1, extend).unwrap_err();
        assert!(matches!(err, SenderError::InvalidCount(1)));
    }

    #[test]
    fn test_transpose_bits() {
        let mut rng = ChaCha12Rng::seed_from_u64(6);
        let rows = 16;
        let matrix: Vec<u8> = (0..rows * 3).map(|_| rng.gen()).collect();

        let transposed = transpose_bits(&matrix, rows);

        for r in 0..rows {
            for c in 0..24 {
                let bit = (matrix[r * 3 + c / 8] >> (c % 8)) & 1;
                let transposed_bit = (transposed[c * 2 + r / 8] >> (r % 8)) & 1;
                assert_eq!(bit, transposed_bit);
            }
        }
        assert_eq!(transpose_bits(&transposed, 24), matrix);
    }

    #[rstest]
    #[case::empty(0, 192)]
    #[case::one(1, 192)]
    #[case::aligned(256, 448)]
    fn test_pad_ot_count(#[case] count: usize, #[case] expected: usize) {
        assert_eq!(pad_ot_count(count, SSP), Some(expected));
    }

    #[test]
    fn test_pad_ot_count_overflow() {
        assert_eq!(pad_ot_count(usize::MAX - CSP, SSP), None);
        assert_eq!(pad_ot_count(1, usize::MAX), None);
        assert_eq!(pad_ot_count(usize::MAX / 8, SSP), None);
    }
}
