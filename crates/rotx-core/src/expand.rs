//! Seed expansion.
//!
//! A [`SeedExpander`] stretches (or shrinks) a seed into a deterministic pseudorandom
//! bit string of arbitrary length. Two parties holding the same seed obtain the same
//! output, which is what keeps a sender's message pair and the receiver's chosen
//! message correlated after expansion.

use rand_core::SeedableRng;

use crate::{prg::Prg, BitVector, Block};

/// Domain separation context for [`PrgExpander`].
const PRG_CONTEXT: &str = "rotx 2024 seed expansion prg key";
/// Domain separation context for [`Blake3Expander`].
const XOF_CONTEXT: &str = "rotx 2024 seed expansion xof";

/// Errors that can occur during seed expansion.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ExpansionError {
    #[error("expansion primitive unavailable: {0}")]
    Unavailable(String),
}

/// Deterministically expands a seed into a bit string of the requested length.
pub trait SeedExpander {
    /// Expands `seed` into exactly `len` pseudorandom bits.
    ///
    /// The same `(seed, len)` always produces the same output, and `len` may be
    /// smaller or larger than the seed.
    fn expand(&self, seed: &BitVector, len: usize) -> Result<BitVector, ExpansionError>;
}

impl<T: SeedExpander + ?Sized> SeedExpander for &T {
    fn expand(&self, seed: &BitVector, len: usize) -> Result<BitVector, ExpansionError> {
        (**self).expand(seed, len)
    }
}

/// Expands seeds with the AES-128 counter-mode [`Prg`].
///
/// The seed is compressed into an AES key with BLAKE3 in key derivation mode, so
/// seeds of any length are accepted.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrgExpander;

impl PrgExpander {
    /// Creates a new expander.
    pub fn new() -> Self {
        Self
    }

    fn prg(seed: &BitVector) -> Prg {
        let key = blake3::derive_key(PRG_CONTEXT, &encode_seed(seed));

        let mut block = [0u8; 16];
        block.copy_from_slice(&key[..16]);

        Prg::from_seed(Block::new(block))
    }
}

impl SeedExpander for PrgExpander {
    fn expand(&self, seed: &BitVector, len: usize) -> Result<BitVector, ExpansionError> {
        let mut bytes = vec![0u8; byte_len(len)];
        Self::prg(seed).random_bytes(&mut bytes);

        Ok(BitVector::from_padded_bytes(bytes, len))
    }
}

/// Expands seeds with the BLAKE3 extendable output function.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3Expander;

impl Blake3Expander {
    /// Creates a new expander.
    pub fn new() -> Self {
        Self
    }
}

impl SeedExpander for Blake3Expander {
    fn expand(&self, seed: &BitVector, len: usize) -> Result<BitVector, ExpansionError> {
        let mut hasher = blake3::Hasher::new_derive_key(XOF_CONTEXT);
        hasher.update(&encode_seed(seed));

        let mut bytes = vec![0u8; byte_len(len)];
        hasher.finalize_xof().fill(&mut bytes);

        Ok(BitVector::from_padded_bytes(bytes, len))
    }
}

/// Encodes a seed with its bit length so seeds which only differ in length
/// expand differently.
fn encode_seed(seed: &BitVector) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(8 + seed.as_bytes().len());
    encoded.extend_from_slice(&(seed.len() as u64).to_le_bytes());
    encoded.extend_from_slice(seed.as_bytes());
    encoded
}

#[inline]
fn byte_len(len: usize) -> usize {
    (len + 7) / 8
}
