//! Fixed-length bit vectors.

use bitvec::{order::Lsb0, vec::BitVec};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::Block;

/// Errors that can occur when constructing a [`BitVector`].
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum BitVectorError {
    #[error("invalid storage length: {len} bits require {expected} bytes, got {actual}")]
    InvalidLength {
        len: usize,
        expected: usize,
        actual: usize,
    },
}

/// An immutable sequence of bits with an exact bit length.
///
/// Bits are stored in LSB0 order in `ceil(len / 8)` bytes. The unused high bits of
/// the last byte are always zero, so equality and byte encoding never depend on
/// padding.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "validation::BitVectorUnchecked", into = "validation::BitVectorUnchecked")]
pub struct BitVector(BitVec<u8, Lsb0>);

impl BitVector {
    /// Creates a bit vector of `len` zero bits.
    pub fn zeros(len: usize) -> Self {
        Self(BitVec::repeat(false, len))
    }

    /// Creates a bit vector of `len` bits sampled from a cryptographically secure RNG.
    pub fn random<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, len: usize) -> Self {
        let mut bytes = vec![0u8; byte_len(len)];
        rng.fill_bytes(&mut bytes);
        Self::from_padded_bytes(bytes, len)
    }

    /// Creates a bit vector from its byte encoding.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The bits in LSB0 order, exactly `ceil(len / 8)` bytes.
    /// * `len` - The number of bits.
    pub fn from_bytes(bytes: Vec<u8>, len: usize) -> Result<Self, BitVectorError> {
        let expected = byte_len(len);
        if bytes.len() != expected {
            return Err(BitVectorError::InvalidLength {
                len,
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Self::from_padded_bytes(bytes, len))
    }

    /// Masks the padding bits of `bytes` and truncates to `len` bits.
    ///
    /// `bytes` must be exactly `ceil(len / 8)` bytes long.
    pub(crate) fn from_padded_bytes(mut bytes: Vec<u8>, len: usize) -> Self {
        debug_assert_eq!(bytes.len(), byte_len(len));

        if len % 8 != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= (1u8 << (len % 8)) - 1;
            }
        }

        let mut bits = BitVec::from_vec(bytes);
        bits.truncate(len);

        Self(bits)
    }

    /// Returns the number of bits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the vector holds no bits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the bit at index `i`, or `None` if out of range.
    pub fn get(&self, i: usize) -> Option<bool> {
        self.0.get(i).map(|bit| *bit)
    }

    /// Returns an iterator over the bits.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().by_vals()
    }

    /// Returns the byte encoding, `ceil(len / 8)` bytes in LSB0 order.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_raw_slice()
    }

    /// Returns a copy of the byte encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Consumes the vector, returning its byte encoding.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_vec()
    }

    /// Returns the bits as a vector of booleans.
    pub fn to_bools(&self) -> Vec<bool> {
        self.iter().collect()
    }
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitVector")
            .field("len", &self.len())
            .field("bytes", &hex::encode(self.as_bytes()))
            .finish()
    }
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut bits: BitVec<u8, Lsb0> = iter.into_iter().collect();
        bits.set_uninitialized(false);
        Self(bits)
    }
}

impl From<Block> for BitVector {
    fn from(block: Block) -> Self {
        Self::from_padded_bytes(block.to_bytes().to_vec(), Block::BITS)
    }
}

impl From<&[bool]> for BitVector {
    fn from(bits: &[bool]) -> Self {
        bits.iter().copied().collect()
    }
}

#[inline]
fn byte_len(len: usize) -> usize {
    (len + 7) / 8
}

mod validation {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub(super) struct BitVectorUnchecked {
        len: usize,
        bytes: Vec<u8>,
    }

    impl TryFrom<BitVectorUnchecked> for BitVector {
        type Error = BitVectorError;

        fn try_from(value: BitVectorUnchecked) -> Result<Self, Self::Error> {
            let BitVectorUnchecked { len, bytes } = value;

            // Reject non-canonical encodings instead of silently masking them.
            let vector = BitVector::from_bytes(bytes.clone(), len)?;
            if vector.as_bytes() != bytes.as_slice() {
                return Err(BitVectorError::InvalidLength {
                    len,
                    expected: byte_len(len),
                    actual: bytes.len(),
                });
            }

            Ok(vector)
        }
    }

    impl From<BitVector> for BitVectorUnchecked {
        fn from(value: BitVector) -> Self {
            Self {
                len: value.len(),
                bytes: value.into_bytes(),
            }
        }
    }
}
