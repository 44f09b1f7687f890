//! A 128-bit block.

use std::ops::{BitXor, BitXorAssign};

use bytemuck::{Pod, Zeroable};
use rand::{
    distributions::{Distribution, Standard},
    CryptoRng, Rng,
};
use serde::{Deserialize, Serialize};

/// A block of 128 bits.
#[repr(transparent)]
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct Block([u8; 16]);

impl Block {
    /// The length of a block in bytes.
    pub const LEN: usize = 16;
    /// The length of a block in bits.
    pub const BITS: usize = 128;
    /// A zero block.
    pub const ZERO: Self = Self([0; 16]);
    /// A block with all bits set to 1.
    pub const ONES: Self = Self([0xff; 16]);

    /// Creates a new block.
    #[inline]
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the byte representation of the block.
    #[inline]
    pub fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Returns a reference to the bytes of the block.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Generates a random block using the provided RNG.
    #[inline]
    pub fn random<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen())
    }

    /// Returns the `i`-th bit of the block in LSB0 order.
    ///
    /// # Panics
    ///
    /// Panics if `i >= 128`.
    #[inline]
    pub fn bit(&self, i: usize) -> bool {
        (self.0[i / 8] >> (i % 8)) & 1 == 1
    }

    /// Returns an iterator over the bits of the block in LSB0 order.
    pub fn iter_lsb0(&self) -> impl Iterator<Item = bool> + '_ {
        (0..Self::BITS).map(move |i| self.bit(i))
    }

    /// Carry-less multiplication of two blocks.
    ///
    /// Returns the 256-bit product as `(low, high)`, without reduction.
    pub fn clmul(self, other: Self) -> (Self, Self) {
        let a = u128::from_le_bytes(self.0);
        let b = u128::from_le_bytes(other.0);

        let mut lo = 0u128;
        let mut hi = 0u128;
        for i in 0..128 {
            // Mask instead of branching on the bit.
            let mask = 0u128.wrapping_sub((b >> i) & 1);
            lo ^= (a << i) & mask;
            if i > 0 {
                hi ^= (a >> (128 - i)) & mask;
            }
        }

        (Self(lo.to_le_bytes()), Self(hi.to_le_bytes()))
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Block({})", hex::encode(self.0))
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<[u8; 16]> for Block {
    #[inline]
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl From<Block> for [u8; 16] {
    #[inline]
    fn from(block: Block) -> Self {
        block.0
    }
}

impl<'a> TryFrom<&'a [u8]> for Block {
    type Error = std::array::TryFromSliceError;

    #[inline]
    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        value.try_into().map(Self)
    }
}

impl AsRef<[u8]> for Block {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsMut<[u8]> for Block {
    #[inline]
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl BitXor for Block {
    type Output = Self;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Self(std::array::from_fn(|i| self.0[i] ^ rhs.0[i]))
    }
}

impl BitXorAssign for Block {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0.iter_mut().zip(rhs.0).for_each(|(a, b)| *a ^= b);
    }
}

impl Distribution<Block> for Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        Block(rng.gen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn test_block_bits_lsb0() {
        let mut bytes = [0u8; 16];
        bytes[0] = 0b0000_0101;
        bytes[15] = 0b1000_0000;
        let block = Block::new(bytes);

        let set: Vec<usize> = block
            .iter_lsb0()
            .enumerate()
            .filter_map(|(i, bit)| bit.then_some(i))
            .collect();

        assert_eq!(set, vec![0, 2, 127]);
    }

    #[test]
    fn test_clmul_identity() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let a = Block::random(&mut rng);

        let mut one = [0u8; 16];
        one[0] = 1;

        assert_eq!(a.clmul(Block::new(one)), (a, Block::ZERO));
        assert_eq!(a.clmul(Block::ZERO), (Block::ZERO, Block::ZERO));
    }

    #[test]
    fn test_clmul_is_linear() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let a = Block::random(&mut rng);
        let b = Block::random(&mut rng);
        let c = Block::random(&mut rng);

        let (ab0, ab1) = a.clmul(b);
        let (ac0, ac1) = a.clmul(c);

        assert_eq!(a.clmul(b ^ c), (ab0 ^ ac0, ab1 ^ ac1));
        assert_eq!(a.clmul(b), b.clmul(a));
    }

    #[test]
    fn test_clmul_high_bits() {
        // x^127 * x^127 = x^254, which lives in the high half.
        let mut top = [0u8; 16];
        top[15] = 0x80;
        let top = Block::new(top);

        let (lo, hi) = top.clmul(top);

        let mut expected = [0u8; 16];
        expected[15] = 0x40;
        assert_eq!(lo, Block::ZERO);
        assert_eq!(hi, Block::new(expected));
    }
}
