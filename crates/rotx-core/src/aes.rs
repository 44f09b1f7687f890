//! AES-128 block encryption.

use aes::Aes128;
use cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};

use crate::Block;

/// AES-128 encryptor keyed with a [`Block`].
#[derive(Clone)]
pub struct AesEncryptor(Aes128);

opaque_debug::implement!(AesEncryptor);

impl AesEncryptor {
    /// Number of blocks encrypted per batch.
    pub const AES_BLOCK_COUNT: usize = 8;

    /// Creates a new encryptor.
    #[inline]
    pub fn new(key: Block) -> Self {
        let key = GenericArray::from(key.to_bytes());
        Self(Aes128::new(&key))
    }

    /// Encrypts a single block.
    #[inline]
    pub fn encrypt_block(&self, block: Block) -> Block {
        let mut ctxt = GenericArray::from(block.to_bytes());
        self.0.encrypt_block(&mut ctxt);
        let bytes: [u8; 16] = ctxt.into();
        Block::new(bytes)
    }

    /// Encrypts `N` blocks in place.
    #[inline]
    pub fn encrypt_many_blocks<const N: usize>(&self, blocks: &mut [Block; N]) {
        let mut ctxts: [GenericArray<u8, _>; N] =
            std::array::from_fn(|i| GenericArray::from(blocks[i].to_bytes()));
        self.0.encrypt_blocks(&mut ctxts);
        for (block, ctxt) in blocks.iter_mut().zip(ctxts) {
            let bytes: [u8; 16] = ctxt.into();
            *block = Block::new(bytes);
        }
    }
}
