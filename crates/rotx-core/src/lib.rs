//! Core types and primitives for `rotx`.
//!
//! This crate provides the bit-level data types and symmetric primitives shared by
//! the protocol crates: 128-bit [`Block`]s, length-exact [`BitVector`]s, an
//! AES-based [`Prg`](prg::Prg), seed expansion, and a hash commitment scheme.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

pub mod aes;
pub mod bitvector;
pub mod block;
pub mod commit;
pub mod expand;
pub mod fixed;
pub mod prg;

pub use bitvector::{BitVector, BitVectorError};
pub use block::Block;
