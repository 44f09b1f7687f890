//! Low-level crate containing core functionalities for oblivious transfer protocols.
//!
//! This crate is not intended to be used directly. Instead, use the higher-level APIs provided by
//! the `rotx-ot` crate.
//!
//! # ⚠️ Warning ⚠️
//!
//! Some implementations make assumptions about invariants which may not be checked if using these
//! low-level APIs naively. Failing to uphold these invariants may result in security vulnerabilities.
//!
//! USE AT YOUR OWN RISK.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

use serde::{Deserialize, Serialize};

pub mod chou_orlandi;
pub mod ideal;
pub mod kos;

/// An oblivious transfer identifier.
///
/// Every extension batch is assigned the next transfer ID, so both parties agree on it.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TransferId(u64);

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransferId({})", self.0)
    }
}

impl TransferId {
    /// Returns the current transfer ID, incrementing `self` in-place.
    pub fn next_id(&mut self) -> Self {
        let id = *self;
        self.0 += 1;
        id
    }
}

/// The output the sender receives from the ROT functionality.
#[derive(Debug)]
pub struct ROTSenderOutput<T> {
    /// The transfer id.
    pub id: TransferId,
    /// The random messages.
    pub msgs: Vec<T>,
}

/// The output the receiver receives from the ROT functionality.
#[derive(Debug)]
pub struct ROTReceiverOutput<T, U> {
    /// The transfer id.
    pub id: TransferId,
    /// The choice bits.
    pub choices: Vec<T>,
    /// The chosen messages.
    pub msgs: Vec<U>,
}
