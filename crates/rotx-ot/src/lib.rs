//! Batched random oblivious transfer with messages of any length.
//!
//! A random OT extension yields `k`-bit correlated seeds. [`BatchRot`] treats every
//! seed as the key of a PRG and expands it to the requested message length, so a
//! sender gets pairs of random messages and a receiver gets the message selected by
//! each of its choice bits.
//!
//! The seeds come from a [`RotSender`] / [`RotReceiver`] pair. [`kos::Rot`] is the
//! networked pairing, built on a CO15 base OT and a KOS15 style extension with a
//! coin-tossed consistency check.
//!
//! Every failure is reported as an [`OTError`], which is either
//! [`OTError::MaliciousBehavior`] or [`OTError::OperationFailed`].

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

mod batch;
mod config;
mod error;
#[cfg(any(test, feature = "ideal"))]
pub mod ideal;
pub mod kos;

pub use batch::{BatchRot, MessagePair};
pub use config::{RotConfig, RotConfigBuilder, RotConfigBuilderError};
pub use error::{ExtensionError, ExtensionErrorKind, OTError, SeedSourceError};

pub use rotx_core::{
    expand::{Blake3Expander, ExpansionError, PrgExpander, SeedExpander},
    BitVector,
};

/// The lifecycle of a random OT role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleState {
    /// The one-time setup has not completed yet.
    Uninitialized,
    /// The role is ready to extend.
    Initialized,
}

/// The seed pairs output by a [`RotSender`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedPairs {
    /// The seeds of the `0` messages.
    pub zero: Vec<BitVector>,
    /// The seeds of the `1` messages.
    pub one: Vec<BitVector>,
}

impl SeedPairs {
    /// Returns the number of seed pairs.
    pub fn len(&self) -> usize {
        self.zero.len()
    }

    /// Returns `true` if there are no seed pairs.
    pub fn is_empty(&self) -> bool {
        self.zero.is_empty()
    }
}

/// The sender of a random OT extension.
pub trait RotSender {
    /// Returns the state of the role.
    fn state(&self) -> RoleState;

    /// Runs the one-time setup of the role.
    ///
    /// Does nothing if the role is already initialized.
    fn initialize(&mut self) -> Result<(), SeedSourceError>;

    /// Extends `count` random OTs, returning a pair of seeds per OT.
    ///
    /// # Arguments
    ///
    /// * `count` - The number of OTs to extend.
    fn extend(&mut self, count: usize) -> Result<SeedPairs, SeedSourceError>;
}

/// The receiver of a random OT extension.
pub trait RotReceiver {
    /// Returns the state of the role.
    fn state(&self) -> RoleState;

    /// Runs the one-time setup of the role.
    ///
    /// Does nothing if the role is already initialized.
    fn initialize(&mut self) -> Result<(), SeedSourceError>;

    /// Extends one random OT per choice bit, returning the chosen seeds.
    ///
    /// # Arguments
    ///
    /// * `choices` - The receiver's choice bits.
    fn extend(&mut self, choices: &BitVector) -> Result<Vec<BitVector>, SeedSourceError>;
}

impl<T: RotSender + ?Sized> RotSender for Box<T> {
    fn state(&self) -> RoleState {
        (**self).state()
    }

    fn initialize(&mut self) -> Result<(), SeedSourceError> {
        (**self).initialize()
    }

    fn extend(&mut self, count: usize) -> Result<SeedPairs, SeedSourceError> {
        (**self).extend(count)
    }
}

impl<T: RotReceiver + ?Sized> RotReceiver for Box<T> {
    fn state(&self) -> RoleState {
        (**self).state()
    }

    fn initialize(&mut self) -> Result<(), SeedSourceError> {
        (**self).initialize()
    }

    fn extend(&mut self, choices: &BitVector) -> Result<Vec<BitVector>, SeedSourceError> {
        (**self).extend(choices)
    }
}
