//! Blocking message transport.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::PartyId;

/// Errors that can occur when communicating with another party.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum NetworkError {
    #[error("unknown party: {0}")]
    UnknownParty(PartyId),
    #[error("channel to {0} is closed")]
    Closed(PartyId),
    #[error("timed out after {0:?} waiting for a message")]
    Timeout(Duration),
    #[error("codec error: {0}")]
    Codec(String),
}

/// A blocking, party-addressed byte transport.
///
/// Messages between a pair of parties are delivered in order.
pub trait Network: Send {
    /// Returns the ID of the local party.
    fn id(&self) -> PartyId;

    /// Sends a message to `to`.
    fn send(&mut self, to: PartyId, bytes: Vec<u8>) -> Result<(), NetworkError>;

    /// Blocks until the next message from `from` arrives.
    fn receive(&mut self, from: PartyId) -> Result<Vec<u8>, NetworkError>;
}

impl<N: Network + ?Sized> Network for Box<N> {
    fn id(&self) -> PartyId {
        (**self).id()
    }

    fn send(&mut self, to: PartyId, bytes: Vec<u8>) -> Result<(), NetworkError> {
        (**self).send(to, bytes)
    }

    fn receive(&mut self, from: PartyId) -> Result<Vec<u8>, NetworkError> {
        (**self).receive(from)
    }
}

/// Typed messaging on top of a [`Network`].
pub trait IoExt: Network {
    /// Serializes `msg` and sends it to `to`.
    fn send_msg<T: Serialize>(&mut self, to: PartyId, msg: &T) -> Result<(), NetworkError> {
        let bytes = bincode::serialize(msg).map_err(|e| NetworkError::Codec(e.to_string()))?;
        self.send(to, bytes)
    }

    /// Receives the next message from `from` and deserializes it as `T`.
    fn expect_next<T: DeserializeOwned>(&mut self, from: PartyId) -> Result<T, NetworkError> {
        let bytes = self.receive(from)?;
        bincode::deserialize(&bytes).map_err(|e| NetworkError::Codec(e.to_string()))
    }
}

impl<N: Network + ?Sized> IoExt for N {}
