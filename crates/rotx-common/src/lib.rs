//! Common functionality for `rotx`.
//!
//! This crate provides party identifiers and the blocking, party-addressed
//! [`Network`] transport the protocol crates are written against, along with an
//! in-process [`MemoryNetwork`] for tests and single-process deployments.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

mod id;
pub mod io;
mod memory;

pub use id::PartyId;
pub use io::{IoExt, Network, NetworkError};
pub use memory::MemoryNetwork;
