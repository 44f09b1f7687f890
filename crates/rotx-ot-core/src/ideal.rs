//! Ideal functionalities.

pub mod rot;
