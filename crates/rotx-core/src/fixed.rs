//! Fixed-point secret values.

use serde::{Deserialize, Serialize};

/// A secret fixed-point value.
///
/// Represents `value × 2^(−precision)`. The wrapper is immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SFixed<T> {
    value: T,
    precision: u32,
}

impl<T> SFixed<T> {
    /// Creates a new fixed-point value.
    ///
    /// # Arguments
    ///
    /// * `value` - The scaled integer representation.
    /// * `precision` - The number of fractional bits.
    pub fn new(value: T, precision: u32) -> Self {
        Self { value, precision }
    }

    /// Returns the scaled value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the number of fractional bits.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Returns the value itself.
    pub fn out(&self) -> &Self {
        self
    }
}
