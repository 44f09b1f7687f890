//! Messages for the KOS protocol.

use rotx_core::Block;
use serde::{Deserialize, Serialize};

use crate::kos::{extension_matrix_size, CSP};

/// Extension message sent by the receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "validation::ExtendUnchecked")]
pub struct Extend {
    /// The number of OTs requested, excluding padding.
    pub count: usize,
    /// The receiver's masked extension matrix.
    pub us: Vec<u8>,
}

/// Consistency check message sent by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// The weighted sum of the choice bits.
    pub x: Block,
    /// The low half of the weighted sum of the receiver's rows.
    pub t0: Block,
    /// The high half of the weighted sum of the receiver's rows.
    pub t1: Block,
}

mod validation {
    use super::*;

    /// Matrix size of the smallest batch, every batch is a multiple of it.
    const MIN_MATRIX_SIZE: usize = extension_matrix_size(64);

    #[derive(Deserialize)]
    pub(super) struct ExtendUnchecked {
        count: usize,
        us: Vec<u8>,
    }

    impl TryFrom<ExtendUnchecked> for Extend {
        type Error = String;

        fn try_from(value: ExtendUnchecked) -> Result<Self, Self::Error> {
            let ExtendUnchecked { count, us } = value;

            if us.is_empty() || us.len() % MIN_MATRIX_SIZE != 0 {
                return Err("extension matrix is not a whole number of batches".to_string());
            }

            match count.checked_mul(CSP / 8) {
                Some(size) if size <= us.len() => {}
                _ => return Err("extension matrix is smaller than the requested count".to_string()),
            }

            Ok(Extend { count, us })
        }
    }
}
