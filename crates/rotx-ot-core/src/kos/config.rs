use derive_builder::Builder;

use crate::kos::SSP;

/// KOS sender configuration.
#[derive(Debug, Clone, Builder)]
pub struct SenderConfig {
    /// Statistical security parameter of the consistency check.
    #[builder(default = "SSP")]
    statistical_security: usize,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            statistical_security: SSP,
        }
    }
}

impl SenderConfig {
    /// Creates a new SenderConfig with the given statistical security parameter.
    pub fn new(statistical_security: usize) -> Self {
        Self {
            statistical_security,
        }
    }

    /// Creates a new builder for SenderConfig.
    pub fn builder() -> SenderConfigBuilder {
        SenderConfigBuilder::default()
    }

    /// Returns the statistical security parameter.
    pub fn statistical_security(&self) -> usize {
        self.statistical_security
    }
}

/// KOS receiver configuration.
#[derive(Debug, Clone, Builder)]
pub struct ReceiverConfig {
    /// Statistical security parameter of the consistency check.
    #[builder(default = "SSP")]
    statistical_security: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            statistical_security: SSP,
        }
    }
}

impl ReceiverConfig {
    /// Creates a new ReceiverConfig with the given statistical security parameter.
    pub fn new(statistical_security: usize) -> Self {
        Self {
            statistical_security,
        }
    }

    /// Creates a new builder for ReceiverConfig.
    pub fn builder() -> ReceiverConfigBuilder {
        ReceiverConfigBuilder::default()
    }

    /// Returns the statistical security parameter.
    pub fn statistical_security(&self) -> usize {
        self.statistical_security
    }
}
