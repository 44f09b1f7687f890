use derive_builder::Builder;
use rotx_ot_core::kos::{ReceiverConfig, SenderConfig, CSP, SSP};

/// Random OT configuration.
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct RotConfig {
    /// Computational security parameter, the bit length of every seed.
    #[builder(default = "CSP")]
    computational_security: usize,
    /// Statistical security parameter of the extension consistency check.
    #[builder(default = "SSP")]
    statistical_security: usize,
}

impl RotConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(k) = self.computational_security {
            if k != CSP {
                return Err(format!(
                    "unsupported computational security parameter {k}, only {CSP} is supported"
                ));
            }
        }

        if let Some(lambda) = self.statistical_security {
            if !(1..=CSP).contains(&lambda) {
                return Err(format!(
                    "statistical security parameter {lambda} is out of range 1..={CSP}"
                ));
            }
        }

        Ok(())
    }
}

impl Default for RotConfig {
    fn default() -> Self {
        Self {
            computational_security: CSP,
            statistical_security: SSP,
        }
    }
}

impl RotConfig {
    /// Creates a new builder for RotConfig.
    pub fn builder() -> RotConfigBuilder {
        RotConfigBuilder::default()
    }

    /// Returns the computational security parameter.
    pub fn computational_security(&self) -> usize {
        self.computational_security
    }

    /// Returns the statistical security parameter.
    pub fn statistical_security(&self) -> usize {
        self.statistical_security
    }

    pub(crate) fn sender_config(&self) -> SenderConfig {
        SenderConfig::new(self.statistical_security)
    }

    pub(crate) fn receiver_config(&self) -> ReceiverConfig {
        ReceiverConfig::new(self.statistical_security)
    }
}
