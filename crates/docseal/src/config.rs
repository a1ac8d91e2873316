//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

use docseal_core::{Canonicalizer, FunctionSignature, ParamType, SignatureCatalog};
use docseal_gateway::SignerContext;

use crate::error::{KernelError, Result};

/// Configuration shared by the attestation and verification orchestrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// The ledger call that records a content identifier.
    pub attest_function: FunctionSignature,
    /// Index of the `string` parameter carrying the content identifier.
    pub content_param: usize,
    /// Further signatures the decoder should recognize.
    pub signatures: Vec<FunctionSignature>,
    pub canonicalizer: Canonicalizer,
    pub signer: SignerContext,
    /// Upper bound on intake events processed at once.
    pub max_in_flight: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            attest_function: FunctionSignature::new("addDocument", vec![ParamType::String]),
            content_param: 0,
            signatures: Vec::new(),
            canonicalizer: Canonicalizer::default(),
            signer: SignerContext::default(),
            max_in_flight: 16,
        }
    }
}

impl OrchestratorConfig {
    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        match self.attest_function.inputs().get(self.content_param) {
            Some(ParamType::String) => {}
            Some(other) => {
                return Err(KernelError::InvalidConfiguration(format!(
                    "parameter {} of {} is {}, expected string",
                    self.content_param, self.attest_function, other
                )))
            }
            None => {
                return Err(KernelError::InvalidConfiguration(format!(
                    "{} has no parameter {}",
                    self.attest_function, self.content_param
                )))
            }
        }

        if self.canonicalizer.identity_field.is_empty() {
            return Err(KernelError::InvalidConfiguration(
                "identity field name is empty".into(),
            ));
        }
        if self.canonicalizer.is_volatile(&self.canonicalizer.identity_field) {
            return Err(KernelError::InvalidConfiguration(format!(
                "identity field `{}` cannot also be excluded from attestation",
                self.canonicalizer.identity_field
            )));
        }
        if self.max_in_flight == 0 {
            return Err(KernelError::InvalidConfiguration(
                "max_in_flight must be at least 1".into(),
            ));
        }

        self.catalog()?;
        Ok(())
    }

    /// The decoder catalog: the attest function plus `signatures`.
    pub fn catalog(&self) -> Result<SignatureCatalog> {
        let signatures = std::iter::once(self.attest_function.clone())
            .chain(self.signatures.iter().cloned());
        Ok(SignatureCatalog::new(signatures)?)
    }
}
