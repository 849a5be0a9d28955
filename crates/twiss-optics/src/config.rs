use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use twiss_core::errors::TwissError;
use twiss_core::ReferenceEmittance;

use crate::optics::OpticsOptions;
use crate::serde::{from_yaml_slice, to_yaml_string};
use crate::species::SpeciesId;

/// YAML-configurable parameters of an optics analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Species of every particle in the run, by name or PDG id. Required.
    pub species: SpeciesId,
    /// Samplers to analyse; empty means every sampler in the source.
    #[serde(default)]
    pub samplers: Vec<String>,
    /// Externally supplied emittances and their errors.
    #[serde(default)]
    pub reference_emittance: Option<ReferenceEmittance>,
    /// Report the reference emittance instead of the computed one.
    #[serde(default)]
    pub use_reference_emittance: bool,
    /// Worker threads for the sampler pool.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    1
}

impl AnalysisConfig {
    /// A configuration for `species` with every other key at its default.
    pub fn new(species: SpeciesId) -> Self {
        Self {
            species,
            samplers: Vec::new(),
            reference_emittance: None,
            use_reference_emittance: false,
            concurrency: default_concurrency(),
        }
    }

    /// Parses a YAML document and validates it.
    pub fn from_yaml_str(text: &str) -> Result<Self, TwissError> {
        let config: AnalysisConfig = from_yaml_slice(text.as_bytes()).map_err(|err| {
            TwissError::Config(err.info().clone()).with_hint(
                "check the analysis YAML against the documented keys; `species` is required",
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises the configuration to YAML.
    pub fn to_yaml_string(&self) -> Result<String, TwissError> {
        to_yaml_string(self)
    }

    /// Rejects settings that cannot produce a run.
    pub fn validate(&self) -> Result<(), TwissError> {
        if self.concurrency == 0 {
            return Err(TwissError::config("zero-concurrency", "concurrency must be at least 1"));
        }
        if self.use_reference_emittance && self.reference_emittance.is_none() {
            return Err(TwissError::config(
                "missing-reference-emittance",
                "use_reference_emittance is set but no reference_emittance is given",
            ));
        }
        if let Some(reference) = &self.reference_emittance {
            let values = [
                reference.emittance_x,
                reference.emittance_y,
                reference.error_emittance_x,
                reference.error_emittance_y,
            ];
            if values.iter().any(|value| !value.is_finite() || *value < 0.0) {
                return Err(TwissError::config(
                    "invalid-reference-emittance",
                    "reference emittances and errors must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }

    /// Emittance handling passed to the calculator.
    pub fn optics_options(&self) -> OpticsOptions {
        OpticsOptions {
            reference_emittance: self.reference_emittance,
            use_reference_emittance: self.use_reference_emittance,
        }
    }
}

/// Loads and validates an analysis configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, TwissError> {
    let text = fs::read_to_string(path).map_err(|err| {
        TwissError::config("config-read", err.to_string())
            .with_context("path", path.display().to_string())
    })?;
    AnalysisConfig::from_yaml_str(&text)
        .map_err(|err| err.with_context("path", path.display().to_string()))
}
