//! Provenance and schema descriptors shared across Twiss artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance information attached to every optics report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Hash of the particle input the report was computed from.
    pub input_hash: String,
    /// Species name used to resolve the rest mass.
    pub species: String,
    /// Rest mass in GeV applied when deriving momenta.
    pub rest_mass: f64,
    /// Whether the reference emittance override was active.
    pub reference_emittance_used: bool,
    /// Number of fill passes ingested per sampler.
    pub passes: usize,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}
