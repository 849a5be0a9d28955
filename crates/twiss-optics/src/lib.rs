#![deny(missing_docs)]
#![doc = "Single-pass beam moments and Twiss reconstruction with propagated errors."]

/// Per-sampler moment accumulation.
pub mod accumulator;
/// Sampler orchestration over a particle source.
pub mod analysis;
/// YAML analysis configuration.
pub mod config;
/// Sampling covariance of second-order moments.
pub mod covariance;
/// Canonical hashing helpers.
pub mod hash;
/// Particle tables and their file formats.
pub mod io;
/// Derivatives of optical functions with respect to second moments.
pub mod jacobian;
pub mod kinematics;
/// Central moments derived from power sums.
pub mod moments;
pub mod optics;
/// Flat power-sum tensors.
pub mod power_sums;
/// Report assembly and export.
pub mod report;
/// Canonical JSON serde helpers.
pub mod serde;
/// Particle species and rest masses.
pub mod species;
pub mod synth;

pub use accumulator::MomentAccumulator;
pub use analysis::{accumulate_sampler, analyse, analyse_sampler};
pub use config::{load_config, AnalysisConfig};
pub use covariance::{MomentCovariance, SecondMoment};
pub use io::ParticleTable;
pub use jacobian::{DerivativeMatrix, DerivativePoint};
pub use moments::CentralMoments;
pub use optics::{
    OpticalFunctions, OpticalQuantity, OpticsCalculator, OpticsOptions, PlaneOptics, PlaneStatus,
};
pub use power_sums::PowerSums;
pub use report::{OpticsReport, SamplerOptics};
pub use species::{Species, SpeciesId, SPECIES};
pub use synth::{generate, BeamSpec, PlaneTwiss};
