#![deny(missing_docs)]
#![doc = "Core traits and data types for the Twiss beam-optics engine."]

pub mod errors;
pub mod provenance;
pub mod rng;
mod types;

pub use errors::{ErrorInfo, TwissError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::{Coordinate, CoordinateVector, ParticleRecord, Plane, ReferenceEmittance};

/// Describes a recorded particle stream organised by sampler and fill pass.
///
/// A fill pass corresponds to one pass over the persisted event stream; every
/// sampler sees the same number of passes.
pub trait ParticleSource: Send + Sync {
    /// Returns the sampler names in their canonical order.
    fn samplers(&self) -> Box<dyn ExactSizeIterator<Item = &str> + '_>;

    /// Returns the number of fill passes available.
    fn pass_count(&self) -> usize;

    /// Returns the records observed by `sampler` during `pass`.
    fn records(&self, sampler: &str, pass: usize) -> Result<&[ParticleRecord], TwissError>;

    /// Returns true when the source knows the sampler.
    fn contains(&self, sampler: &str) -> bool {
        self.samplers().any(|name| name == sampler)
    }
}
